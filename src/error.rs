use thiserror::Error;

/// Errors that can occur while loading the native OpenSlide library
#[derive(Debug, Clone, Error)]
pub enum LibraryError {
    /// None of the candidate library paths could be loaded
    #[error("OpenSlide library not found (tried: {})", .tried.join(", "))]
    NotFound { tried: Vec<String> },

    /// The library loaded but does not export a required symbol
    #[error("OpenSlide symbol {symbol} missing: {message}")]
    MissingSymbol {
        symbol: &'static str,
        message: String,
    },
}

/// Errors raised when a slide property is absent or malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Property is not set on this slide
    #[error("property {0} not available")]
    Missing(&'static str),

    /// Property is set but its value cannot be parsed
    #[error("cannot parse property {name}: {value:?}")]
    Parse { name: &'static str, value: String },
}

/// Errors that can occur when opening or reading a slide
#[derive(Debug, Clone, Error)]
pub enum SlideError {
    /// Native library could not be loaded
    #[error("{0}")]
    Library(#[from] LibraryError),

    /// Path or name cannot be passed across the C boundary
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// OpenSlide does not recognize the file
    #[error("File {path} unrecognized.")]
    Unrecognized { path: String },

    /// Vendor detection found no matching format
    #[error("No vendor for {path}")]
    NoVendor { path: String },

    /// Error string reported by OpenSlide, verbatim
    #[error("{0}")]
    Native(String),

    /// Associated image name is not present in the slide
    #[error("associated image does not exist: {0}")]
    AssociatedImageNotFound(String),

    /// Requested region has an empty or oversized extent
    #[error("Invalid region: {message}")]
    InvalidRegion { message: String },

    /// Level index cannot be addressed
    #[error("Level {level} out of range (slide has {count} levels)")]
    LevelOutOfRange { level: usize, count: usize },

    /// Thumbnail size must be positive
    #[error("Invalid thumbnail size: {0}")]
    InvalidThumbnailSize(u32),

    /// Typed property lookup failed
    #[error("{0}")]
    Property(#[from] PropertyError),
}
