use std::fmt;
use video_gallery::{ShareError, StoreError};

/// Central error types for the Clipshelf app
#[derive(Debug)]
pub enum AppError {
    /// Media store error (SQLite)
    Store(StoreError),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Share sheet error
    Share(ShareError),
    /// General error
    #[allow(dead_code)]
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Share(e) => write!(f, "Share error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<ShareError> for AppError {
    fn from(e: ShareError) -> Self {
        AppError::Share(e)
    }
}

/// User-friendly error messages for the UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Share(_) => "Failed to share video.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
