//! Errors surfaced to the caller.
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, WatermarkError>;

#[derive(thiserror::Error, Debug)]
pub enum WatermarkError {
    /// The path does not exist, is unreadable, or is not a decodable image.
    #[error("could not decode image at {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The buffer could not be written to the path.
    #[error("could not encode image to {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl WatermarkError {
    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn encode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }
}
