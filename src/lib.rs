#![allow(clippy::excessive_precision)]

pub mod algorithm;
pub mod compare;
pub mod dct2d;
pub mod detect;
pub mod error;
pub mod luma;
pub mod pattern;
pub mod storage;
pub mod util;

// Export the public components from the algorithm here.
pub use algorithm::{embed, embed_with};
pub use algorithm::{EmbedConfig, Embedder};
pub use compare::{unchanged, unchanged_images};
pub use detect::detect;
pub use error::{Result, WatermarkError};
pub use storage::{open_rgb, save};
