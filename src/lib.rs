#![forbid(unsafe_code)]

pub mod compose;
pub mod error;
pub mod layout;
pub mod logging;
pub mod text;
pub mod texture;
pub mod utils;

pub use error::{Error, Result};
pub use text::Font;
pub use texture::Texture;
