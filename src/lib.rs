//! New Year fireworks for the terminal: rockets and sparks, a countdown to
//! midnight and falling stickers, drawn with half-block characters.

pub mod canvas;
pub mod config;
pub mod effects;
pub mod error;
pub mod random;
pub mod scene;
pub mod schedule;

pub use config::Config;
pub use error::{Error, Result};
pub use scene::Scene;
