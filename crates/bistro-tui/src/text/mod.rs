//! Text utilities for terminal rendering.

pub mod width;
pub mod wrap;

pub use width::{pad_to_width, truncate_to_width, visual_width};
pub use wrap::wrap_text;
