//! Quote content rendering
//!
//! - [`generator`] builds and reads back the quotation markup
//! - [`css`] maps style fields to CSS and reads a CSS subset back

pub mod css;
pub mod generator;

pub use css::{decode_glyph, parse_stylesheet, to_stylesheet};
pub use generator::{extract, find_enclosing, generate, to_html};
