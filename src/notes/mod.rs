//! Generated-notes outline format
//!
//! Generated notes use exactly two markup conventions: `**text**` for
//! section headings and `- ` bullets indented two spaces per level. The
//! renderer maps indentation depth onto three fixed visual levels.

mod outline;

pub use outline::{parse_outline, render_html, OutlineBlock};
