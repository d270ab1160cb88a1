//! Caption Rendering
//!
//! Caption styles, the named style registry, and the overlay renderer that
//! turns timed segments into positioned text overlays.

mod models;
mod overlay;

pub use models::{CaptionMode, CaptionStyle, Color, StyleRegistry, VerticalPosition};
pub use overlay::{position_expressions, render_overlays, OverlayClip};
