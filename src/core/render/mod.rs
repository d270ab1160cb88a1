//! Rendering
//!
//! Crop geometry, animation variants, FFmpeg filter-graph construction, and
//! the exporter that turns a timeline into encoder invocations.

mod animation;
mod export;
mod filters;
mod geometry;

pub use animation::AnimationStyle;
pub use export::{Exporter, RenderSettings};
pub use filters::{
    caption_chain, clip_filter_chain, concat_filter, drawtext_filter, escape_drawtext_text,
    escape_filter_value,
};
pub use geometry::crop_to_ratio;
