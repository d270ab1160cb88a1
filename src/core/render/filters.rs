//! FFmpeg Filter Construction
//!
//! Assembles filter-graph fragments for clips and caption overlays. All text
//! and path values pass through the escape helpers: filtergraphs treat `:`
//! and `,` as separators and `\` as an escape character, and drawtext expands
//! `%{...}` expressions.

use crate::core::captions::{position_expressions, CaptionStyle, OverlayClip};
use crate::core::render::{crop_to_ratio, AnimationStyle};
use crate::core::timeline::ImageClip;
use crate::core::Canvas;

use super::RenderSettings;

/// Escapes a value for use inside an FFmpeg filtergraph.
pub fn escape_filter_value(raw: &str) -> String {
    raw.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace(',', r"\,")
        .replace('\'', r"\'")
}

/// Escapes drawtext text, which additionally expands `%{...}`.
pub fn escape_drawtext_text(raw: &str) -> String {
    escape_filter_value(raw).replace('%', r"\%")
}

/// Builds the full filter chain for one image clip:
/// scale margin -> centered ratio crop -> animation -> square pixels.
///
/// `source_width`/`source_height` are the probed dimensions of the image.
pub fn clip_filter_chain(
    clip: &ImageClip,
    source_width: u32,
    source_height: u32,
    settings: &RenderSettings,
    input_index: usize,
    output_label: &str,
) -> String {
    // Scale up first so the zoom never exposes the frame edge.
    let scaled_w = (source_width as f64 * settings.scale_factor) as u32;
    let scaled_h = (source_height as f64 * settings.scale_factor) as u32;
    let crop = crop_to_ratio(scaled_w, scaled_h, settings.target_ratio);

    let mut stages = vec![
        format!("scale={scaled_w}:{scaled_h}"),
        format!("crop={}:{}:{}:{}", crop.width, crop.height, crop.x, crop.y),
    ];
    stages.extend(settings.animation.filters(
        clip.duration_sec,
        clip.zoom_in,
        settings.fps,
        settings.canvas,
    ));
    stages.push("setsar=1".to_string());

    format!("[{input_index}:v]{}[{output_label}]", stages.join(","))
}

/// Concatenates `n` labeled video streams into `[outv]`.
pub fn concat_filter(labels: &[String]) -> String {
    if labels.len() == 1 {
        return format!("[{}]null[outv]", labels[0]);
    }
    let inputs: String = labels.iter().map(|l| format!("[{l}]")).collect();
    format!("{inputs}concat=n={}:v=1:a=0[outv]", labels.len())
}

/// Builds one drawtext filter for an overlay, enabled only within its
/// scheduled interval.
pub fn drawtext_filter(overlay: &OverlayClip, style: &CaptionStyle, canvas: Canvas) -> String {
    let (x, y) = position_expressions(style, canvas.height);
    format!(
        "drawtext=text='{text}':font='{font}':fontsize={size}:fontcolor={color}\
         :borderw={border}:bordercolor={border_color}:x={x}:y={y}\
         :enable='between(t,{start:.3},{end:.3})'",
        text = escape_drawtext_text(&overlay.text),
        font = escape_filter_value(&style.font),
        size = style.font_size,
        color = style.color.to_drawtext(),
        border = style.stroke_width,
        border_color = style.stroke_color.to_drawtext(),
        start = overlay.start_sec,
        end = overlay.end_sec(),
    )
}

/// Chains drawtext filters for every overlay onto one input stream.
pub fn caption_chain(
    overlays: &[OverlayClip],
    style: &CaptionStyle,
    canvas: Canvas,
    input_label: &str,
    output_label: &str,
) -> String {
    if overlays.is_empty() {
        return format!("[{input_label}]null[{output_label}]");
    }
    let chain: Vec<String> = overlays
        .iter()
        .map(|o| drawtext_filter(o, style, canvas))
        .collect();
    format!("[{input_label}]{}[{output_label}]", chain.join(","))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{render_overlays, CaptionMode};
    use crate::core::timing::Segment;
    use std::path::PathBuf;

    fn settings() -> RenderSettings {
        RenderSettings {
            canvas: Canvas::shorts_1080(),
            fps: 30.0,
            target_ratio: 9.0 / 16.0,
            scale_factor: 1.1,
            animation: AnimationStyle::ZoomInOut,
            quality: "standard".to_string(),
        }
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("a:b,c"), r"a\:b\,c");
        assert_eq!(escape_filter_value(r"C:\media"), r"C\:\\media");
    }

    #[test]
    fn test_escape_drawtext_text() {
        assert_eq!(escape_drawtext_text("100% sure"), r"100\% sure");
        assert_eq!(escape_drawtext_text("it's"), r"it\'s");
    }

    #[test]
    fn test_clip_filter_chain_scales_then_crops() {
        let clip = ImageClip::new(1, PathBuf::from("image_1.jpg"), 2.0, true);
        let chain = clip_filter_chain(&clip, 1000, 1000, &settings(), 0, "v0");

        assert!(chain.starts_with("[0:v]scale=1100:1100,crop="));
        // 1100x1100 at 9:16 keeps height, crops width to 618.
        assert!(chain.contains("crop=618:1100:241:0"));
        assert!(chain.contains("zoompan="));
        assert!(chain.ends_with("setsar=1[v0]"));
    }

    #[test]
    fn test_concat_filter_single_stream() {
        assert_eq!(concat_filter(&["v0".to_string()]), "[v0]null[outv]");
    }

    #[test]
    fn test_concat_filter_multiple_streams() {
        let labels = vec!["v0".to_string(), "v1".to_string(), "v2".to_string()];
        assert_eq!(
            concat_filter(&labels),
            "[v0][v1][v2]concat=n=3:v=1:a=0[outv]"
        );
    }

    #[test]
    fn test_drawtext_filter_contains_timing_window() {
        let segments = vec![Segment::new(1.0, 3.0, "hello world")];
        let overlays = render_overlays(&segments, CaptionMode::Sentence);
        let style = CaptionStyle::default();

        let filter = drawtext_filter(&overlays[0], &style, Canvas::shorts_1080());
        assert!(filter.contains("text='hello world'"));
        assert!(filter.contains("enable='between(t,1.000,3.000)'"));
        assert!(filter.contains("x=(w-text_w)/2"));
        assert!(filter.contains("y=1620"));
    }

    #[test]
    fn test_caption_chain_joins_overlays() {
        let segments = vec![Segment::new(0.0, 2.0, "one two")];
        let overlays = render_overlays(&segments, CaptionMode::Word);
        let style = CaptionStyle::default();

        let chain = caption_chain(&overlays, &style, Canvas::shorts_1080(), "0:v", "outv");
        assert!(chain.starts_with("[0:v]drawtext="));
        assert!(chain.ends_with("[outv]"));
        assert_eq!(chain.matches("drawtext=").count(), 2);
    }

    #[test]
    fn test_caption_chain_empty_passthrough() {
        let chain = caption_chain(&[], &CaptionStyle::default(), Canvas::default(), "in", "out");
        assert_eq!(chain, "[in]null[out]");
    }
}
