//! Animation Variants
//!
//! The closed set of per-clip transforms: zoom, fade, or the alternating
//! mix. Each variant compiles to an FFmpeg filter chain applied after the
//! clip has been scaled and cropped.

use tracing::warn;

use crate::core::{Canvas, TimeSec};

/// Zoom step per frame; over a typical clip this stays inside the 1.1x
/// pre-crop scale margin so edges never show.
const ZOOM_STEP: f64 = 0.0015;

/// Maximum zoom factor, matching the pre-crop scale margin
const ZOOM_MAX: f64 = 1.1;

/// Fade length at each end of a clip
const FADE_SEC: f64 = 0.5;

/// A named visual transform applied per image clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnimationStyle {
    /// Ken-Burns style zoom, direction alternating per clip
    ZoomInOut,
    /// Fade in at the start and out at the end of each clip
    FadeInOut,
    /// Zoom plus fade combined
    #[default]
    ZoomFadeMix,
}

impl AnimationStyle {
    /// Parses a variant name, falling back to the default mix.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "zoom_in_out" => Self::ZoomInOut,
            "fade_in_out" => Self::FadeInOut,
            "zoom_fade_mix" => Self::ZoomFadeMix,
            other => {
                warn!(
                    "Unknown animation variant '{}', falling back to zoom_fade_mix",
                    other
                );
                Self::ZoomFadeMix
            }
        }
    }

    /// Builds the filter chain for one clip.
    ///
    /// `zoom_in` selects the zoom direction; fades ignore it.
    pub fn filters(
        &self,
        duration_sec: TimeSec,
        zoom_in: bool,
        fps: f64,
        canvas: Canvas,
    ) -> Vec<String> {
        match self {
            Self::ZoomInOut => vec![zoom_filter(duration_sec, zoom_in, fps, canvas)],
            Self::FadeInOut => fade_filters(duration_sec),
            Self::ZoomFadeMix => {
                let mut chain = vec![zoom_filter(duration_sec, zoom_in, fps, canvas)];
                chain.extend(fade_filters(duration_sec));
                chain
            }
        }
    }
}

fn zoom_filter(duration_sec: TimeSec, zoom_in: bool, fps: f64, canvas: Canvas) -> String {
    let frames = (duration_sec * fps).ceil().max(1.0) as u64;
    let expr = if zoom_in {
        format!("min(zoom+{ZOOM_STEP},{ZOOM_MAX})")
    } else {
        format!("max({ZOOM_MAX}-{ZOOM_STEP}*on,1.0)")
    };
    format!(
        "zoompan=z='{expr}':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d={frames}:s={}x{}:fps={fps}",
        canvas.width, canvas.height
    )
}

fn fade_filters(duration_sec: TimeSec) -> Vec<String> {
    // Short clips get symmetric fades that never overlap.
    let fade = FADE_SEC.min(duration_sec / 2.0);
    vec![
        format!("fade=t=in:st=0:d={fade:.3}"),
        format!("fade=t=out:st={:.3}:d={fade:.3}", duration_sec - fade),
    ]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_variants() {
        assert_eq!(AnimationStyle::from_name("zoom_in_out"), AnimationStyle::ZoomInOut);
        assert_eq!(AnimationStyle::from_name("fade_in_out"), AnimationStyle::FadeInOut);
        assert_eq!(
            AnimationStyle::from_name("zoom_fade_mix"),
            AnimationStyle::ZoomFadeMix
        );
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        assert_eq!(
            AnimationStyle::from_name("spin_cycle"),
            AnimationStyle::ZoomFadeMix
        );
    }

    #[test]
    fn test_zoom_direction_changes_expression() {
        let canvas = Canvas::shorts_1080();
        let zoom_in = AnimationStyle::ZoomInOut.filters(3.0, true, 30.0, canvas);
        let zoom_out = AnimationStyle::ZoomInOut.filters(3.0, false, 30.0, canvas);

        assert_eq!(zoom_in.len(), 1);
        assert!(zoom_in[0].contains("min(zoom+"));
        assert!(zoom_out[0].contains("max(1.1-"));
    }

    #[test]
    fn test_zoom_frame_count_follows_duration() {
        let canvas = Canvas::shorts_1080();
        let filters = AnimationStyle::ZoomInOut.filters(2.0, true, 30.0, canvas);
        assert!(filters[0].contains(":d=60:"));
        assert!(filters[0].contains("s=1080x1920"));
    }

    #[test]
    fn test_fade_covers_both_ends() {
        let filters = AnimationStyle::FadeInOut.filters(4.0, true, 30.0, Canvas::default());

        assert_eq!(filters.len(), 2);
        assert!(filters[0].contains("t=in:st=0"));
        assert!(filters[1].contains("t=out:st=3.500"));
    }

    #[test]
    fn test_fade_shrinks_on_short_clips() {
        let filters = AnimationStyle::FadeInOut.filters(0.6, true, 30.0, Canvas::default());
        assert!(filters[0].contains("d=0.300"));
        assert!(filters[1].contains("st=0.300"));
    }

    #[test]
    fn test_mix_combines_zoom_and_fade() {
        let filters = AnimationStyle::ZoomFadeMix.filters(3.0, false, 30.0, Canvas::default());

        assert_eq!(filters.len(), 3);
        assert!(filters[0].starts_with("zoompan="));
        assert!(filters[1].starts_with("fade=t=in"));
        assert!(filters[2].starts_with("fade=t=out"));
    }
}
