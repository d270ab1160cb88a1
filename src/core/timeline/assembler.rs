//! Timeline Assembler
//!
//! Sequences per-segment image clips into the base track and binds the
//! voiceover audio. A missing image drops only that segment's clip; its
//! duration is not redistributed, so the visual track may end before the
//! audio does. That is accepted lossy behavior, not an error.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{ImageClip, Timeline};
use crate::core::timing::Segment;
use crate::core::{CoreError, CoreResult};

/// Builds the timeline from segments and their 1:1 image paths.
///
/// Clip `i` (1-indexed) takes `image_paths[i-1]`, lasts exactly the segment's
/// span, and zooms in on odd indices and out on even ones, a deterministic
/// alternation. Fails with [`CoreError::NoClips`] when every image is
/// missing and with [`CoreError::SegmentMismatch`] when the path list does
/// not pair up with the segments.
pub fn assemble(
    segments: &[Segment],
    image_paths: &[PathBuf],
    audio_path: &Path,
) -> CoreResult<Timeline> {
    if segments.len() != image_paths.len() {
        return Err(CoreError::SegmentMismatch {
            segments: segments.len(),
            images: image_paths.len(),
        });
    }

    let mut clips = Vec::with_capacity(segments.len());

    for (i, (segment, path)) in segments.iter().zip(image_paths).enumerate() {
        let index = i + 1;
        if !path.exists() {
            warn!(
                "Image {} not found at {}, skipping segment",
                index,
                path.display()
            );
            continue;
        }

        clips.push(ImageClip::new(
            index,
            path.clone(),
            segment.duration(),
            index % 2 == 1,
        ));
    }

    if clips.is_empty() {
        return Err(CoreError::NoClips);
    }

    info!(
        "Assembled {} of {} clips ({:.2}s base track)",
        clips.len(),
        segments.len(),
        clips.iter().map(|c| c.duration_sec).sum::<f64>()
    );

    Ok(Timeline::new(clips, audio_path.to_path_buf()))
}

// =============================================================================
// Tests
// =============================================================================
