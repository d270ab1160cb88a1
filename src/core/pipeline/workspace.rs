//! Scratch Workspace
//!
//! A single working directory acting as the hand-off mailbox between
//! stages. Each artifact is written by exactly one stage and read by at most
//! one downstream stage; concurrent runs over the same workspace are not
//! supported.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::CoreResult;

/// Audio extensions recognized when resuming a voiceover
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg"];

/// Layout of the per-run scratch directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Formatted script, one sentence per line
    pub fn script_path(&self) -> PathBuf {
        self.root.join("script.txt")
    }

    /// Directory the voiceover file is written into
    pub fn voiceover_dir(&self) -> PathBuf {
        self.root.join("voiceover")
    }

    /// Per-segment generated images
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Segment timestamps JSON
    pub fn timestamps_path(&self) -> PathBuf {
        self.root.join("timestamps.json")
    }

    /// Rendered video outputs
    pub fn video_dir(&self) -> PathBuf {
        self.root.join("video")
    }

    /// Finished videos and the generation log, kept across runs
    pub fn history_dir(&self) -> PathBuf {
        match self.root.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("history"),
            Some(parent) => parent.join("history"),
            None => PathBuf::from("history"),
        }
    }

    /// Creates every directory the stages write into.
    pub fn ensure(&self) -> CoreResult<()> {
        for dir in [
            self.root.clone(),
            self.voiceover_dir(),
            self.images_dir(),
            self.video_dir(),
            self.history_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Removes everything under the scratch root. History is untouched.
    pub fn clear(&self) -> CoreResult<()> {
        if !self.root.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let removed = if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                warn!("Could not remove {}: {}", path.display(), e);
            }
        }
        Ok(())
    }

    /// Finds an existing voiceover file from a previous run.
    pub fn find_voiceover(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(self.voiceover_dir()).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_stem().and_then(|s| s.to_str()) == Some("voiceover")
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| AUDIO_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.ensure().unwrap();

        assert!(workspace.voiceover_dir().is_dir());
        assert!(workspace.images_dir().is_dir());
        assert!(workspace.video_dir().is_dir());
        assert!(workspace.history_dir().is_dir());
    }

    #[test]
    fn test_history_dir_is_sibling_of_root() {
        let workspace = Workspace::new("data/temp");
        assert_eq!(workspace.history_dir(), PathBuf::from("data/history"));
    }

    #[test]
    fn test_clear_removes_artifacts_but_not_history() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.ensure().unwrap();

        fs::write(workspace.script_path(), "line").unwrap();
        fs::write(workspace.images_dir().join("image_1.jpg"), "x").unwrap();
        let history_file = workspace.history_dir().join("keep.mp4");
        fs::write(&history_file, "video").unwrap();

        workspace.clear().unwrap();

        assert!(!workspace.script_path().exists());
        assert!(!workspace.images_dir().exists());
        assert!(history_file.exists());
    }

    #[test]
    fn test_find_voiceover_prefers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.ensure().unwrap();

        assert!(workspace.find_voiceover().is_none());

        fs::write(workspace.voiceover_dir().join("voiceover.wav"), "x").unwrap();
        let found = workspace.find_voiceover().unwrap();
        assert!(found.ends_with("voiceover.wav"));
    }

    #[test]
    fn test_find_voiceover_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.ensure().unwrap();

        fs::write(workspace.voiceover_dir().join("notes.txt"), "x").unwrap();
        fs::write(workspace.voiceover_dir().join("chunk_0.mp3"), "x").unwrap();
        assert!(workspace.find_voiceover().is_none());
    }
}
