//! Stage Tracker
//!
//! Records per-stage wall time and emits a timing summary when a run
//! completes.

use std::time::{Duration, Instant};

use tracing::info;

/// Pipeline stages in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Script,
    Voiceover,
    Timing,
    ImageGen,
    Video,
    Captions,
    Bgm,
    Cleanup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Script => "script",
            Stage::Voiceover => "voiceover",
            Stage::Timing => "timing",
            Stage::ImageGen => "image generation",
            Stage::Video => "video assembly",
            Stage::Captions => "captions",
            Stage::Bgm => "background music",
            Stage::Cleanup => "cleanup",
        };
        write!(f, "{name}")
    }
}

/// Tracks stage transitions and their durations for one run.
pub struct StageTracker {
    started: Instant,
    current: Option<(Stage, Instant)>,
    completed: Vec<(Stage, Duration)>,
}

impl StageTracker {
    pub fn new(topic: &str) -> Self {
        info!("Starting video generation for topic: '{}'", topic);
        Self {
            started: Instant::now(),
            current: None,
            completed: Vec::new(),
        }
    }

    /// Enters a new stage, closing out the previous one.
    pub fn begin(&mut self, stage: Stage) {
        self.finish_current();
        info!("Starting stage: {}", stage);
        self.current = Some((stage, Instant::now()));
    }

    fn finish_current(&mut self) {
        if let Some((stage, started)) = self.current.take() {
            let elapsed = started.elapsed();
            info!("Completed stage {} in {}", stage, format_duration(elapsed));
            self.completed.push((stage, elapsed));
        }
    }

    /// Marks the run complete and logs the timing summary.
    pub fn complete(&mut self, output: Option<&std::path::Path>) {
        self.finish_current();
        let total = self.started.elapsed();

        info!("Generation complete in {}", format_duration(total));
        if let Some(path) = output {
            info!("Output saved to {}", path.display());
        }
        for (stage, elapsed) in &self.completed {
            info!("  {}: {}", stage, format_duration(*elapsed));
        }
    }

    /// Stages completed so far, in order.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.completed.iter().map(|(stage, _)| *stage).collect()
    }
}

/// Formats a duration as `12.34s`, `1m 2.34s`, or `1h 2m 3.45s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.2}s")
    } else if secs < 3600.0 {
        format!("{}m {:.2}s", (secs / 60.0) as u64, secs % 60.0)
    } else {
        let hours = (secs / 3600.0) as u64;
        let rest = secs % 3600.0;
        format!("{}h {}m {:.2}s", hours, (rest / 60.0) as u64, rest % 60.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
