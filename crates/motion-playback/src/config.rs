use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Duration and step scaling parameters for a single move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    /// Duration of a move covering at least `reference_motion`, in seconds.
    pub base_duration_s: f64,
    /// Floor for the scaled duration, in seconds.
    pub min_duration_s: f64,
    /// Joint distance (in the canonical unit) that maps to the full base duration.
    pub reference_motion: f64,
    /// Interpolation steps for a full-length move.
    pub steps: usize,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            base_duration_s: 2.0,
            min_duration_s: 0.6,
            reference_motion: 1.0,
            steps: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub motion: MotionProfile,
    /// Dwell between consecutive poses of a spelled-out word, in seconds.
    pub letter_pause_s: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            motion: MotionProfile::default(),
            letter_pause_s: 0.6,
        }
    }
}

impl PlaybackConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading playback config: {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing yaml: {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Override fields from `INTERP_DURATION`, `INTERP_MIN_DURATION`, `INTERP_REFERENCE`,
    /// `INTERP_STEPS` and `LETTER_PAUSE`. Unparsable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = parse_var(&lookup, "INTERP_DURATION") {
            self.motion.base_duration_s = v;
        }
        if let Some(v) = parse_var(&lookup, "INTERP_MIN_DURATION") {
            self.motion.min_duration_s = v;
        }
        if let Some(v) = parse_var(&lookup, "INTERP_REFERENCE") {
            self.motion.reference_motion = v;
        }
        if let Some(v) = parse_var(&lookup, "INTERP_STEPS") {
            self.motion.steps = v;
        }
        if let Some(v) = parse_var(&lookup, "LETTER_PAUSE") {
            self.letter_pause_s = v;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.motion;
        for (name, value) in [
            ("base_duration_s", m.base_duration_s),
            ("min_duration_s", m.min_duration_s),
            ("letter_pause_s", self.letter_pause_s),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }
        if !m.reference_motion.is_finite() {
            bail!("reference_motion must be finite, got {}", m.reference_motion);
        }
        Ok(())
    }

    pub fn letter_pause(&self) -> Duration {
        Duration::try_from_secs_f64(self.letter_pause_s).unwrap_or_default()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
