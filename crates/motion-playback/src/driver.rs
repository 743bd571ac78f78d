//! Sequenced playback of recorded poses.
//!
//! For every label the driver prepares the target (normalizing the pose and finding the
//! arm's current joints), plans a distance-scaled straight-line path, and streams the
//! waypoints to the controller one at a time, sleeping between writes. Consecutive
//! poses of a spelled word are separated by a short dwell.
//!
//! The controller and the last known joint state live together behind one lock that
//! is held for a whole sequence, so two words never interleave their writes.

use crate::units::normalize_as;
use crate::{
    interpolate, resolve, Clock, JointState, PlaybackConfig, PlaybackError, PlaybackMetrics,
    PlaybackPlan, PlaybackWarning, PoseStore, Result, RobotController,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// What one move did.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveReport {
    pub label: String,
    pub plan: PlaybackPlan,
    pub waypoints_sent: usize,
    /// The start state came from the cache rather than a controller read.
    pub used_cached_state: bool,
}

/// What a whole sequence did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackReport {
    pub labels: Vec<String>,
    pub moves: Vec<MoveReport>,
}

impl PlaybackReport {
    pub fn waypoints_sent(&self) -> usize {
        self.moves.iter().map(|m| m.waypoints_sent).sum()
    }
}

struct Session<C> {
    controller: C,
    last_state: Option<JointState>,
}

pub struct PlaybackDriver<C, K> {
    session: Mutex<Session<C>>,
    clock: K,
    config: PlaybackConfig,
    metrics: Option<PlaybackMetrics>,
}

impl<C: RobotController, K: Clock> PlaybackDriver<C, K> {
    pub fn new(controller: C, clock: K, config: PlaybackConfig) -> Self {
        Self {
            session: Mutex::new(Session {
                controller,
                last_state: None,
            }),
            clock,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: PlaybackMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&PlaybackMetrics> {
        self.metrics.as_ref()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Send the arm home. Failure is reported as a warning; playback remains usable.
    pub fn initialize(&self) -> Option<PlaybackWarning> {
        let mut session = self.session.lock();
        match session.controller.initialize() {
            Ok(()) => {
                session.last_state = None;
                info!("robot initialized");
                None
            }
            Err(e) => {
                warn!("Failed to initialize robot: {}", e);
                Some(PlaybackWarning {
                    source: "initialize",
                    message: e.to_string(),
                })
            }
        }
    }

    /// Resolve `word` against `store` and play the resulting poses.
    pub fn play_word(&self, word: &str, store: &PoseStore) -> Result<PlaybackReport> {
        let labels = match resolve(word, store) {
            Ok(labels) => labels,
            Err(e) => {
                self.count_failure();
                return Err(e);
            }
        };
        info!("'{}' resolved to: {}", word, labels.join(", "));
        self.play(&labels, store)
    }

    /// Play `labels` in order. The first error aborts the rest of the sequence; poses
    /// already reached stay where they are.
    pub fn play(&self, labels: &[String], store: &PoseStore) -> Result<PlaybackReport> {
        let mut session = self.session.lock();
        let mut report = PlaybackReport {
            labels: labels.to_vec(),
            moves: Vec::with_capacity(labels.len()),
        };

        for (index, label) in labels.iter().enumerate() {
            match self.move_to(&mut session, label, store) {
                Ok(done) => report.moves.push(done),
                Err(e) => {
                    warn!("playback of '{}' aborted: {}", label, e);
                    self.count_failure();
                    return Err(e);
                }
            }
            if labels.len() > 1 && index + 1 < labels.len() {
                self.clock.sleep(self.config.letter_pause());
            }
        }
        Ok(report)
    }

    /// Last joint state reached by playback, if still cached.
    pub fn last_state(&self) -> Option<JointState> {
        self.session.lock().last_state.clone()
    }

    /// Drop the cached state so the next move reads the controller.
    pub fn forget_state(&self) {
        self.session.lock().last_state = None;
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.session.lock().controller)
    }

    fn move_to(
        &self,
        session: &mut Session<C>,
        label: &str,
        store: &PoseStore,
    ) -> Result<MoveReport> {
        let target = store.pose(label)?.normalized()?;
        let unit = target.unit;

        let (current, used_cached_state) = match &session.last_state {
            Some(last) if last.unit == unit => {
                debug!("reusing cached {} state for '{}'", unit, label);
                (last.angles.clone(), true)
            }
            _ => {
                if let Some(m) = &self.metrics {
                    m.joint_reads.inc();
                }
                let raw = session.controller.read_joints(unit)?;
                let state = normalize_as(&raw, unit).map_err(|e| match e {
                    PlaybackError::InvalidPayload(msg) => PlaybackError::JointReadError(msg),
                    other => other,
                })?;
                (state.angles, false)
            }
        };

        let plan = PlaybackPlan::compute(&self.config.motion, &current, &target.angles)?;
        let path = interpolate(&current, &target.angles, plan.steps)?;
        debug!(
            "plan for '{}': max_delta={:.4} scale={:.3} steps={} delay={:.4}s",
            label, plan.max_delta, plan.scale, plan.steps, plan.delay_per_step_s
        );
        info!(
            "Moving to '{}' over {:.2}s using {} steps.",
            label, plan.duration_s, plan.steps
        );

        let delay = plan.delay_per_step();
        let mut sent = 0;
        for waypoint in path.iter().skip(1) {
            if let Err(e) = session.controller.write_joints(waypoint, unit) {
                // The arm stopped somewhere along the path; the cache no longer holds.
                session.last_state = None;
                return Err(e);
            }
            sent += 1;
            if let Some(m) = &self.metrics {
                m.waypoints_sent.inc();
            }
            self.clock.sleep(delay);
        }

        session.last_state = Some(target);
        if let Some(m) = &self.metrics {
            m.moves_completed.inc();
        }
        info!("Reached '{}'.", label);

        Ok(MoveReport {
            label: label.to_string(),
            plan,
            waypoints_sent: sent,
            used_cached_state,
        })
    }

    fn count_failure(&self) {
        if let Some(m) = &self.metrics {
            m.playback_failures.inc();
        }
    }
}
