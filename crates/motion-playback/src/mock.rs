use crate::{AngleUnit, Clock, ManualClock, PlaybackError, Result, RobotController};
use std::f64::consts::PI;
use std::time::Duration;

/// One joint command received by [`MockController`].
#[derive(Clone, Debug, PartialEq)]
pub struct WriteRecord {
    pub angles: Vec<f64>,
    pub unit: AngleUnit,
    /// Simulated time of the write, when a clock is attached.
    pub at: Option<Duration>,
}

/// In-process controller that remembers what it was told. Joint state is kept in radians.
#[derive(Debug, Default)]
pub struct MockController {
    joints_rad: Vec<f64>,
    clock: Option<ManualClock>,
    writes: Vec<WriteRecord>,
    reads: Vec<AngleUnit>,
    initialized: bool,
    fail_init: bool,
    fail_reads: bool,
    fail_write_at: Option<usize>,
}

impl MockController {
    pub fn new(joints_rad: Vec<f64>) -> Self {
        Self {
            joints_rad,
            ..Default::default()
        }
    }

    /// Stamp each write with the time of a shared simulated clock.
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Reject the `n`-th write (zero based) and every one after it.
    pub fn failing_write_at(mut self, n: usize) -> Self {
        self.fail_write_at = Some(n);
        self
    }

    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    pub fn reads(&self) -> &[AngleUnit] {
        &self.reads
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn joints_rad(&self) -> &[f64] {
        &self.joints_rad
    }
}

// Motor units follow the common 12-bit servo convention: 4096 counts per turn.
const COUNTS_PER_RAD: f64 = 4096.0 / (2.0 * PI);

fn from_rad(angle: f64, unit: AngleUnit) -> f64 {
    match unit {
        AngleUnit::Degrees => angle.to_degrees(),
        AngleUnit::Rad => angle,
        AngleUnit::MotorUnits => angle * COUNTS_PER_RAD,
    }
}

fn to_rad(angle: f64, unit: AngleUnit) -> f64 {
    match unit {
        AngleUnit::Degrees => angle.to_radians(),
        AngleUnit::Rad => angle,
        AngleUnit::MotorUnits => angle / COUNTS_PER_RAD,
    }
}

impl RobotController for MockController {
    fn initialize(&mut self) -> Result<()> {
        if self.fail_init {
            return Err(PlaybackError::ControllerError(
                "mock controller refused init".to_string(),
            ));
        }
        self.joints_rad.iter_mut().for_each(|j| *j = 0.0);
        self.initialized = true;
        Ok(())
    }

    fn read_joints(&mut self, unit: AngleUnit) -> Result<Vec<f64>> {
        self.reads.push(unit);
        if self.fail_reads {
            return Err(PlaybackError::JointReadError(
                "controller returned invalid joint data".to_string(),
            ));
        }
        Ok(self.joints_rad.iter().map(|&a| from_rad(a, unit)).collect())
    }

    fn write_joints(&mut self, angles: &[f64], unit: AngleUnit) -> Result<()> {
        if self.fail_write_at.is_some_and(|n| self.writes.len() >= n) {
            return Err(PlaybackError::ControllerError(
                "mock controller rejected write".to_string(),
            ));
        }
        self.joints_rad = angles.iter().map(|&a| to_rad(a, unit)).collect();
        self.writes.push(WriteRecord {
            angles: angles.to_vec(),
            unit,
            at: self.clock.as_ref().map(Clock::now),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_requested_unit() {
        let mut ctl = MockController::new(vec![PI, 0.0]);
        let deg = ctl.read_joints(AngleUnit::Degrees).unwrap();
        assert!((deg[0] - 180.0).abs() < 1e-9);
        let counts = ctl.read_joints(AngleUnit::MotorUnits).unwrap();
        assert!((counts[0] - 2048.0).abs() < 1e-9);
        assert_eq!(ctl.reads(), &[AngleUnit::Degrees, AngleUnit::MotorUnits]);
    }

    #[test]
    fn test_write_updates_state_and_timestamps() {
        let clock = ManualClock::new();
        let mut ctl = MockController::new(vec![0.0]).with_clock(clock.clone());
        clock.advance(Duration::from_millis(5));
        ctl.write_joints(&[90.0], AngleUnit::Degrees).unwrap();
        assert!((ctl.joints_rad()[0] - PI / 2.0).abs() < 1e-12);
        assert_eq!(ctl.writes()[0].at, Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_failure_switches() {
        let mut ctl = MockController::new(vec![0.0])
            .failing_init()
            .failing_reads()
            .failing_write_at(1);
        assert!(ctl.initialize().is_err());
        assert!(matches!(
            ctl.read_joints(AngleUnit::Rad),
            Err(PlaybackError::JointReadError(_))
        ));
        assert!(ctl.write_joints(&[0.1], AngleUnit::Rad).is_ok());
        assert!(matches!(
            ctl.write_joints(&[0.2], AngleUnit::Rad),
            Err(PlaybackError::ControllerError(_))
        ));
        assert_eq!(ctl.writes().len(), 1);
    }
}
