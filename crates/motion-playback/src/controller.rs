use crate::{AngleUnit, PlaybackError, Result};
use serde_json::Value;

/// The robot-side operations playback relies on.
pub trait RobotController: Send {
    /// Reset the arm to its home pose.
    fn initialize(&mut self) -> Result<()>;

    /// Current joint angles in `unit`.
    fn read_joints(&mut self, unit: AngleUnit) -> Result<Vec<f64>>;

    /// Command immediate joint targets.
    fn write_joints(&mut self, angles: &[f64], unit: AngleUnit) -> Result<()>;
}

impl<C: RobotController + ?Sized> RobotController for Box<C> {
    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn read_joints(&mut self, unit: AngleUnit) -> Result<Vec<f64>> {
        (**self).read_joints(unit)
    }

    fn write_joints(&mut self, angles: &[f64], unit: AngleUnit) -> Result<()> {
        (**self).write_joints(angles, unit)
    }
}

/// Extract the `angles` list from a joint read response.
pub fn parse_joint_reading(payload: &Value) -> Result<Vec<f64>> {
    let angles = payload
        .get("angles")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PlaybackError::JointReadError("controller returned invalid joint data".to_string())
        })?;
    angles
        .iter()
        .map(|a| {
            a.as_f64().ok_or_else(|| {
                PlaybackError::JointReadError(format!("non-numeric joint angle: {a}"))
            })
        })
        .collect()
}

/// Accept a controller acknowledgment. A missing `status` counts as `ok`; any other
/// value, including `null` or a non-string, is an error.
pub fn check_status(payload: &Value) -> Result<()> {
    match payload.get("status") {
        None => return Ok(()),
        Some(Value::String(s)) if s == "ok" => return Ok(()),
        Some(_) => {}
    }
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("robot returned an error status");
    Err(PlaybackError::ControllerError(message.to_string()))
}
