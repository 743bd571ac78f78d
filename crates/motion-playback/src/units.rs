//! Conversion of angle payloads into the unit interpolation works in.
//!
//! Degrees become radians; radians and raw motor units pass through unchanged. Motor
//! units are never converted to radians.

use crate::{AngleUnit, JointState, PlaybackError, Result};
use serde_json::Value;

/// Normalize `raw` angles given a textual unit hint (`None`/empty means degrees).
pub fn normalize(raw: &[f64], unit_hint: Option<&str>) -> Result<JointState> {
    let unit = AngleUnit::parse(unit_hint)?;
    normalize_as(raw, unit)
}

/// Normalize `raw` angles already tagged with a parsed unit.
pub fn normalize_as(raw: &[f64], unit: AngleUnit) -> Result<JointState> {
    if raw.is_empty() {
        return Err(PlaybackError::InvalidPayload(
            "angle payload is empty".to_string(),
        ));
    }
    if let Some(i) = raw.iter().position(|a| !a.is_finite()) {
        return Err(PlaybackError::InvalidPayload(format!(
            "angle {i} is not a finite number"
        )));
    }
    let angles = match unit {
        AngleUnit::Degrees => raw.iter().map(|a| a.to_radians()).collect(),
        AngleUnit::Rad | AngleUnit::MotorUnits => raw.to_vec(),
    };
    Ok(JointState::new(angles, unit.canonical()))
}

/// Normalize an untyped JSON payload, as found in recorded pose files.
pub fn normalize_value(raw: Option<&Value>, unit_hint: Option<&str>) -> Result<JointState> {
    let angles = angles_from_value(raw)?;
    normalize(&angles, unit_hint)
}

pub(crate) fn angles_from_value(raw: Option<&Value>) -> Result<Vec<f64>> {
    let items = match raw {
        None | Some(Value::Null) => {
            return Err(PlaybackError::InvalidPayload(
                "angle payload missing".to_string(),
            ))
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(PlaybackError::InvalidPayload(format!(
                "angle payload is not a list: {other}"
            )))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64().ok_or_else(|| {
                PlaybackError::InvalidPayload(format!("angle {i} is not a number: {v}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::f64::consts::PI;

    #[test]
    fn test_degrees_become_radians() {
        let state = normalize(&[180.0], None).unwrap();
        assert_eq!(state.unit, AngleUnit::Rad);
        assert!((state.angles[0] - PI).abs() < 1e-12);

        let state = normalize(&[90.0, -45.0], Some("DEGREES")).unwrap();
        assert!((state.angles[0] - PI / 2.0).abs() < 1e-12);
        assert!((state.angles[1] + PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_radians_are_unchanged() {
        let raw = [0.1, -1.25, 3.0];
        for hint in ["rad", "radian", "Radians"] {
            let state = normalize(&raw, Some(hint)).unwrap();
            assert_eq!(state.unit, AngleUnit::Rad);
            assert_eq!(state.angles, raw.to_vec());
        }
    }

    #[test]
    fn test_normalizing_canonical_payload_is_idempotent() {
        let once = normalize(&[0.5, 1.5], Some("rad")).unwrap();
        let twice = normalize(&once.angles, Some(once.unit.as_str())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_motor_units_never_converted() {
        let state = normalize(&[2048.0, 1024.0], Some("motor_units")).unwrap();
        assert_eq!(state.unit, AngleUnit::MotorUnits);
        assert_eq!(state.angles, vec![2048.0, 1024.0]);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(matches!(
            normalize(&[1.0], Some("turns")),
            Err(PlaybackError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_value_payload_validation() {
        assert!(matches!(
            normalize_value(None, None),
            Err(PlaybackError::InvalidPayload(_))
        ));
        assert!(matches!(
            normalize_value(Some(&json!("90")), None),
            Err(PlaybackError::InvalidPayload(_))
        ));
        assert!(matches!(
            normalize_value(Some(&json!([1.0, "x"])), None),
            Err(PlaybackError::InvalidPayload(_))
        ));
        assert!(matches!(
            normalize_value(Some(&json!([])), Some("rad")),
            Err(PlaybackError::InvalidPayload(_))
        ));

        let state = normalize_value(Some(&json!([0, 1.5])), Some("rad")).unwrap();
        assert_eq!(state.angles, vec![0.0, 1.5]);
    }
}
