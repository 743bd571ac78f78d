use core::fmt;
use serde::{Deserialize, Serialize};

/// Unit a joint angle vector is expressed in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    #[serde(alias = "deg")]
    Degrees,
    #[serde(alias = "radian", alias = "radians")]
    Rad,
    MotorUnits,
}

impl AngleUnit {
    /// Parse a unit hint. Absent or empty hints mean degrees; matching ignores case.
    pub fn parse(hint: Option<&str>) -> crate::Result<Self> {
        let raw = hint.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::Degrees);
        }
        match raw.to_ascii_lowercase().as_str() {
            "degrees" => Ok(Self::Degrees),
            "rad" | "radian" | "radians" => Ok(Self::Rad),
            "motor_units" => Ok(Self::MotorUnits),
            _ => Err(crate::PlaybackError::UnsupportedUnit(raw.to_string())),
        }
    }

    /// Unit interpolation is performed in. Degrees are always worked in radians.
    pub fn canonical(self) -> Self {
        match self {
            Self::Degrees | Self::Rad => Self::Rad,
            Self::MotorUnits => Self::MotorUnits,
        }
    }

    pub fn is_canonical(self) -> bool {
        self.canonical() == self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Degrees => "degrees",
            Self::Rad => "rad",
            Self::MotorUnits => "motor_units",
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, recorded joint configuration. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    label: String,
    angles: Vec<f64>,
    unit: AngleUnit,
}

impl Pose {
    pub fn new(label: impl Into<String>, angles: Vec<f64>, unit: AngleUnit) -> Self {
        Self {
            label: label.into(),
            angles,
            unit,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }
    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Angles converted into the pose's canonical unit.
    pub fn normalized(&self) -> crate::Result<JointState> {
        crate::units::normalize_as(&self.angles, self.unit)
    }
}

/// Snapshot of the arm's joints in a canonical unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    pub angles: Vec<f64>,
    pub unit: AngleUnit,
}

impl JointState {
    pub fn new(angles: Vec<f64>, unit: AngleUnit) -> Self {
        Self { angles, unit }
    }

    pub fn joint_count(&self) -> usize {
        self.angles.len()
    }
}
