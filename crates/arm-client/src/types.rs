use motion_playback::AngleUnit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmClientConfig {
    /// Controller base URL, e.g. `http://localhost:80`.
    pub base_url: String,
    /// Robot to address when the controller drives several arms.
    pub robot_id: Option<u32>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ArmClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:80".to_string(),
            robot_id: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Body of `POST /joints/read`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JointsReadRequest {
    pub unit: AngleUnit,
}

/// Body of `POST /joints/write`.
#[derive(Debug, Clone, Serialize)]
pub struct JointsWriteRequest<'a> {
    pub angles: &'a [f64],
    pub unit: AngleUnit,
}
