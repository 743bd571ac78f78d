use crate::{ArmClientConfig, ClientError, JointsReadRequest, JointsWriteRequest, Result};
use motion_playback::{check_status, parse_joint_reading, AngleUnit, PlaybackError, RobotController};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Blocking client for the arm controller's REST API.
pub struct ArmClient {
    base_url: String,
    robot_id: Option<u32>,
    http: Client,
}

impl ArmClient {
    pub fn new(config: ArmClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.base_url));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url,
            robot_id: config.robot_id,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /move/init`: reset the arm to its home pose.
    pub fn init_arm(&self) -> Result<Value> {
        let payload = self.post::<()>("/move/init", None)?;
        ensure_ok(&payload)?;
        Ok(payload)
    }

    /// `POST /joints/read`: raw joint snapshot in `unit`.
    pub fn read_joints_raw(&self, unit: AngleUnit) -> Result<Value> {
        self.post("/joints/read", Some(&JointsReadRequest { unit }))
    }

    /// `POST /joints/write`: command joint targets.
    pub fn write_joints_raw(&self, angles: &[f64], unit: AngleUnit) -> Result<Value> {
        let payload = self.post("/joints/write", Some(&JointsWriteRequest { angles, unit }))?;
        ensure_ok(&payload)?;
        Ok(payload)
    }

    fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<Value> {
        let mut req = self.http.post(self.url(path));
        if let Some(id) = self.robot_id {
            req = req.query(&[("robot_id", id)]);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send()?.error_for_status()?;
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = resp.text()?;
        debug!("{} -> {}", path, text);
        decode_body(&text, is_json)
    }
}

fn decode_body(text: &str, is_json: bool) -> Result<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) if is_json => Err(ClientError::Decode(e.to_string())),
        Err(_) => Err(ClientError::Decode(format!(
            "expected a JSON body, got: {}",
            text.chars().take(80).collect::<String>()
        ))),
    }
}

fn ensure_ok(payload: &Value) -> Result<()> {
    check_status(payload).map_err(|e| match e {
        PlaybackError::ControllerError(msg) => ClientError::Api(msg),
        other => ClientError::Api(other.to_string()),
    })
}

fn read_failure(e: ClientError) -> PlaybackError {
    PlaybackError::JointReadError(e.to_string())
}

fn command_failure(e: ClientError) -> PlaybackError {
    PlaybackError::ControllerError(e.to_string())
}

impl RobotController for ArmClient {
    fn initialize(&mut self) -> motion_playback::Result<()> {
        self.init_arm().map(|_| ()).map_err(command_failure)
    }

    fn read_joints(&mut self, unit: AngleUnit) -> motion_playback::Result<Vec<f64>> {
        let payload = self.read_joints_raw(unit).map_err(read_failure)?;
        parse_joint_reading(&payload)
    }

    fn write_joints(&mut self, angles: &[f64], unit: AngleUnit) -> motion_playback::Result<()> {
        self.write_joints_raw(angles, unit)
            .map(|_| ())
            .map_err(command_failure)
    }
}
