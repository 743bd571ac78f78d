//! arm-client: REST access to the arm controller
//!
//! Wraps the controller's `move/init`, `joints/read` and `joints/write` endpoints and
//! exposes them through [`motion_playback::RobotController`].

mod types;
pub use types::{ArmClientConfig, JointsReadRequest, JointsWriteRequest};

mod error;
pub use error::{ClientError, Result};

mod client;
pub use client::ArmClient;
