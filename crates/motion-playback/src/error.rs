use thiserror::Error;

pub type Result<T, E = PlaybackError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("invalid angle payload: {0}")]
    InvalidPayload(String),
    #[error("unsupported joint angle unit '{0}'")]
    UnsupportedUnit(String),
    #[error("joint count mismatch: current has {current}, target has {target}")]
    DimensionMismatch { current: usize, target: usize },
    #[error("no recorded poses for '{0}'")]
    NotFound(String),
    #[error("failed to read current joints: {0}")]
    JointReadError(String),
    #[error("controller error: {0}")]
    ControllerError(String),
    #[error("cannot load recorded positions from {path}: {reason}")]
    StoreLoad { path: String, reason: String },
}

/// A non-fatal problem reported outside the request path (e.g. robot init at startup).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlaybackWarning {
    pub source: &'static str,
    pub message: String,
}

impl core::fmt::Display for PlaybackWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}
