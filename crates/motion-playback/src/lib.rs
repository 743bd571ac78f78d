//! motion-playback: turn one-word answers into arm gestures
//!
//! A word is resolved into recorded pose labels, each pose is normalized into the
//! controller's working unit, and the arm is driven there along a straight joint-space
//! path whose duration and step count scale with the distance travelled. The default
//! build enables a `mock` backend (simulated controller and clock) so that playback can be
//! exercised without hardware.

mod types;
pub use types::{AngleUnit, JointState, Pose};

mod error;
pub use error::{PlaybackError, PlaybackWarning, Result};

mod store;
pub use store::PoseStore;

mod resolve;
pub use resolve::{resolve, sanitize_answer};

pub mod units;
pub use units::{normalize, normalize_value};

pub mod trajectory;
pub use trajectory::{interpolate, PlaybackPlan};

mod config;
pub use config::{MotionProfile, PlaybackConfig};

mod clock;
pub use clock::{Clock, SystemClock};

mod controller;
pub use controller::{check_status, parse_joint_reading, RobotController};

mod metrics;
pub use metrics::PlaybackMetrics;

mod driver;
pub use driver::{MoveReport, PlaybackDriver, PlaybackReport};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use clock::ManualClock;

#[cfg(feature = "mock")]
pub use mock::{MockController, WriteRecord};
