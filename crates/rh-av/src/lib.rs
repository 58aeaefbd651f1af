//! # rh-av
//!
//! External media tooling for reelhouse.
//!
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Duration probing** ([`DurationProbe`]) -- the seam the upload path
//!   uses to learn a video's length; [`FfprobeDurationProbe`] shells out to
//!   `ffprobe`, [`UnavailableProbe`] stands in when it is not installed.

pub mod command;
pub mod probe;

pub use command::{ToolCommand, ToolOutput};
pub use probe::{parse_duration, DurationProbe, FfprobeDurationProbe, UnavailableProbe};
