//! Built-in metric sources used by the `metricd` daemon.

mod heartbeat;
mod process;

pub use heartbeat::HeartbeatSource;
pub use process::ProcessSource;
