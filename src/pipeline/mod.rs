mod actuator;
pub mod frame_loop;
pub mod session;
pub mod source;

// Re-exports for convenience
pub use session::Session;
pub use source::{PoseSource, frame_interval, start_replay};
