//! Pose-driven servo control.
//!
//! Per-frame pose detections go in; rate-limited servo commands come out.
//! A frame loop picks the largest confident pose, turns its keypoints into
//! joint angles and buffers them; an actuator on its own timer drains the
//! buffers, median-filters them and commands a servo only when the target
//! moved by more than the deadband.

pub mod buffer;
pub mod config;
pub mod estimator;
pub mod gate;
pub mod geometry;
pub mod pipeline;
pub mod selector;
pub mod servo;
pub mod types;
