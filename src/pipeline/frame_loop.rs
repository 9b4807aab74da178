use crossbeam_channel::{Receiver, select};

use crate::{
    buffer::SampleBuffers,
    config::Config,
    estimator::{self, JointAngles},
    selector::select_pose,
    types::{Pose, Signal},
};

/// Turns one frame of detections into buffered samples. Returns how many
/// samples were appended; a frame without a confident pose appends none.
pub fn process_frame(poses: &[Pose], config: &Config, buffers: &SampleBuffers) -> usize {
    let Some(pose) = select_pose(poses, config.min_pose_confidence) else {
        return 0;
    };

    let angles = estimator::estimate(pose, config.min_part_confidence);
    let mut appended = 0;
    for signal in Signal::ALL {
        let Some(raw) = raw_angle(&angles, signal) else {
            continue;
        };
        let mapped = config.mapping(signal).apply(raw);
        if buffers.get(signal).push(mapped) {
            appended += 1;
        } else {
            log::warn!("{}: dropped non-finite sample {mapped}", signal.label());
        }
    }
    appended
}

fn raw_angle(angles: &JointAngles, signal: Signal) -> Option<f64> {
    match signal {
        Signal::LeftArm => angles.left_arm,
        Signal::RightArm => angles.right_arm,
        Signal::FaceYaw => angles.face_yaw,
    }
}

/// Consumes frames until the producer hangs up or the stop channel closes.
pub(crate) fn run_frame_loop(
    frame_rx: Receiver<Vec<Pose>>,
    stop_rx: Receiver<()>,
    config: &Config,
    buffers: &SampleBuffers,
) {
    let mut frames = 0u64;
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(frame_rx) -> msg => match msg {
                Ok(poses) => {
                    process_frame(&poses, config, buffers);
                    frames += 1;
                }
                Err(_) => {
                    log::info!("pose source closed after {frames} frames");
                    break;
                }
            },
        }
    }
    log::debug!("frame loop exiting");
}
