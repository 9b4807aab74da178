//! Angle samples handed from the frame loop to the actuator.
//!
//! Each buffer grows until the actuator drains it. A drain takes the whole
//! contents under the lock, so every sample is consumed exactly once.

use std::{
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::types::Signal;

#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<f64>>,
}

impl SampleBuffer {
    fn lock(&self) -> MutexGuard<'_, Vec<f64>> {
        // A panicking holder cannot leave a Vec<f64> half-written.
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a sample. Non-finite values are refused and `false` is returned.
    pub fn push(&self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.lock().push(degrees);
        true
    }

    pub fn drain(&self) -> Vec<f64> {
        mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// One buffer per signal, shared by both halves of a session.
#[derive(Debug, Default)]
pub struct SampleBuffers {
    left_arm: SampleBuffer,
    right_arm: SampleBuffer,
    face_yaw: SampleBuffer,
}

impl SampleBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signal: Signal) -> &SampleBuffer {
        match signal {
            Signal::LeftArm => &self.left_arm,
            Signal::RightArm => &self.right_arm,
            Signal::FaceYaw => &self.face_yaw,
        }
    }
}

/// Median of `samples`, sorting them in place. Even lengths average the two
/// middle values.
pub fn median(samples: &mut [f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    samples.sort_by(f64::total_cmp);
    let mid = samples.len() / 2;
    if samples.len() % 2 == 0 {
        Some((samples[mid - 1] + samples[mid]) / 2.0)
    } else {
        Some(samples[mid])
    }
}
