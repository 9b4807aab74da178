pub mod bridge;

use serde::{Deserialize, Serialize};

use crate::{
    buffer::{SampleBuffer, SampleBuffers, median},
    config::Config,
    types::{ServoId, Signal},
};

pub use self::bridge::{BridgeError, LineBridge, ServoBridge};

pub const MAX_ANGLE: u8 = 180;

/// Clamps to the servo's physical travel and rounds to whole degrees.
pub fn clamp_angle(degrees: f64) -> u8 {
    if degrees.is_nan() {
        return 0;
    }
    degrees.clamp(0.0, f64::from(MAX_ANGLE)).round() as u8
}

/// Linear map from a geometric joint angle into a servo's own frame,
/// `offset + scale * raw`. Depends on how each servo is mounted on the rig.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleMapping {
    pub scale: f64,
    pub offset: f64,
}

impl AngleMapping {
    pub const IDENTITY: AngleMapping = AngleMapping {
        scale: 1.0,
        offset: 0.0,
    };

    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        self.offset + self.scale * raw
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServoState {
    pub id: ServoId,
    pub current_angle: u8,
}

impl ServoState {
    pub fn new(id: ServoId, angle: u8) -> Self {
        Self {
            id,
            current_angle: angle.min(MAX_ANGLE),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    /// Nothing buffered since the previous tick.
    Idle,
    /// The target angle is within the deadband of the current position.
    Suppressed { median: f64 },
    Commanded { angle: u8 },
    /// The bridge refused the command; the servo keeps its previous angle.
    Failed { angle: u8 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    outcomes: Vec<(Signal, CommandOutcome)>,
}

impl TickReport {
    pub fn outcome(&self, signal: Signal) -> CommandOutcome {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == signal)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(CommandOutcome::Idle)
    }

    pub fn commands_issued(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CommandOutcome::Commanded { .. }))
            .count()
    }
}

/// Turns buffered samples into servo commands, one decision per signal per tick.
pub struct ServoActuator<B: ServoBridge> {
    bridge: B,
    servos: [ServoState; 3],
    deadband: f64,
}

impl<B: ServoBridge> ServoActuator<B> {
    pub fn new(bridge: B, config: &Config) -> Self {
        Self {
            bridge,
            servos: ServoId::ALL.map(|id| ServoState::new(id, config.initial_angle(id))),
            deadband: config.deadband_degrees,
        }
    }

    pub fn servo(&self, id: ServoId) -> ServoState {
        self.servos[id as usize]
    }

    pub fn servos(&self) -> [ServoState; 3] {
        self.servos
    }

    pub fn tick(&mut self, buffers: &SampleBuffers) -> TickReport {
        let outcomes = Signal::ALL
            .iter()
            .map(|&signal| (signal, self.actuate(signal, buffers.get(signal))))
            .collect();
        TickReport { outcomes }
    }

    /// Drains the signal's buffer and commits its median. An empty buffer
    /// leaves the servo idle for this tick.
    fn actuate(&mut self, signal: Signal, buffer: &SampleBuffer) -> CommandOutcome {
        let mut samples = buffer.drain();
        let sample_count = samples.len();
        match median(&mut samples) {
            Some(median) => self.commit(signal, median, sample_count),
            None => CommandOutcome::Idle,
        }
    }

    fn commit(&mut self, signal: Signal, median: f64, sample_count: usize) -> CommandOutcome {
        let servo = &mut self.servos[signal.servo() as usize];
        // Deadband is measured against the angle that would be sent.
        let angle = clamp_angle(median);
        let delta = f64::from((i16::from(servo.current_angle) - i16::from(angle)).abs());
        if delta <= self.deadband {
            log::debug!(
                "{}: median {median:.1} of {sample_count} samples within deadband of {}",
                signal.label(),
                servo.current_angle
            );
            return CommandOutcome::Suppressed { median };
        }

        match self.bridge.set_servo_angle(servo.id, angle) {
            Ok(()) => {
                log::info!(
                    "{}: {} -> {angle} (median of {sample_count} samples)",
                    servo.id.label(),
                    servo.current_angle
                );
                servo.current_angle = angle;
                CommandOutcome::Commanded { angle }
            }
            Err(err) => {
                log::warn!("{}: command to {angle} failed: {err}", servo.id.label());
                CommandOutcome::Failed { angle }
            }
        }
    }
}
