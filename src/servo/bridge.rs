use std::io::{self, Write};

use crate::types::ServoId;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("servo bridge unavailable")]
    Unavailable,
    #[error("angle {angle} out of range for servo {servo:?}")]
    OutOfRange { servo: ServoId, angle: u8 },
    #[error("failed to write servo command: {0}")]
    Io(#[from] io::Error),
}

/// Hardware side of the actuator. Commands are fire-and-forget: an `Ok`
/// means the command was handed off, not that the servo reached it. Retry
/// policy, if any, lives in the implementation.
pub trait ServoBridge: Send + 'static {
    fn set_servo_angle(&mut self, servo: ServoId, angle: u8) -> Result<(), BridgeError>;
}

impl<B: ServoBridge + ?Sized> ServoBridge for Box<B> {
    fn set_servo_angle(&mut self, servo: ServoId, angle: u8) -> Result<(), BridgeError> {
        (**self).set_servo_angle(servo, angle)
    }
}

/// Writes one `<servo> <angle>` line per command, the format the serial
/// firmware reads. Works with a tty device file or stdout.
pub struct LineBridge<W: Write> {
    writer: W,
}

impl<W: Write> LineBridge<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> ServoBridge for LineBridge<W> {
    fn set_servo_angle(&mut self, servo: ServoId, angle: u8) -> Result<(), BridgeError> {
        if angle > super::MAX_ANGLE {
            return Err(BridgeError::OutOfRange { servo, angle });
        }
        writeln!(self.writer, "{} {}", servo.label(), angle)?;
        self.writer.flush()?;
        Ok(())
    }
}
