use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError, select, tick};

use crate::{
    buffer::SampleBuffers,
    servo::{ServoActuator, ServoBridge},
};

/// Ticks the actuator on a fixed period until the stop channel closes, then
/// hands it back so the caller can read the final servo positions.
pub(crate) fn run_actuator_loop<B: ServoBridge>(
    mut actuator: ServoActuator<B>,
    buffers: &SampleBuffers,
    period: Duration,
    stop_rx: Receiver<()>,
) -> ServoActuator<B> {
    let ticker = tick(period);
    let mut ticks = 0u64;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                // Both may be ready at once; never command after a stop request.
                if stopped(&stop_rx) {
                    break;
                }
                let report = actuator.tick(buffers);
                ticks += 1;
                if report.commands_issued() > 0 {
                    log::debug!("tick {ticks}: {} command(s)", report.commands_issued());
                }
            },
        }
    }

    log::debug!("actuator loop exiting after {ticks} ticks");
    actuator
}

fn stopped(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}
