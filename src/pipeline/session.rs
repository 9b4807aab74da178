use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};

use super::{actuator::run_actuator_loop, frame_loop::run_frame_loop};
use crate::{
    buffer::SampleBuffers,
    config::Config,
    servo::{ServoActuator, ServoBridge, ServoState},
    types::Pose,
};

/// A running control session: the frame loop filling the sample buffers and
/// the actuator draining them. The buffers live as long as the session.
pub struct Session<B: ServoBridge> {
    stop_tx: Option<Sender<()>>,
    frame_handle: Option<JoinHandle<()>>,
    actuator_handle: Option<JoinHandle<ServoActuator<B>>>,
    buffers: Arc<SampleBuffers>,
}

impl<B: ServoBridge> Session<B> {
    pub fn start(
        config: Config,
        buffers: Arc<SampleBuffers>,
        bridge: B,
        frame_rx: Receiver<Vec<Pose>>,
    ) -> Result<Self> {
        config.validate().context("refusing to start session")?;

        // Nothing is ever sent; dropping the sender wakes both loops.
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let actuator = ServoActuator::new(bridge, &config);
        let period = config.actuation_period();
        let deadband = config.deadband_degrees;

        let actuator_handle = {
            let buffers = Arc::clone(&buffers);
            let stop_rx = stop_rx.clone();
            thread::Builder::new()
                .name("servo-actuator".into())
                .spawn(move || run_actuator_loop(actuator, &buffers, period, stop_rx))
                .context("failed to spawn actuator thread")?
        };

        let frame_handle = {
            let buffers = Arc::clone(&buffers);
            thread::Builder::new()
                .name("frame-loop".into())
                .spawn(move || run_frame_loop(frame_rx, stop_rx, &config, &buffers))
        };
        let frame_handle = match frame_handle {
            Ok(handle) => handle,
            Err(err) => {
                drop(stop_tx);
                let _ = actuator_handle.join();
                return Err(err).context("failed to spawn frame loop thread");
            }
        };

        log::info!("session started (period {period:?}, deadband {deadband} deg)");

        Ok(Self {
            stop_tx: Some(stop_tx),
            frame_handle: Some(frame_handle),
            actuator_handle: Some(actuator_handle),
            buffers,
        })
    }

    /// Stops both loops and waits for them. No command is issued once this
    /// returns; servos stay where they were last commanded. Returns those
    /// positions, or `None` if the actuator thread panicked.
    pub fn stop(mut self) -> Option<[ServoState; 3]> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<[ServoState; 3]> {
        self.stop_tx.take();

        if let Some(handle) = self.frame_handle.take() {
            if handle.join().is_err() {
                log::error!("frame loop panicked");
            }
        }

        let servos = self
            .actuator_handle
            .take()
            .and_then(|handle| match handle.join() {
                Ok(actuator) => Some(actuator.servos()),
                Err(_) => {
                    log::error!("actuator loop panicked");
                    None
                }
            });

        if servos.is_some() {
            log::info!("session stopped");
        }
        servos
    }
}

impl<B: ServoBridge> Drop for Session<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossbeam_channel::unbounded;

    use super::*;
    use crate::{
        servo::bridge::testing::RecordingBridge,
        types::{
            BodyPart, ServoId, Signal,
            fixtures::{set, standing_pose},
        },
    };

    fn fast_config() -> Config {
        Config {
            actuation_period_ms: 20,
            ..Config::default()
        }
    }

    fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn frames_become_servo_commands() {
        let bridge = RecordingBridge::default();
        let buffers = Arc::new(SampleBuffers::new());
        let (frame_tx, frame_rx) = unbounded();
        let session =
            Session::start(fast_config(), Arc::clone(&buffers), bridge.clone(), frame_rx).unwrap();

        // Left arm held straight out: raw 90, mapped to 120.
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::LeftElbow, 300.0, 100.0, 0.9);
        for _ in 0..5 {
            frame_tx.send(vec![pose.clone()]).unwrap();
        }

        assert!(wait_for(|| !bridge.commands().is_empty()));
        assert!(wait_for(|| Signal::ALL
            .iter()
            .all(|&s| buffers.get(s).is_empty())));

        let servos = session.stop().expect("actuator joined");
        assert_eq!(servos[ServoId::Left as usize].current_angle, 120);
        assert_eq!(servos[ServoId::Right as usize].current_angle, 150);
        assert_eq!(servos[ServoId::FaceYaw as usize].current_angle, 90);
        // Right arm and face stayed inside the deadband.
        assert_eq!(bridge.commands(), vec![(ServoId::Left, 120)]);
    }

    #[test]
    fn nothing_is_commanded_after_stop() {
        let bridge = RecordingBridge::default();
        let buffers = Arc::new(SampleBuffers::new());
        let (_frame_tx, frame_rx) = unbounded();
        let session =
            Session::start(fast_config(), Arc::clone(&buffers), bridge.clone(), frame_rx).unwrap();

        let servos = session.stop().expect("actuator joined");
        buffers.get(Signal::FaceYaw).push(170.0);
        thread::sleep(Duration::from_millis(60));

        assert!(bridge.commands().is_empty());
        assert_eq!(servos[ServoId::FaceYaw as usize].current_angle, 90);
        assert_eq!(buffers.get(Signal::FaceYaw).len(), 1);
    }

    #[test]
    fn stop_does_not_wait_for_next_tick() {
        let config = Config {
            actuation_period_ms: 60_000,
            ..Config::default()
        };
        let (_frame_tx, frame_rx) = unbounded();
        let session = Session::start(
            config,
            Arc::new(SampleBuffers::new()),
            RecordingBridge::default(),
            frame_rx,
        )
        .unwrap();

        let started = Instant::now();
        assert!(session.stop().is_some());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn closed_source_leaves_actuator_running() {
        let bridge = RecordingBridge::default();
        let buffers = Arc::new(SampleBuffers::new());
        let (frame_tx, frame_rx) = unbounded::<Vec<Pose>>();
        let session =
            Session::start(fast_config(), Arc::clone(&buffers), bridge.clone(), frame_rx).unwrap();
        drop(frame_tx);

        buffers.get(Signal::FaceYaw).push(140.0);
        assert!(wait_for(|| bridge.commands() == vec![(ServoId::FaceYaw, 140)]));
        drop(session);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = Config {
            actuation_period_ms: 0,
            ..Config::default()
        };
        let (_frame_tx, frame_rx) = unbounded();
        let result = Session::start(
            config,
            Arc::new(SampleBuffers::new()),
            RecordingBridge::default(),
            frame_rx,
        );
        assert!(result.is_err());
    }
}
