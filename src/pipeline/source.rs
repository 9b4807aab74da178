use std::{
    io::BufRead,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;

use crate::types::Pose;

pub const DEFAULT_FPS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("line {line}: malformed pose frame: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses one recorded frame: a JSON array of poses. Blank lines carry no frame.
pub fn parse_frame(line_no: usize, line: &str) -> Result<Option<Vec<Pose>>, SourceError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| SourceError::Parse {
            line: line_no,
            source,
        })
}

pub fn frame_interval(fps: u64) -> Duration {
    Duration::from_millis(1_000 / fps.max(1))
}

/// Replays recorded detections into the frame channel at a fixed rate.
#[derive(Debug)]
pub struct PoseSource {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<usize>>,
}

impl PoseSource {
    /// Blocks until the input is exhausted and returns how many frames were
    /// sent, or `None` if the replay thread panicked.
    pub fn wait(mut self) -> Option<usize> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(sent) => Some(sent),
            Err(_) => {
                log::error!("pose source panicked");
                None
            }
        }
    }
}

impl Drop for PoseSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn start_replay<R>(
    reader: R,
    interval: Duration,
    frame_tx: Sender<Vec<Pose>>,
) -> Result<PoseSource>
where
    R: BufRead + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::Builder::new()
        .name("pose-source".into())
        .spawn(move || replay(reader, interval, &frame_tx, &stop_flag))
        .context("failed to spawn pose source thread")?;

    Ok(PoseSource {
        stop,
        handle: Some(handle),
    })
}

fn replay<R: BufRead>(
    reader: R,
    interval: Duration,
    frame_tx: &Sender<Vec<Pose>>,
    stop_flag: &AtomicBool,
) -> usize {
    let mut sent = 0;
    let mut next_frame = Instant::now();

    for (idx, line) in reader.lines().enumerate() {
        if stop_flag.load(Ordering::Relaxed) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("failed to read pose input: {err}");
                break;
            }
        };

        let poses = match parse_frame(idx + 1, &line) {
            Ok(Some(poses)) => poses,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("skipping {err}");
                continue;
            }
        };

        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        }
        next_frame += interval;

        if frame_tx.send(poses).is_err() {
            log::debug!("frame consumer gone, stopping replay");
            break;
        }
        sent += 1;
    }

    sent
}
