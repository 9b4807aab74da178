use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::bounded;

use pose_servo::{
    buffer::SampleBuffers,
    config::Config,
    pipeline::{Session, frame_interval, source::DEFAULT_FPS, start_replay},
    servo::{LineBridge, ServoBridge},
};

// Enough slack to absorb a slow tick without stalling the replay.
const FRAME_QUEUE_DEPTH: usize = 8;

const USAGE: &str = "usage: pose-servo <frames.jsonl> [--config cfg.json] [--output device] [--fps N]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    frames_path: PathBuf,
    config_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    fps: Option<u64>,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut frames_path = None;
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"))
            };
            match arg.as_str() {
                "--config" => parsed.config_path = Some(PathBuf::from(value("--config")?)),
                "--output" => parsed.output_path = Some(PathBuf::from(value("--output")?)),
                "--fps" => {
                    let fps = value("--fps")?;
                    let fps = fps
                        .parse::<u64>()
                        .with_context(|| format!("invalid --fps value {fps:?}"))?;
                    if fps == 0 {
                        bail!("--fps must be greater than zero");
                    }
                    parsed.fps = Some(fps);
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path if frames_path.is_none() => frames_path = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {extra:?}\n{USAGE}"),
            }
        }

        parsed.frames_path = frames_path.ok_or_else(|| anyhow!(USAGE))?;
        Ok(parsed)
    }
}

fn open_bridge(output: Option<&PathBuf>) -> Result<Box<dyn ServoBridge>> {
    Ok(match output {
        Some(path) => {
            let device = OpenOptions::new()
                .write(true)
                .open(path)
                .with_context(|| format!("failed to open servo output {}", path.display()))?;
            log::info!("sending servo commands to {}", path.display());
            Box::new(LineBridge::new(device))
        }
        None => Box::new(LineBridge::new(io::stdout())),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    let config = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let frames = File::open(&args.frames_path)
        .with_context(|| format!("failed to open {}", args.frames_path.display()))?;
    let bridge = open_bridge(args.output_path.as_ref())?;

    let (frame_tx, frame_rx) = bounded(FRAME_QUEUE_DEPTH);
    let buffers = Arc::new(SampleBuffers::new());
    let session = Session::start(config.clone(), buffers, bridge, frame_rx)?;

    let interval = frame_interval(args.fps.unwrap_or(DEFAULT_FPS));
    let source = start_replay(BufReader::new(frames), interval, frame_tx)?;
    let sent = source
        .wait()
        .ok_or_else(|| anyhow!("pose source thread panicked"))?;
    log::info!("replayed {sent} frames from {}", args.frames_path.display());

    // Let the actuator consume what the last frames buffered.
    thread::sleep(config.actuation_period() * 2);

    match session.stop() {
        Some(servos) => {
            for servo in servos {
                log::info!("{} servo at {}", servo.id.label(), servo.current_angle);
            }
            Ok(())
        }
        None => Err(anyhow!("actuator thread panicked")),
    }
}
