use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    servo::{AngleMapping, MAX_ANGLE},
    types::{ServoId, Signal},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session configuration. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Poses scoring below this are ignored by the selector (inclusive).
    pub min_pose_confidence: f64,
    /// Keypoints must score strictly above this to be used.
    pub min_part_confidence: f64,
    /// Minimum move, in degrees, before a servo is commanded again.
    pub deadband_degrees: f64,
    pub actuation_period_ms: u64,
    pub left_arm_mapping: AngleMapping,
    pub right_arm_mapping: AngleMapping,
    pub face_yaw_mapping: AngleMapping,
    pub initial_left_angle: u8,
    pub initial_right_angle: u8,
    pub initial_face_yaw_angle: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_pose_confidence: 0.15,
            min_part_confidence: 0.5,
            deadband_degrees: 5.0,
            actuation_period_ms: 200,
            // Left horn sits 30 degrees past the geometric zero; the right
            // servo is mounted mirrored.
            left_arm_mapping: AngleMapping::new(1.0, 30.0),
            right_arm_mapping: AngleMapping::new(-1.0, 150.0),
            face_yaw_mapping: AngleMapping::IDENTITY,
            initial_left_angle: 30,
            initial_right_angle: 150,
            initial_face_yaw_angle: 90,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_pose_confidence", self.min_pose_confidence),
            ("min_part_confidence", self.min_part_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 0.0-1.0, got {value}"
                )));
            }
        }

        if !self.deadband_degrees.is_finite() || self.deadband_degrees < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "deadband_degrees must be a non-negative number, got {}",
                self.deadband_degrees
            )));
        }

        if self.actuation_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "actuation_period_ms must be greater than zero".to_string(),
            ));
        }

        for signal in Signal::ALL {
            let mapping = self.mapping(signal);
            if !mapping.scale.is_finite() || !mapping.offset.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{} mapping must be finite",
                    signal.label()
                )));
            }
        }

        for id in ServoId::ALL {
            let angle = self.initial_angle(id);
            if angle > MAX_ANGLE {
                return Err(ConfigError::Invalid(format!(
                    "initial angle for {} servo must be at most {MAX_ANGLE}, got {angle}",
                    id.label()
                )));
            }
        }

        Ok(())
    }

    pub fn actuation_period(&self) -> Duration {
        Duration::from_millis(self.actuation_period_ms)
    }

    pub fn mapping(&self, signal: Signal) -> AngleMapping {
        match signal {
            Signal::LeftArm => self.left_arm_mapping,
            Signal::RightArm => self.right_arm_mapping,
            Signal::FaceYaw => self.face_yaw_mapping,
        }
    }

    pub fn initial_angle(&self, id: ServoId) -> u8 {
        match id {
            ServoId::Left => self.initial_left_angle,
            ServoId::Right => self.initial_right_angle,
            ServoId::FaceYaw => self.initial_face_yaw_angle,
        }
    }
}
