use serde::{Deserialize, Serialize};

use crate::geometry::Vector2D;

/// One detected body instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub score: f64,
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn keypoint(&self, part: BodyPart) -> Option<&Keypoint> {
        // Producers emit keypoints in BodyPart order, so try the direct slot first.
        match self.keypoints.get(part as usize) {
            Some(kp) if kp.part == part => Some(kp),
            _ => self.keypoints.iter().find(|kp| kp.part == part),
        }
    }

    pub fn position(&self, part: BodyPart) -> Option<Vector2D> {
        self.keypoint(part).map(|kp| kp.position)
    }

    /// Score of `part`, or 0 when the producer did not report it.
    pub fn part_score(&self, part: BodyPart) -> f64 {
        self.keypoint(part).map(|kp| kp.score).unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: Vector2D,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    pub const ALL: [BodyPart; 17] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftShoulder,
            Side::Right => BodyPart::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftElbow,
            Side::Right => BodyPart::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftWrist,
            Side::Right => BodyPart::RightWrist,
        }
    }

    pub fn ear(side: Side) -> Self {
        match side {
            Side::Left => BodyPart::LeftEar,
            Side::Right => BodyPart::RightEar,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Angle stream buffered between the frame loop and the actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    LeftArm,
    RightArm,
    FaceYaw,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::LeftArm, Signal::RightArm, Signal::FaceYaw];

    pub fn servo(&self) -> ServoId {
        match self {
            Signal::LeftArm => ServoId::Left,
            Signal::RightArm => ServoId::Right,
            Signal::FaceYaw => ServoId::FaceYaw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Signal::LeftArm => "left-arm",
            Signal::RightArm => "right-arm",
            Signal::FaceYaw => "face-yaw",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServoId {
    Left,
    Right,
    FaceYaw,
}

impl ServoId {
    pub const ALL: [ServoId; 3] = [ServoId::Left, ServoId::Right, ServoId::FaceYaw];

    pub fn label(&self) -> &'static str {
        match self {
            ServoId::Left => "left",
            ServoId::Right => "right",
            ServoId::FaceYaw => "face_yaw",
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypoint_lookup_ignores_order() {
        let mut pose = fixtures::standing_pose();
        pose.keypoints.reverse();
        let elbow = pose.keypoint(BodyPart::LeftElbow).expect("elbow present");
        assert_eq!(elbow.position, Vector2D::new(200.0, 200.0));
    }

    #[test]
    fn missing_part_scores_zero() {
        let pose = Pose {
            score: 1.0,
            keypoints: Vec::new(),
        };
        assert_eq!(pose.part_score(BodyPart::Nose), 0.0);
        assert!(pose.position(BodyPart::Nose).is_none());
    }

    #[test]
    fn deserializes_camel_case_parts() {
        let json = r#"{"score":0.8,"keypoints":[{"part":"leftShoulder","position":{"x":1.5,"y":2.0},"score":0.7}]}"#;
        let pose: Pose = serde_json::from_str(json).expect("valid pose json");
        assert_eq!(pose.keypoints[0].part, BodyPart::LeftShoulder);
        assert_eq!(pose.position(BodyPart::LeftShoulder), Some(Vector2D::new(1.5, 2.0)));
    }
}
