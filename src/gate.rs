//! Keypoint availability checks.
//!
//! A region is usable only when every keypoint its measurement reads is
//! strictly above the part confidence threshold. Missing keypoints count as
//! unconfident.

use crate::types::{BodyPart, Pose, Side};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SidePresence {
    pub left: bool,
    pub right: bool,
}

impl SidePresence {
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

pub struct KeypointGate<'a> {
    pose: &'a Pose,
    min_confidence: f64,
}

impl<'a> KeypointGate<'a> {
    pub fn new(pose: &'a Pose, min_confidence: f64) -> Self {
        Self {
            pose,
            min_confidence,
        }
    }

    fn confident(&self, part: BodyPart) -> bool {
        self.pose.part_score(part) > self.min_confidence
    }

    fn all_confident(&self, parts: &[BodyPart]) -> bool {
        parts.iter().all(|&part| self.confident(part))
    }

    /// Upper-arm availability. Both shoulders are always required since the
    /// shoulder line anchors the arm angle.
    pub fn arms(&self) -> SidePresence {
        let side = |side: Side| {
            self.all_confident(&[
                BodyPart::shoulder(side),
                BodyPart::shoulder(side.other()),
                BodyPart::elbow(side),
            ])
        };
        SidePresence {
            left: side(Side::Left),
            right: side(Side::Right),
        }
    }

    pub fn wrists(&self) -> SidePresence {
        SidePresence {
            left: self.confident(BodyPart::wrist(Side::Left)),
            right: self.confident(BodyPart::wrist(Side::Right)),
        }
    }

    /// Gates face yaw.
    pub fn eyes_and_nose(&self) -> bool {
        self.all_confident(&[BodyPart::Nose, BodyPart::LeftEye, BodyPart::RightEye])
    }

    pub fn eyes_and_ears(&self) -> SidePresence {
        if !self.eyes_and_nose() {
            return SidePresence::default();
        }
        SidePresence {
            left: self.confident(BodyPart::ear(Side::Left)),
            right: self.confident(BodyPart::ear(Side::Right)),
        }
    }
}
