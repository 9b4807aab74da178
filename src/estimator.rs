use crate::{
    gate::{KeypointGate, SidePresence},
    geometry::{Vector2D, angle_between},
    types::{BodyPart, Pose, Side},
};

/// Raw geometric angles in degrees. `None` means the region was gated out or
/// its geometry was degenerate this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointAngles {
    pub left_arm: Option<f64>,
    pub right_arm: Option<f64>,
    pub left_wrist: Option<f64>,
    pub right_wrist: Option<f64>,
    pub face_yaw: Option<f64>,
}

impl JointAngles {
    pub fn arm(&self, side: Side) -> Option<f64> {
        match side {
            Side::Left => self.left_arm,
            Side::Right => self.right_arm,
        }
    }
}

pub fn estimate(pose: &Pose, min_part_confidence: f64) -> JointAngles {
    let gate = KeypointGate::new(pose, min_part_confidence);
    let arms = gate.arms();
    let wrists = gate.wrists();

    // Wrists are gated without shoulders, but the angle still needs the shoulder line.
    let shoulder_normal = shoulder_normal(pose);
    let limb = |presence: SidePresence, side: Side, end: BodyPart| {
        if !presence.get(side) {
            return None;
        }
        let normal = shoulder_normal?;
        let shoulder = pose.position(BodyPart::shoulder(side))?;
        let end = pose.position(end)?;
        angle_between(normal, end - shoulder)
    };

    JointAngles {
        left_arm: limb(arms, Side::Left, BodyPart::elbow(Side::Left)),
        right_arm: limb(arms, Side::Right, BodyPart::elbow(Side::Right)),
        left_wrist: limb(wrists, Side::Left, BodyPart::wrist(Side::Left)),
        right_wrist: limb(wrists, Side::Right, BodyPart::wrist(Side::Right)),
        face_yaw: if gate.eyes_and_nose() {
            face_yaw_of(pose)
        } else {
            None
        },
    }
}

/// Shoulder line turned a quarter turn, i.e. pointing along the torso.
fn shoulder_normal(pose: &Pose) -> Option<Vector2D> {
    let left = pose.position(BodyPart::LeftShoulder)?;
    let right = pose.position(BodyPart::RightShoulder)?;
    Some((left - right).rotate(90.0))
}

fn face_yaw_of(pose: &Pose) -> Option<f64> {
    face_yaw(
        pose.position(BodyPart::Nose)?,
        pose.position(BodyPart::LeftEye)?,
        pose.position(BodyPart::RightEye)?,
    )
}

/// 90 when the nose sits midway between the eyes.
///
/// Only the horizontal nose offset from the left eye is compared against the
/// full eye distance, so turning toward the right eye can push the result
/// below 0. The actuator clamps it.
pub fn face_yaw(nose: Vector2D, left_eye: Vector2D, right_eye: Vector2D) -> Option<f64> {
    let eye_span = (right_eye - left_eye).norm();
    if eye_span == 0.0 {
        return None;
    }

    let ratio = (nose.x - left_eye.x).abs() / eye_span;
    let yaw = 180.0 - ratio * 180.0;
    yaw.is_finite().then_some(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{set, standing_pose};

    const EPS: f64 = 1e-6;

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < EPS)
    }

    #[test]
    fn hanging_arms_read_zero() {
        let angles = estimate(&standing_pose(), 0.5);
        assert!(approx(angles.left_arm, 0.0), "{angles:?}");
        assert!(approx(angles.right_arm, 0.0), "{angles:?}");
        assert!(approx(angles.left_wrist, 0.0), "{angles:?}");
        assert!(approx(angles.right_wrist, 0.0), "{angles:?}");
    }

    #[test]
    fn arms_out_and_up() {
        let mut pose = standing_pose();
        // Left arm straight out to the side, right arm raised overhead.
        set(&mut pose, BodyPart::LeftElbow, 300.0, 100.0, 0.9);
        set(&mut pose, BodyPart::RightElbow, 100.0, 0.0, 0.9);

        let angles = estimate(&pose, 0.5);
        assert!(approx(angles.arm(Side::Left), 90.0), "{angles:?}");
        assert!(approx(angles.arm(Side::Right), 180.0), "{angles:?}");
    }

    #[test]
    fn weak_elbow_withholds_only_that_arm() {
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::RightElbow, 100.0, 200.0, 0.1);

        let angles = estimate(&pose, 0.5);
        assert!(angles.left_arm.is_some());
        assert!(angles.right_arm.is_none());
    }

    #[test]
    fn wrist_angle_ignores_shoulder_confidence() {
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::LeftShoulder, 200.0, 100.0, 0.0);

        let angles = estimate(&pose, 0.5);
        assert!(angles.left_arm.is_none());
        assert!(angles.right_arm.is_none());
        // Positions are still reported, so the wrist angle survives the weak score.
        assert!(angles.left_wrist.is_some());
    }

    #[test]
    fn coincident_shoulders_produce_nothing() {
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::LeftShoulder, 150.0, 100.0, 0.9);
        set(&mut pose, BodyPart::RightShoulder, 150.0, 100.0, 0.9);

        let angles = estimate(&pose, 0.5);
        assert!(angles.left_arm.is_none());
        assert!(angles.right_arm.is_none());
        assert!(angles.left_wrist.is_none());
    }

    #[test]
    fn elbow_on_shoulder_produces_nothing() {
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::LeftElbow, 200.0, 100.0, 0.9);

        let angles = estimate(&pose, 0.5);
        assert!(angles.left_arm.is_none());
        assert!(angles.right_arm.is_some());
    }

    #[test]
    fn centred_nose_is_ninety_yaw() {
        let angles = estimate(&standing_pose(), 0.5);
        assert!(approx(angles.face_yaw, 90.0), "{angles:?}");
    }

    #[test]
    fn yaw_uses_horizontal_offset_from_left_eye() {
        let left_eye = Vector2D::new(160.0, 50.0);
        let right_eye = Vector2D::new(140.0, 50.0);

        assert!(approx(face_yaw(Vector2D::new(160.0, 70.0), left_eye, right_eye), 180.0));
        assert!(approx(face_yaw(Vector2D::new(155.0, 70.0), left_eye, right_eye), 135.0));
        // Past the right eye the ratio exceeds one and the yaw goes negative.
        assert!(approx(face_yaw(Vector2D::new(130.0, 70.0), left_eye, right_eye), -90.0));
        // Offsets either side of the left eye read the same.
        assert_eq!(
            face_yaw(Vector2D::new(165.0, 70.0), left_eye, right_eye),
            face_yaw(Vector2D::new(155.0, 70.0), left_eye, right_eye)
        );
    }

    #[test]
    fn overlapping_eyes_have_no_yaw() {
        let eye = Vector2D::new(150.0, 50.0);
        assert!(face_yaw(Vector2D::new(150.0, 60.0), eye, eye).is_none());
    }

    #[test]
    fn weak_nose_withholds_yaw() {
        let mut pose = standing_pose();
        set(&mut pose, BodyPart::Nose, 150.0, 60.0, 0.2);
        assert!(estimate(&pose, 0.5).face_yaw.is_none());
    }
}
