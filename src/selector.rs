use crate::types::Pose;

/// Axis-aligned bounding-box area over all keypoints, regardless of score.
pub fn bounding_box_area(pose: &Pose) -> f64 {
    if pose.keypoints.is_empty() {
        return 0.0;
    }

    let (min_x, max_x, min_y, max_y) = pose.keypoints.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |acc, kp| {
            (
                acc.0.min(kp.position.x),
                acc.1.max(kp.position.x),
                acc.2.min(kp.position.y),
                acc.3.max(kp.position.y),
            )
        },
    );

    (max_x - min_x) * (max_y - min_y)
}

/// Picks the confident pose covering the largest area, which is usually the
/// person closest to the camera. Ties keep the earlier pose.
pub fn select_pose(poses: &[Pose], min_pose_confidence: f64) -> Option<&Pose> {
    let mut best: Option<(&Pose, f64)> = None;

    for pose in poses.iter().filter(|p| p.score >= min_pose_confidence) {
        let area = bounding_box_area(pose);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            Some(_) if area.is_nan() => {}
            _ => best = Some((pose, area)),
        }
    }

    best.map(|(pose, _)| pose)
}
