use std::ops::{Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length; 0 for the zero vector.
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Counter-clockwise rotation in a y-up frame (clockwise on screen, where y grows down).
    pub fn rotate(self, degrees: f64) -> Vector2D {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector2D {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }
}

/// Unsigned angle between `a` and `b` in degrees, within [0, 180].
///
/// Returns `None` when either vector has zero length or the inputs are not
/// finite, so callers never see NaN.
pub fn angle_between(a: Vector2D, b: Vector2D) -> Option<f64> {
    let denom = a.norm() * b.norm();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    let degrees = cos.acos().to_degrees();
    degrees.is_finite().then_some(degrees)
}
