use core::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 2-D vector in world units. Deserializes from either `{"x": .., "y": ..}`
/// or a bare `[x, y]` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec2Repr")]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Vec2Repr {
    Pair([f64; 2]),
    Named { x: f64, y: f64 },
}

impl From<Vec2Repr> for Vec2 {
    fn from(repr: Vec2Repr) -> Self {
        match repr {
            Vec2Repr::Pair([x, y]) => Self { x, y },
            Vec2Repr::Named { x, y } => Self { x, y },
        }
    }
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn from_angle(radians: f64, magnitude: f64) -> Self {
        Self {
            x: radians.cos() * magnitude,
            y: radians.sin() * magnitude,
        }
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Scales the vector down so its length is at most `max`.
    pub fn limit(self, max: f64) -> Self {
        let len_sq = self.length_squared();
        if len_sq <= max * max || len_sq == 0.0 {
            return self;
        }
        self * (max / len_sq.sqrt())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
