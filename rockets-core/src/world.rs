use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_START_X, DEFAULT_START_Y, DEFAULT_TARGET_RADIUS, DEFAULT_TARGET_X, DEFAULT_TARGET_Y,
    DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};
use crate::error::ConfigError;
use crate::vec2::Vec2;

/// Capture zone the rockets are steering toward.
///
/// Accepts a full `{"point": .., "radius": ..}` object or, for older config
/// files, a bare point (`"goal": [300, 100]`) that takes the default radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TargetRepr")]
pub struct Target {
    pub point: Vec2,
    pub radius: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Full {
        point: Vec2,
        #[serde(default = "default_target_radius")]
        radius: f64,
    },
    Point(Vec2),
}

fn default_target_radius() -> f64 {
    DEFAULT_TARGET_RADIUS
}

impl From<TargetRepr> for Target {
    fn from(repr: TargetRepr) -> Self {
        match repr {
            TargetRepr::Full { point, radius } => Self { point, radius },
            TargetRepr::Point(point) => Self {
                point,
                radius: DEFAULT_TARGET_RADIUS,
            },
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self {
            point: Vec2::new(DEFAULT_TARGET_X, DEFAULT_TARGET_Y),
            radius: DEFAULT_TARGET_RADIUS,
        }
    }
}

impl Target {
    #[inline]
    pub fn contains(&self, position: Vec2) -> bool {
        position.distance(self.point) <= self.radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.point.is_finite() {
            return Err(ConfigError::NonFinitePoint {
                field: "target.point",
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidTargetRadius(self.radius));
        }
        Ok(())
    }
}

/// Static collision shape.
///
/// Rectangles use half-open containment on their far edges, so two
/// rectangles sharing an edge never both claim a point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case", from = "ObstacleRepr")]
pub enum Obstacle {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        center: Vec2,
        radius: f64,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObstacleRepr {
    Legacy([f64; 4]),
    Tagged(TaggedObstacle),
}

#[derive(Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
enum TaggedObstacle {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        center: Vec2,
        radius: f64,
    },
}

impl From<ObstacleRepr> for Obstacle {
    fn from(repr: ObstacleRepr) -> Self {
        match repr {
            ObstacleRepr::Legacy([x, y, width, height]) => Self::Rect {
                x,
                y,
                width,
                height,
            },
            ObstacleRepr::Tagged(TaggedObstacle::Rect {
                x,
                y,
                width,
                height,
            }) => Self::Rect {
                x,
                y,
                width,
                height,
            },
            ObstacleRepr::Tagged(TaggedObstacle::Circle { center, radius }) => {
                Self::Circle { center, radius }
            }
        }
    }
}

impl Obstacle {
    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => p.x >= x && p.x < x + width && p.y >= y && p.y < y + height,
            Self::Circle { center, radius } => p.distance(center) <= radius,
        }
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        match *self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => {
                if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
                    return Err(ConfigError::InvalidObstacle {
                        index,
                        reason: "non-finite rectangle",
                    });
                }
                if width <= 0.0 || height <= 0.0 {
                    return Err(ConfigError::InvalidObstacle {
                        index,
                        reason: "rectangle needs positive width and height",
                    });
                }
            }
            Self::Circle { center, radius } => {
                if !(center.is_finite() && radius.is_finite()) {
                    return Err(ConfigError::InvalidObstacle {
                        index,
                        reason: "non-finite circle",
                    });
                }
                if radius <= 0.0 {
                    return Err(ConfigError::InvalidObstacle {
                        index,
                        reason: "circle needs a positive radius",
                    });
                }
            }
        }
        Ok(())
    }
}

/// Playfield extent, anchored at the origin. Accepts `[width, height]`
/// (the old `win_size` form) or `{"width": .., "height": ..}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoundsRepr")]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundsRepr {
    Pair([f64; 2]),
    Named { width: f64, height: f64 },
}

impl From<BoundsRepr> for Bounds {
    fn from(repr: BoundsRepr) -> Self {
        match repr {
            BoundsRepr::Pair([width, height]) => Self { width, height },
            BoundsRepr::Named { width, height } => Self { width, height },
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

impl Bounds {
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if !ok {
            return Err(ConfigError::InvalidBounds {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Everything an agent is tested against on each step. Owned by the
/// simulation; agents only ever borrow it.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub target: Target,
    pub obstacles: Vec<Obstacle>,
    pub bounds: Bounds,
    pub start: Vec2,
}

impl Default for World {
    fn default() -> Self {
        Self {
            target: Target::default(),
            obstacles: Vec::new(),
            bounds: Bounds::default(),
            start: Vec2::new(DEFAULT_START_X, DEFAULT_START_Y),
        }
    }
}

impl World {
    /// True when `p` hits an obstacle or has left the playfield.
    pub fn collides(&self, p: Vec2) -> bool {
        !self.bounds.contains(p) || self.obstacles.iter().any(|o| o.contains(p))
    }

    /// Distance from the launch pad to the target, never below 1 so it can
    /// be used as a normaliser.
    pub fn reference_distance(&self) -> f64 {
        self.start.distance(self.target.point).max(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.bounds.validate()?;
        if !self.start.is_finite() {
            return Err(ConfigError::NonFinitePoint {
                field: "start_position",
            });
        }
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            obstacle.validate(index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_containment_is_half_open() {
        let rect = Obstacle::Rect {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 5.0,
        };
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(29.9, 14.9)));
        assert!(!rect.contains(Vec2::new(30.0, 12.0)));
        assert!(!rect.contains(Vec2::new(15.0, 15.0)));
    }

    #[test]
    fn leaving_bounds_counts_as_collision() {
        let world = World::default();
        assert!(!world.collides(Vec2::new(0.0, 0.0)));
        assert!(!world.collides(Vec2::new(600.0, 800.0)));
        assert!(world.collides(Vec2::new(-0.1, 400.0)));
        assert!(world.collides(Vec2::new(300.0, 800.5)));
    }

    #[test]
    fn legacy_obstacle_arrays_become_rects() {
        let parsed: Vec<Obstacle> = serde_json::from_str(
            r#"[[100, 300, 400, 20], {"shape": "circle", "center": [50, 50], "radius": 8}]"#,
        )
        .expect("obstacles should parse");
        assert_eq!(
            parsed[0],
            Obstacle::Rect {
                x: 100.0,
                y: 300.0,
                width: 400.0,
                height: 20.0
            }
        );
        assert_eq!(
            parsed[1],
            Obstacle::Circle {
                center: Vec2::new(50.0, 50.0),
                radius: 8.0
            }
        );
    }

    #[test]
    fn bare_goal_point_takes_default_radius() {
        let target: Target = serde_json::from_str("[300, 100]").expect("goal should parse");
        assert_eq!(target.point, Vec2::new(300.0, 100.0));
        assert_eq!(target.radius, DEFAULT_TARGET_RADIUS);

        let full: Target =
            serde_json::from_str(r#"{"point": {"x": 1, "y": 2}, "radius": 4}"#).expect("full");
        assert_eq!(full.radius, 4.0);
    }

    #[test]
    fn degenerate_obstacles_are_rejected() {
        let world = World {
            obstacles: vec![Obstacle::Circle {
                center: Vec2::new(1.0, 1.0),
                radius: 0.0,
            }],
            ..World::default()
        };
        assert!(matches!(
            world.validate(),
            Err(ConfigError::InvalidObstacle { index: 0, .. })
        ));
    }
}
