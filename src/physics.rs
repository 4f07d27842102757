use serde::Serialize;

use crate::types::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Unit offset of one step in the given direction. None moves nowhere.
pub fn unit(dir: Direction) -> Vec2 {
    match dir {
        Direction::Up => Vec2::new(0.0, -1.0),
        Direction::Down => Vec2::new(0.0, 1.0),
        Direction::Left => Vec2::new(-1.0, 0.0),
        Direction::Right => Vec2::new(1.0, 0.0),
        Direction::None => Vec2::ZERO,
    }
}

/// Axis-aligned extent anchored to an agent's top-left corner. Re-synced to
/// the kinematic position after every movement step.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub top_left: Vec2,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(top_left: Vec2, width: f64, height: f64) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    pub fn set_top_left(&mut self, top_left: Vec2) {
        self.top_left = top_left;
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.top_left.x + self.width / 2.0,
            self.top_left.y + self.height / 2.0,
        )
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.top_left.x < other.top_left.x + other.width
            && other.top_left.x < self.top_left.x + self.width
            && self.top_left.y < other.top_left.y + other.height
            && other.top_left.y < self.top_left.y + self.height
    }

    /// Overlap test with this extent extended one step along the current
    /// facing, so two agents crossing within a tick still register.
    pub fn swept_overlaps(&self, speed: f64, dir: Direction, other: &BoundingBox) -> bool {
        let mut swept = *self;
        match dir {
            Direction::Up => {
                swept.top_left.y -= speed;
                swept.height += speed;
            }
            Direction::Down => {
                swept.height += speed;
            }
            Direction::Left => {
                swept.top_left.x -= speed;
                swept.width += speed;
            }
            Direction::Right => {
                swept.width += speed;
            }
            Direction::None => {}
        }
        swept.overlaps(other)
    }
}

#[derive(Clone, Debug)]
pub struct KinematicState {
    position: Vec2,
    direction: Direction,
    speed: f64,
}

impl KinematicState {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: Direction::None,
            speed: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Position after one step in the given direction at the current speed.
    pub fn potential_position(&self, dir: Direction) -> Vec2 {
        self.position.add(unit(dir).scale(self.speed))
    }
}
