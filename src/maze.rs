use crate::constants::{ALIGN_TOLERANCE, TILE_SIZE};
use crate::error::ConfigError;
use crate::physics::Vec2;
use crate::types::{Archetype, Direction};

/// Static tile occupancy for one arena, addressed by integer tile
/// coordinates. Anything outside the map counts as wall.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    walls: Vec<bool>,
}

impl Grid {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_wall(&self, tile_x: i32, tile_y: i32) -> bool {
        if tile_x < 0 || tile_y < 0 || tile_x >= self.width || tile_y >= self.height {
            return true;
        }
        self.walls[(tile_y * self.width + tile_x) as usize]
    }

    pub fn tile_of(point: Vec2) -> (i32, i32) {
        (
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }

    fn tile_center(index: i32) -> f64 {
        index as f64 * TILE_SIZE + TILE_SIZE / 2.0
    }

    /// True when the center sits within the alignment tolerance of its tile's
    /// center on both axes.
    pub fn is_tile_aligned(center: Vec2) -> bool {
        let (tile_x, tile_y) = Self::tile_of(center);
        (Self::tile_center(tile_x) - center.x).abs() < ALIGN_TOLERANCE
            && (Self::tile_center(tile_y) - center.y).abs() < ALIGN_TOLERANCE
    }

    /// Directions an agent with the given center and facing may move in this
    /// tick. Tile-aligned agents may take any open neighbour; mid-transit
    /// agents may only continue or reverse, which rules out corner-cutting.
    /// The result follows `Direction::PRIORITY` order for aligned agents.
    pub fn possible_directions(&self, center: Vec2, facing: Direction) -> Vec<Direction> {
        if Self::is_tile_aligned(center) {
            let (tile_x, tile_y) = Self::tile_of(center);
            let mut out = Vec::with_capacity(4);
            for dir in Direction::PRIORITY {
                let (nx, ny) = match dir {
                    Direction::Up => (tile_x, tile_y - 1),
                    Direction::Down => (tile_x, tile_y + 1),
                    Direction::Left => (tile_x - 1, tile_y),
                    Direction::Right => (tile_x + 1, tile_y),
                    Direction::None => continue,
                };
                if !self.is_wall(nx, ny) {
                    out.push(dir);
                }
            }
            out
        } else if facing == Direction::None {
            Vec::new()
        } else {
            vec![facing, facing.opposite()]
        }
    }

    /// An agent is at an intersection when it has a horizontal and a vertical
    /// option at the same time.
    pub fn is_at_intersection(possible: &[Direction]) -> bool {
        let horizontal = possible.contains(&Direction::Left) || possible.contains(&Direction::Right);
        let vertical = possible.contains(&Direction::Up) || possible.contains(&Direction::Down);
        horizontal && vertical
    }

    /// True when a box of the given size placed at `top_left` touches no wall
    /// tile.
    pub fn box_clear(&self, top_left: Vec2, width: f64, height: f64) -> bool {
        let x0 = (top_left.x / TILE_SIZE).floor() as i32;
        let y0 = (top_left.y / TILE_SIZE).floor() as i32;
        let x1 = ((top_left.x + width - 1e-9) / TILE_SIZE).floor() as i32;
        let y1 = ((top_left.y + height - 1e-9) / TILE_SIZE).floor() as i32;
        for tile_y in y0..=y1 {
            for tile_x in x0..=x1 {
                if self.is_wall(tile_x, tile_y) {
                    return false;
                }
            }
        }
        true
    }

    /// Snaps a top-left position to the nearest tile origin. Used to resolve
    /// a blocked movement step.
    pub fn align_to_tile(position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x / TILE_SIZE).round() * TILE_SIZE,
            (position.y / TILE_SIZE).round() * TILE_SIZE,
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PursuerSpawn {
    pub archetype: Archetype,
    pub position: Vec2,
}

#[derive(Clone, Copy, Debug)]
pub struct ItemSpawn {
    pub position: Vec2,
    pub power: bool,
}

/// Fully parsed arena layout: wall occupancy plus the spawn records the level
/// is built from. Built once and reused across level loads.
#[derive(Clone, Debug)]
pub struct ArenaMap {
    pub grid: Grid,
    pub player_spawn: Vec2,
    pub pursuer_spawns: Vec<PursuerSpawn>,
    pub item_spawns: Vec<ItemSpawn>,
}

impl ArenaMap {
    /// Parses the one-character-per-tile layout text. Codes: '1'..'6' wall
    /// sub-shapes (all opaque here), '0' or ' ' open floor, '7' item,
    /// 'z' power item, 'p' player spawn, and one code per pursuer archetype:
    /// 'b' Direct, 's' Ambush, 'i' Flank, 'c' Threshold.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let rows: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if rows.is_empty() {
            return Err(ConfigError::EmptyMap);
        }
        let width = rows[0].chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyMap);
        }

        let mut walls = vec![false; width * rows.len()];
        let mut player_spawns = Vec::new();
        let mut pursuer_spawns = Vec::new();
        let mut item_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let codes: Vec<char> = row.chars().collect();
            if codes.len() != width {
                return Err(ConfigError::RaggedRow {
                    row: y,
                    found: codes.len(),
                    expected: width,
                });
            }
            for (x, code) in codes.into_iter().enumerate() {
                let position = Vec2::new(x as f64 * TILE_SIZE, y as f64 * TILE_SIZE);
                match code {
                    '1'..='6' => walls[y * width + x] = true,
                    '0' | ' ' => {}
                    '7' => item_spawns.push(ItemSpawn {
                        position,
                        power: false,
                    }),
                    'z' => item_spawns.push(ItemSpawn {
                        position,
                        power: true,
                    }),
                    'p' => player_spawns.push(position),
                    'b' => pursuer_spawns.push(PursuerSpawn {
                        archetype: Archetype::Direct,
                        position,
                    }),
                    's' => pursuer_spawns.push(PursuerSpawn {
                        archetype: Archetype::Ambush,
                        position,
                    }),
                    'i' => pursuer_spawns.push(PursuerSpawn {
                        archetype: Archetype::Flank,
                        position,
                    }),
                    'c' => pursuer_spawns.push(PursuerSpawn {
                        archetype: Archetype::Threshold,
                        position,
                    }),
                    other => {
                        return Err(ConfigError::UnknownTile {
                            code: other,
                            x,
                            y,
                        })
                    }
                }
            }
        }

        if player_spawns.is_empty() {
            return Err(ConfigError::MissingPlayer);
        }
        if player_spawns.len() > 1 {
            return Err(ConfigError::DuplicatePlayer {
                found: player_spawns.len(),
            });
        }

        Ok(Self {
            grid: Grid {
                width: width as i32,
                height: rows.len() as i32,
                walls,
            },
            player_spawn: player_spawns[0],
            pursuer_spawns,
            item_spawns,
        })
    }

    /// Fixed home corner targeted in Patrol mode, one per archetype.
    pub fn home_corner(&self, archetype: Archetype) -> Vec2 {
        let right = (self.grid.width - 1) as f64 * TILE_SIZE;
        let bottom = (self.grid.height - 1) as f64 * TILE_SIZE;
        match archetype {
            Archetype::Direct => Vec2::new(right, 0.0),
            Archetype::Ambush => Vec2::new(0.0, 0.0),
            Archetype::Flank => Vec2::new(right, bottom),
            Archetype::Threshold => Vec2::new(0.0, bottom),
        }
    }
}
