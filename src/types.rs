use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Fixed evaluation order for direction sets. Ties in target distance are
    /// broken by whichever direction appears first here.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" | "u" => Some(Self::Up),
            "down" | "d" => Some(Self::Down),
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ready,
    Running,
    Lost,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerMode {
    Patrol,
    Pursue,
    Vulnerable,
}

impl PursuerMode {
    /// Patrol and Pursue alternate on the shared schedule. Vulnerable is an
    /// interrupt and always hands back to Patrol.
    pub fn next_scheduled(self) -> Self {
        match self {
            Self::Patrol => Self::Pursue,
            Self::Pursue => Self::Patrol,
            Self::Vulnerable => Self::Patrol,
        }
    }
}

/// Collision-outcome sub-state of a pursuer. Edible exactly while the mode is
/// Vulnerable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vulnerability {
    Normal,
    Edible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Direct,
    Ambush,
    Flank,
    Threshold,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f64,
    pub y: f64,
    pub dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct PursuerView {
    pub archetype: Archetype,
    pub x: f64,
    pub y: f64,
    pub dir: Direction,
    pub mode: PursuerMode,
    pub vulnerability: Vulnerability,
    pub respawning: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub x: f64,
    pub y: f64,
    pub points: u32,
    pub power: bool,
    pub collectable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LevelSnapshot {
    pub tick: u64,
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "sharedMode")]
    pub shared_mode: PursuerMode,
    #[serde(rename = "vulnerableTicksLeft")]
    pub vulnerable_ticks_left: u32,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    pub items: Vec<ItemView>,
    #[serde(rename = "itemsRemaining")]
    pub items_remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::None.opposite(), Direction::None);
        for dir in Direction::PRIORITY {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn scheduled_modes_alternate_and_vulnerable_exits_to_patrol() {
        assert_eq!(PursuerMode::Patrol.next_scheduled(), PursuerMode::Pursue);
        assert_eq!(PursuerMode::Pursue.next_scheduled(), PursuerMode::Patrol);
        assert_eq!(
            PursuerMode::Vulnerable.next_scheduled(),
            PursuerMode::Patrol
        );
    }

    #[test]
    fn parse_move_accepts_long_and_short_forms() {
        assert_eq!(Direction::parse_move("up"), Some(Direction::Up));
        assert_eq!(Direction::parse_move("r"), Some(Direction::Right));
        assert_eq!(Direction::parse_move("noop"), None);
    }
}
