pub const TICKS_PER_SECOND: u32 = 60;

pub const TILE_SIZE: f64 = 16.0;
pub const ALIGN_TOLERANCE: f64 = 4.0;

pub const READY_DELAY_TICKS: u32 = 100;
pub const MIN_DIRECTION_HOLD_TICKS: u32 = 8;
pub const RESPAWN_DELAY_TICKS: u32 = 60;
pub const INVULNERABILITY_TICKS: u32 = 60;

pub const ITEM_POINTS: u32 = 100;
pub const POWER_ITEM_POINTS: u32 = 50;

pub const AMBUSH_LEAD_TILES: f64 = 4.0;
pub const FLANK_LEAD_TILES: f64 = 2.0;
pub const THRESHOLD_FLEE_TILES: f64 = 8.0;

const KILL_POINTS: [u32; 4] = [200, 400, 800, 1600];

/// Points for the n-th consecutive pursuer caught within one vulnerable
/// period, saturating at the last tier.
pub fn kill_points(consecutive_kills: u32) -> u32 {
    let index = (consecutive_kills as usize).min(KILL_POINTS.len() - 1);
    KILL_POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_points_escalate_and_saturate() {
        assert_eq!(kill_points(0), 200);
        assert_eq!(kill_points(1), 400);
        assert_eq!(kill_points(2), 800);
        assert_eq!(kill_points(3), 1600);
        assert_eq!(kill_points(4), 1600);
        assert_eq!(kill_points(99), 1600);
    }
}
