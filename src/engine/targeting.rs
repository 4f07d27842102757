use crate::constants::{AMBUSH_LEAD_TILES, FLANK_LEAD_TILES, THRESHOLD_FLEE_TILES, TILE_SIZE};
use crate::physics::{unit, Vec2};
use crate::types::{Archetype, Direction, PursuerMode};

/// World state a targeting computation may read. Plain values, captured once
/// per evaluation; strategies stay pure functions over this.
#[derive(Clone, Copy, Debug)]
pub struct TargetInputs {
    pub player_position: Vec2,
    pub player_facing: Direction,
    pub leader_position: Vec2,
    pub own_position: Vec2,
    pub home_corner: Vec2,
}

/// How a pursuer steers this tick. Vulnerable mode replaces the target with
/// a random turn; everything else heads for a concrete point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetChoice {
    Steered(Vec2),
    RandomTurn,
}

pub fn select_target(mode: PursuerMode, archetype: Archetype, inputs: &TargetInputs) -> TargetChoice {
    match mode {
        PursuerMode::Vulnerable => TargetChoice::RandomTurn,
        PursuerMode::Patrol => TargetChoice::Steered(inputs.home_corner),
        PursuerMode::Pursue => TargetChoice::Steered(pursue_target(archetype, inputs)),
    }
}

/// Pursue-mode target point for each archetype. Patrol behaviour is shared
/// (the home corner); only this function differs between archetypes.
pub fn pursue_target(archetype: Archetype, inputs: &TargetInputs) -> Vec2 {
    match archetype {
        Archetype::Direct => inputs.player_position,
        Archetype::Ambush => ahead_of_player(inputs, AMBUSH_LEAD_TILES),
        Archetype::Flank => {
            let lead = ahead_of_player(inputs, FLANK_LEAD_TILES);
            // Reflect the lead point through the leader, doubling the vector.
            inputs
                .leader_position
                .add(lead.sub(inputs.leader_position).scale(2.0))
        }
        Archetype::Threshold => {
            let distance = inputs.own_position.distance(inputs.player_position);
            if distance > THRESHOLD_FLEE_TILES * TILE_SIZE {
                inputs.player_position
            } else {
                inputs.home_corner
            }
        }
    }
}

fn ahead_of_player(inputs: &TargetInputs, tiles: f64) -> Vec2 {
    inputs
        .player_position
        .add(unit(inputs.player_facing).scale(tiles * TILE_SIZE))
}
