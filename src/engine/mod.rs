use crate::config::{LevelTuning, ModeSpeeds, ModeTicks};
use crate::constants::{
    INVULNERABILITY_TICKS, ITEM_POINTS, MIN_DIRECTION_HOLD_TICKS, POWER_ITEM_POINTS,
    READY_DELAY_TICKS, RESPAWN_DELAY_TICKS, TILE_SIZE,
};
use crate::error::ConfigError;
use crate::maze::{ArenaMap, Grid};
use crate::physics::{BoundingBox, KinematicState, Vec2};
use crate::rng::Rng;
use crate::types::{
    Archetype, Direction, ItemView, LevelSnapshot, Phase, PlayerView, PursuerMode, PursuerView,
    Vulnerability,
};

mod collision_system;
pub mod targeting;

use self::targeting::{select_target, TargetChoice, TargetInputs};

/// Synchronous push notifications from the level, called inline during the
/// tick that causes them, in registration order.
pub trait LevelObserver {
    fn score_changed(&mut self, _delta: u32) {}
    fn lives_changed(&mut self, _lives: u32) {}
    fn phase_changed(&mut self, _phase: Phase) {}
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    kinematics: KinematicState,
    bounds: BoundingBox,
    spawn: Vec2,
    possible: Vec<Direction>,
}

#[derive(Clone, Debug)]
struct PursuerInternal {
    archetype: Archetype,
    kinematics: KinematicState,
    bounds: BoundingBox,
    spawn: Vec2,
    home_corner: Vec2,
    mode: PursuerMode,
    vulnerability: Vulnerability,
    possible: Vec<Direction>,
    target: Vec2,
    target_stale: bool,
    hold_count: u32,
    respawn_ticks: Option<u32>,
}

impl PursuerInternal {
    fn set_mode(&mut self, mode: PursuerMode, speeds: &ModeSpeeds) {
        self.mode = mode;
        self.kinematics.set_speed(speeds.for_mode(mode));
        self.vulnerability = if mode == PursuerMode::Vulnerable {
            Vulnerability::Edible
        } else {
            Vulnerability::Normal
        };
        // A mode change force-expires the direction hold and invalidates the
        // steering target.
        self.hold_count = MIN_DIRECTION_HOLD_TICKS;
        self.target_stale = true;
    }

    fn is_respawning(&self) -> bool {
        self.respawn_ticks.is_some()
    }
}

#[derive(Clone, Debug)]
struct ItemInternal {
    bounds: BoundingBox,
    points: u32,
    power: bool,
    collectable: bool,
}

/// One level of the chase arena, advanced one tick at a time. Owns all
/// mutable simulation state for the duration of a tick; external callers
/// interact only between ticks.
pub struct Level {
    grid: Grid,
    speeds: ModeSpeeds,
    schedule: ModeTicks,
    rng: Rng,

    player: PlayerInternal,
    pursuers: Vec<PursuerInternal>,
    items: Vec<ItemInternal>,
    observers: Vec<Box<dyn LevelObserver>>,

    phase: Phase,
    tick_count: u32,
    total_ticks: u64,
    score: u32,
    lives: u32,
    shared_mode: PursuerMode,
    mode_ticks: u32,
    vulnerable_ticks_left: u32,
    invulnerability_ticks_left: u32,
    consecutive_kills: u32,
    leader_position: Vec2,
    current_command: Option<Direction>,
    queued_command: Option<Direction>,
}

impl Level {
    pub fn new(
        map: &ArenaMap,
        tuning: &LevelTuning,
        num_lives: u32,
        seed: u32,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self::build(map, tuning, num_lives, seed))
    }

    /// Construction without tuning validation, for callers that have already
    /// validated the whole configuration.
    pub(crate) fn build(map: &ArenaMap, tuning: &LevelTuning, num_lives: u32, seed: u32) -> Self {
        let mut player_kinematics = KinematicState::new(map.player_spawn);
        player_kinematics.set_speed(tuning.player_speed);
        let player = PlayerInternal {
            kinematics: player_kinematics,
            bounds: BoundingBox::new(map.player_spawn, TILE_SIZE, TILE_SIZE),
            spawn: map.player_spawn,
            possible: Vec::new(),
        };

        let speeds = tuning.pursuer_speeds;
        let pursuers = map
            .pursuer_spawns
            .iter()
            .map(|spawn| {
                let mut kinematics = KinematicState::new(spawn.position);
                kinematics.set_speed(speeds.patrol);
                let home_corner = map.home_corner(spawn.archetype);
                PursuerInternal {
                    archetype: spawn.archetype,
                    kinematics,
                    bounds: BoundingBox::new(spawn.position, TILE_SIZE, TILE_SIZE),
                    spawn: spawn.position,
                    home_corner,
                    mode: PursuerMode::Patrol,
                    vulnerability: Vulnerability::Normal,
                    possible: Vec::new(),
                    target: home_corner,
                    target_stale: true,
                    hold_count: MIN_DIRECTION_HOLD_TICKS,
                    respawn_ticks: None,
                }
            })
            .collect();

        let items = map
            .item_spawns
            .iter()
            .map(|spawn| ItemInternal {
                bounds: BoundingBox::new(spawn.position, TILE_SIZE, TILE_SIZE),
                points: if spawn.power {
                    POWER_ITEM_POINTS
                } else {
                    ITEM_POINTS
                },
                power: spawn.power,
                collectable: true,
            })
            .collect();

        Self {
            grid: map.grid.clone(),
            speeds,
            schedule: tuning.mode_seconds.to_ticks(),
            rng: Rng::new(seed),
            player,
            pursuers,
            items,
            observers: Vec::new(),
            phase: Phase::Ready,
            tick_count: 0,
            total_ticks: 0,
            score: 0,
            lives: num_lives,
            shared_mode: PursuerMode::Patrol,
            mode_ticks: 0,
            vulnerable_ticks_left: 0,
            invulnerability_ticks_left: 0,
            consecutive_kills: 0,
            leader_position: Vec2::ZERO,
            current_command: None,
            queued_command: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn items_remaining(&self) -> usize {
        self.items.iter().filter(|item| item.collectable).count()
    }

    pub fn is_level_finished(&self) -> bool {
        self.items.iter().all(|item| !item.collectable)
    }

    /// Registers an observer, immediately delivering the current lives and
    /// phase so the observer starts from a consistent view.
    pub fn register_observer(&mut self, mut observer: Box<dyn LevelObserver>) {
        observer.lives_changed(self.lives);
        observer.phase_changed(self.phase);
        self.observers.push(observer);
    }

    pub(crate) fn take_observers(&mut self) -> Vec<Box<dyn LevelObserver>> {
        std::mem::take(&mut self.observers)
    }

    /// Player move intent. At most one current and one queued command; a new
    /// intent overwrites the queued one until it is successfully applied.
    pub fn push_move(&mut self, dir: Direction) {
        if dir == Direction::None {
            return;
        }
        if self.current_command.is_none() {
            self.current_command = Some(dir);
        } else {
            self.queued_command = Some(dir);
        }
    }

    pub fn move_up(&mut self) {
        self.push_move(Direction::Up);
    }

    pub fn move_down(&mut self) {
        self.push_move(Direction::Down);
    }

    pub fn move_left(&mut self) {
        self.push_move(Direction::Left);
    }

    pub fn move_right(&mut self) {
        self.push_move(Direction::Right);
    }

    /// Advances the simulation by one tick. Runs to completion; never fails.
    pub fn tick(&mut self) {
        self.total_ticks += 1;
        match self.phase {
            Phase::Ready => {
                self.tick_count += 1;
                if self.tick_count >= READY_DELAY_TICKS {
                    self.tick_count = 0;
                    self.set_phase(Phase::Running);
                }
            }
            Phase::Running => self.run_tick(),
            Phase::Lost | Phase::Won => {}
        }
    }

    fn run_tick(&mut self) {
        // 1. countdowns
        if self.vulnerable_ticks_left > 0 {
            self.vulnerable_ticks_left -= 1;
            if self.vulnerable_ticks_left == 0 {
                self.end_vulnerable_mode();
            }
        }
        if self.invulnerability_ticks_left > 0 {
            self.invulnerability_ticks_left -= 1;
        }

        // 2. shared mode schedule, suspended while Vulnerable is active
        if self.vulnerable_ticks_left == 0
            && self.mode_ticks >= self.schedule.scheduled_for(self.shared_mode)
        {
            self.shared_mode = self.shared_mode.next_scheduled();
            self.mode_ticks = 0;
            let mode = self.shared_mode;
            let speeds = self.speeds;
            for pursuer in &mut self.pursuers {
                if pursuer.is_respawning() {
                    continue;
                }
                pursuer.set_mode(mode, &speeds);
            }
        }

        // The leader position feeds Flank targeting; recorded every tick so
        // it never goes stale.
        if let Some(leader) = self
            .pursuers
            .iter()
            .find(|p| p.archetype == Archetype::Direct)
        {
            self.leader_position = leader.kinematics.position();
        }

        // 3. possible directions, before any movement
        self.player.possible = self.grid.possible_directions(
            self.player.bounds.center(),
            self.player.kinematics.direction(),
        );
        for idx in 0..self.pursuers.len() {
            let center = self.pursuers[idx].bounds.center();
            let facing = self.pursuers[idx].kinematics.direction();
            self.pursuers[idx].possible = self.grid.possible_directions(center, facing);
        }

        // 4. movement
        self.update_player();
        for idx in 0..self.pursuers.len() {
            self.update_pursuer(idx);
        }

        // 5. collisions
        self.run_collision_sweep();

        self.mode_ticks += 1;
        self.tick_count += 1;
    }

    fn update_player(&mut self) {
        if let Some(queued) = self.queued_command {
            if self.player.possible.contains(&queued) {
                self.current_command = Some(queued);
                self.queued_command = None;
            }
        }
        if let Some(current) = self.current_command {
            if self.player.possible.contains(&current) {
                self.player.kinematics.set_direction(current);
            }
        }
        advance_agent(&self.grid, &mut self.player.kinematics, &mut self.player.bounds);
    }

    fn update_pursuer(&mut self, idx: usize) {
        if let Some(ticks) = self.pursuers[idx].respawn_ticks {
            let next = ticks + 1;
            if next < RESPAWN_DELAY_TICKS {
                self.pursuers[idx].respawn_ticks = Some(next);
            } else {
                let speeds = self.speeds;
                let pursuer = &mut self.pursuers[idx];
                pursuer.respawn_ticks = None;
                pursuer.set_mode(PursuerMode::Patrol, &speeds);
            }
            return;
        }

        let at_intersection = Grid::is_at_intersection(&self.pursuers[idx].possible);
        let inputs = TargetInputs {
            player_position: self.player.kinematics.position(),
            player_facing: self.player.kinematics.direction(),
            leader_position: self.leader_position,
            own_position: self.pursuers[idx].kinematics.position(),
            home_corner: self.pursuers[idx].home_corner,
        };
        let choice = select_target(self.pursuers[idx].mode, self.pursuers[idx].archetype, &inputs);

        let dir = match choice {
            TargetChoice::RandomTurn => self.choose_random_turn(idx),
            TargetChoice::Steered(target) => {
                // Targets are re-evaluated at intersections and after mode
                // changes; in between the pursuer keeps its committed target.
                if at_intersection || self.pursuers[idx].target_stale {
                    self.pursuers[idx].target = target;
                    self.pursuers[idx].target_stale = false;
                }
                self.choose_steered_direction(idx)
            }
        };

        let pursuer = &mut self.pursuers[idx];
        if dir != pursuer.kinematics.direction() {
            pursuer.hold_count = 0;
        }
        pursuer.kinematics.set_direction(dir);
        advance_agent(&self.grid, &mut pursuer.kinematics, &mut pursuer.bounds);
    }

    /// Vulnerable-mode steering: a uniformly random pick over the whole
    /// possible set. Unlike steered movement, reversing is allowed.
    fn choose_random_turn(&mut self, idx: usize) -> Direction {
        let len = self.pursuers[idx].possible.len();
        if len == 0 {
            return self.pursuers[idx].kinematics.direction();
        }
        let pick = self.rng.pick_index(len);
        self.pursuers[idx].possible[pick]
    }

    fn choose_steered_direction(&mut self, idx: usize) -> Direction {
        let pursuer = &mut self.pursuers[idx];
        let current = pursuer.kinematics.direction();
        if pursuer.possible.is_empty() {
            return current;
        }
        // Commit to a chosen direction for a minimum number of ticks.
        if current != Direction::None && pursuer.hold_count < MIN_DIRECTION_HOLD_TICKS {
            pursuer.hold_count += 1;
            return current;
        }
        let mut best: Option<(f64, Direction)> = None;
        for &dir in &pursuer.possible {
            if current != Direction::None && dir == current.opposite() {
                continue;
            }
            let distance = pursuer.kinematics.potential_position(dir).distance(pursuer.target);
            if best.map(|(b, _)| distance < b).unwrap_or(true) {
                best = Some((distance, dir));
            }
        }
        match best {
            Some((_, dir)) => dir,
            // Dead end: reversing is the only option left.
            None => current.opposite(),
        }
    }

    /// Power-item pickup: every in-play pursuer turns Vulnerable, the shared
    /// schedule is suspended, and the consecutive-kill counter restarts.
    pub(crate) fn activate_vulnerable_mode(&mut self) {
        self.vulnerable_ticks_left = self.schedule.vulnerable;
        self.consecutive_kills = 0;
        let speeds = self.speeds;
        for pursuer in &mut self.pursuers {
            if pursuer.is_respawning() {
                continue;
            }
            pursuer.set_mode(PursuerMode::Vulnerable, &speeds);
        }
    }

    /// Vulnerable always hands back to Patrol, restarting the schedule from
    /// Patrol's beginning.
    fn end_vulnerable_mode(&mut self) {
        self.shared_mode = PursuerMode::Patrol;
        self.mode_ticks = 0;
        let speeds = self.speeds;
        for pursuer in &mut self.pursuers {
            if pursuer.is_respawning() {
                continue;
            }
            pursuer.set_mode(PursuerMode::Patrol, &speeds);
        }
    }

    pub(crate) fn handle_pursuer_eaten(&mut self, idx: usize) {
        let points = crate::constants::kill_points(self.consecutive_kills);
        self.consecutive_kills += 1;
        self.add_score(points);
        self.invulnerability_ticks_left = INVULNERABILITY_TICKS;

        let speeds = self.speeds;
        let pursuer = &mut self.pursuers[idx];
        pursuer.kinematics.set_position(pursuer.spawn);
        pursuer.kinematics.set_direction(Direction::None);
        pursuer.bounds.set_top_left(pursuer.spawn);
        pursuer.possible.clear();
        pursuer.set_mode(PursuerMode::Patrol, &speeds);
        pursuer.respawn_ticks = Some(0);
    }

    pub(crate) fn handle_life_lost(&mut self) {
        // Lives only ever decrease while the level is running.
        if self.phase != Phase::Running {
            return;
        }
        self.reset_dynamic_agents();
        self.vulnerable_ticks_left = 0;
        self.invulnerability_ticks_left = 0;
        self.consecutive_kills = 0;
        self.shared_mode = PursuerMode::Patrol;
        self.mode_ticks = 0;

        let lives = self.lives.saturating_sub(1);
        self.set_lives(lives);
        if lives > 0 {
            self.tick_count = 0;
            self.set_phase(Phase::Ready);
        } else {
            self.set_phase(Phase::Lost);
        }
    }

    fn reset_dynamic_agents(&mut self) {
        self.player.kinematics.set_position(self.player.spawn);
        self.player.kinematics.set_direction(Direction::None);
        self.player.bounds.set_top_left(self.player.spawn);
        self.player.possible.clear();
        let speeds = self.speeds;
        for pursuer in &mut self.pursuers {
            pursuer.kinematics.set_position(pursuer.spawn);
            pursuer.kinematics.set_direction(Direction::None);
            pursuer.bounds.set_top_left(pursuer.spawn);
            pursuer.possible.clear();
            pursuer.respawn_ticks = None;
            pursuer.target = pursuer.home_corner;
            pursuer.set_mode(PursuerMode::Patrol, &speeds);
        }
    }

    /// Level-clear handling: pursuer vulnerability and appearance are reset
    /// and item collectability is restored for the next level load.
    pub fn finish_level(&mut self) {
        self.vulnerable_ticks_left = 0;
        let speeds = self.speeds;
        for pursuer in &mut self.pursuers {
            if pursuer.mode == PursuerMode::Vulnerable {
                pursuer.set_mode(PursuerMode::Patrol, &speeds);
            }
            pursuer.vulnerability = Vulnerability::Normal;
        }
        for item in &mut self.items {
            item.collectable = true;
        }
    }

    pub(crate) fn mark_won(&mut self) {
        self.set_phase(Phase::Won);
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        for observer in &mut self.observers {
            observer.phase_changed(phase);
        }
    }

    fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
        for observer in &mut self.observers {
            observer.lives_changed(lives);
        }
    }

    fn add_score(&mut self, delta: u32) {
        self.score += delta;
        for observer in &mut self.observers {
            observer.score_changed(delta);
        }
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            tick: self.total_ticks,
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            shared_mode: self.shared_mode,
            vulnerable_ticks_left: self.vulnerable_ticks_left,
            player: PlayerView {
                x: self.player.kinematics.position().x,
                y: self.player.kinematics.position().y,
                dir: self.player.kinematics.direction(),
            },
            pursuers: self
                .pursuers
                .iter()
                .map(|p| PursuerView {
                    archetype: p.archetype,
                    x: p.kinematics.position().x,
                    y: p.kinematics.position().y,
                    dir: p.kinematics.direction(),
                    mode: p.mode,
                    vulnerability: p.vulnerability,
                    respawning: p.is_respawning(),
                })
                .collect(),
            items: self
                .items
                .iter()
                .map(|item| ItemView {
                    x: item.bounds.top_left.x,
                    y: item.bounds.top_left.y,
                    points: item.points,
                    power: item.power,
                    collectable: item.collectable,
                })
                .collect(),
            items_remaining: self.items_remaining(),
        }
    }
}

/// Applies one movement step, stopping at walls by snapping back to the tile
/// origin. The bounding extent is re-synced afterwards.
fn advance_agent(grid: &Grid, kinematics: &mut KinematicState, bounds: &mut BoundingBox) {
    let dir = kinematics.direction();
    if dir != Direction::None {
        let next = kinematics.potential_position(dir);
        if grid.box_clear(next, bounds.width, bounds.height) {
            kinematics.set_position(next);
        } else {
            kinematics.set_position(Grid::align_to_tile(kinematics.position()));
        }
    }
    bounds.set_top_left(kinematics.position());
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Level;
    use crate::config::{LevelTuning, ModeSeconds, ModeSpeeds};
    use crate::maze::ArenaMap;
    use crate::physics::Vec2;
    use crate::types::Phase;

    pub(crate) const ARENA: &str = "\
111111111
1p0000001
101110101
100000001
101110101
17000z0b1
111111111";

    pub(crate) const SINGLE_ITEM: &str = "\
11111
1p071
11111";

    pub(crate) fn tuning() -> LevelTuning {
        LevelTuning {
            player_speed: 2.0,
            pursuer_speeds: ModeSpeeds {
                patrol: 2.0,
                pursue: 2.0,
                vulnerable: 1.0,
            },
            mode_seconds: ModeSeconds {
                patrol: 1,
                pursue: 1,
                vulnerable: 1,
            },
        }
    }

    pub(crate) fn make_level(map_text: &str) -> Level {
        let map = ArenaMap::parse(map_text).expect("fixture map parses");
        Level::new(&map, &tuning(), 3, 7).expect("fixture tuning is valid")
    }

    pub(crate) fn force_running(level: &mut Level) {
        level.phase = Phase::Running;
    }

    pub(crate) fn place_player(level: &mut Level, position: Vec2) {
        level.player.kinematics.set_position(position);
        level.player.bounds.set_top_left(position);
    }

    pub(crate) fn place_pursuer(level: &mut Level, idx: usize, position: Vec2) {
        level.pursuers[idx].kinematics.set_position(position);
        level.pursuers[idx].bounds.set_top_left(position);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::constants::ITEM_POINTS;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CORRIDOR: &str = "\
1111111
1p00001
1111011
1000001
1111111";

    #[test]
    fn ready_phase_settles_before_running() {
        let mut level = make_level(ARENA);
        let spawn = level.player.spawn;
        level.move_right();
        for _ in 0..READY_DELAY_TICKS - 1 {
            level.tick();
            assert_eq!(level.phase(), Phase::Ready);
            assert_eq!(level.player.kinematics.position(), spawn);
        }
        level.tick();
        assert_eq!(level.phase(), Phase::Running);
    }

    #[test]
    fn queued_command_overwrites_and_applies_when_legal() {
        let mut level = make_level(CORRIDOR);
        force_running(&mut level);

        level.move_right();
        level.move_up();
        level.move_down();
        assert_eq!(level.current_command, Some(Direction::Right));
        assert_eq!(level.queued_command, Some(Direction::Down));

        // 24 ticks to reach the junction at x = 64, then the queued turn.
        for _ in 0..24 {
            level.tick();
        }
        assert_eq!(level.player.kinematics.position(), Vec2::new(64.0, 16.0));
        level.tick();
        assert_eq!(level.player.kinematics.direction(), Direction::Down);
        assert_eq!(level.current_command, Some(Direction::Down));
        assert_eq!(level.queued_command, None);
        for _ in 0..4 {
            level.tick();
        }
        assert!(level.player.kinematics.position().y > 16.0);
    }

    #[test]
    fn steering_holds_a_direction_for_its_minimum_ticks() {
        let mut level = make_level(ARENA);
        level.pursuers[0].possible = vec![Direction::Up, Direction::Right];
        level.pursuers[0].kinematics.set_direction(Direction::Right);
        level.pursuers[0].hold_count = 0;
        level.pursuers[0].target = Vec2::new(112.0, 0.0);

        for _ in 0..MIN_DIRECTION_HOLD_TICKS {
            assert_eq!(level.choose_steered_direction(0), Direction::Right);
        }
        assert_eq!(level.choose_steered_direction(0), Direction::Up);
    }

    #[test]
    fn mode_change_expires_the_direction_hold() {
        let mut level = make_level(ARENA);
        level.pursuers[0].possible = vec![Direction::Up, Direction::Right];
        level.pursuers[0].kinematics.set_direction(Direction::Right);
        level.pursuers[0].hold_count = 0;
        level.pursuers[0].target = Vec2::new(112.0, 0.0);

        let speeds = level.speeds;
        level.pursuers[0].set_mode(PursuerMode::Pursue, &speeds);
        assert_eq!(level.choose_steered_direction(0), Direction::Up);
    }

    #[test]
    fn steering_never_reverses_unless_dead_ended() {
        let mut level = make_level(ARENA);
        level.pursuers[0].kinematics.set_direction(Direction::Right);
        level.pursuers[0].hold_count = MIN_DIRECTION_HOLD_TICKS;
        level.pursuers[0].target = Vec2::new(0.0, 80.0);

        level.pursuers[0].possible = vec![Direction::Left, Direction::Right];
        assert_eq!(level.choose_steered_direction(0), Direction::Right);

        level.pursuers[0].possible = vec![Direction::Left];
        assert_eq!(level.choose_steered_direction(0), Direction::Left);
    }

    #[test]
    fn vulnerable_random_turns_stay_possible_and_may_reverse() {
        let mut level = make_level(ARENA);
        level.pursuers[0].kinematics.set_direction(Direction::Up);
        level.pursuers[0].possible = vec![Direction::Up, Direction::Down];

        let mut saw_reverse = false;
        for _ in 0..64 {
            let dir = level.choose_random_turn(0);
            assert!(level.pursuers[0].possible.contains(&dir));
            saw_reverse |= dir == Direction::Down;
        }
        assert!(saw_reverse);
    }

    #[test]
    fn shared_schedule_alternates_and_vulnerable_suspends_it() {
        let mut level = make_level(&ARENA.replace('b', "0"));
        force_running(&mut level);
        assert_eq!(level.shared_mode, PursuerMode::Patrol);

        for _ in 0..60 {
            level.tick();
        }
        assert_eq!(level.shared_mode, PursuerMode::Patrol);
        level.tick();
        assert_eq!(level.shared_mode, PursuerMode::Pursue);

        level.activate_vulnerable_mode();
        for _ in 0..59 {
            level.tick();
        }
        // The schedule stayed suspended the whole time.
        assert_eq!(level.shared_mode, PursuerMode::Pursue);
        assert_eq!(level.vulnerable_ticks_left, 1);

        level.tick();
        assert_eq!(level.shared_mode, PursuerMode::Patrol);
        assert!(level.mode_ticks <= 1);
    }

    #[test]
    fn mode_changes_propagate_to_pursuers() {
        let mut level = make_level(ARENA);
        force_running(&mut level);

        level.mode_ticks = level.schedule.patrol;
        level.tick();
        assert_eq!(level.shared_mode, PursuerMode::Pursue);
        assert_eq!(level.pursuers[0].mode, PursuerMode::Pursue);
        assert_eq!(
            level.pursuers[0].kinematics.speed(),
            level.speeds.pursue
        );

        level.activate_vulnerable_mode();
        assert_eq!(level.pursuers[0].mode, PursuerMode::Vulnerable);
        assert_eq!(level.pursuers[0].vulnerability, Vulnerability::Edible);
        assert_eq!(
            level.pursuers[0].kinematics.speed(),
            level.speeds.vulnerable
        );

        level.vulnerable_ticks_left = 1;
        level.tick();
        assert_eq!(level.shared_mode, PursuerMode::Patrol);
        assert_eq!(level.pursuers[0].mode, PursuerMode::Patrol);
        assert_eq!(level.pursuers[0].vulnerability, Vulnerability::Normal);
    }

    #[derive(Default)]
    struct Recorded {
        score_deltas: Vec<u32>,
        lives: Vec<u32>,
        phases: Vec<Phase>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl LevelObserver for Recorder {
        fn score_changed(&mut self, delta: u32) {
            self.0.borrow_mut().score_deltas.push(delta);
        }

        fn lives_changed(&mut self, lives: u32) {
            self.0.borrow_mut().lives.push(lives);
        }

        fn phase_changed(&mut self, phase: Phase) {
            self.0.borrow_mut().phases.push(phase);
        }
    }

    #[test]
    fn observers_get_the_initial_state_and_later_changes() {
        let mut level = make_level(ARENA);
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        level.register_observer(Box::new(Recorder(recorded.clone())));
        assert_eq!(recorded.borrow().lives, vec![3]);
        assert_eq!(recorded.borrow().phases, vec![Phase::Ready]);

        force_running(&mut level);
        place_player(&mut level, Vec2::new(16.0, 80.0));
        level.run_collision_sweep();
        assert_eq!(recorded.borrow().score_deltas, vec![ITEM_POINTS]);
    }

    fn run_scripted(seed: u32) -> Vec<String> {
        let map = ArenaMap::parse(ARENA).expect("fixture map parses");
        let mut level =
            Level::new(&map, &test_support::tuning(), 3, seed).expect("fixture tuning is valid");
        let mut out = Vec::new();
        for tick in 0..400u32 {
            match tick % 40 {
                0 => level.move_right(),
                20 => level.move_down(),
                _ => {}
            }
            level.tick();
            if tick % 25 == 0 {
                out.push(
                    serde_json::to_string(&level.snapshot()).expect("snapshot serializes"),
                );
            }
        }
        out
    }

    #[test]
    fn identical_seeds_replay_identically() {
        assert_eq!(run_scripted(99), run_scripted(99));
    }
}
