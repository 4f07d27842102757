use super::*;

impl Level {
    /// Post-movement collision resolution: pursuer contacts first, then item
    /// pickups. Pursuer contacts use a swept overlap on both agents so a
    /// crossing within one tick still registers. A life loss resets the
    /// world, so the sweep stops there.
    pub(super) fn run_collision_sweep(&mut self) {
        for idx in 0..self.pursuers.len() {
            if self.pursuers[idx].is_respawning() {
                continue;
            }
            let hit = {
                let player = &self.player;
                let pursuer = &self.pursuers[idx];
                player.bounds.swept_overlaps(
                    player.kinematics.speed(),
                    player.kinematics.direction(),
                    &pursuer.bounds,
                ) || pursuer.bounds.swept_overlaps(
                    pursuer.kinematics.speed(),
                    pursuer.kinematics.direction(),
                    &player.bounds,
                )
            };
            if !hit {
                continue;
            }
            // During the post-eat grace window every pursuer contact is
            // ignored, Edible and Normal alike.
            if self.invulnerability_ticks_left > 0 {
                continue;
            }
            match self.pursuers[idx].vulnerability {
                Vulnerability::Edible => self.handle_pursuer_eaten(idx),
                Vulnerability::Normal => self.handle_life_lost(),
            }
            if self.phase != Phase::Running {
                return;
            }
        }

        for idx in 0..self.items.len() {
            if !self.items[idx].collectable {
                continue;
            }
            if !self.player.bounds.overlaps(&self.items[idx].bounds) {
                continue;
            }
            self.items[idx].collectable = false;
            let points = self.items[idx].points;
            let power = self.items[idx].power;
            self.add_score(points);
            if power {
                self.activate_vulnerable_mode();
            }
        }
    }
}
