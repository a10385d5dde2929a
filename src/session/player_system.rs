use super::*;

use crate::constants::{
    EXTRA_SCORE_BONUS, INVINCIBILITY_DURATION_MS, PLAYER_TICK_MS, SPEED_BOOST_DURATION_MS,
    WALL_BREAK_DURATION_MS,
};
use crate::types::PowerUpKind;

impl GameSession {
    /// Latest intent wins; it persists until replaced.
    pub fn set_direction(&mut self, dir: Direction) {
        if self.is_ended() {
            return;
        }
        self.player.dir = dir;
    }

    pub fn step_player(&mut self) -> Result<(), GameError> {
        if self.is_ended() || !self.player.alive {
            return Ok(());
        }
        self.effects.tick(PLAYER_TICK_MS);

        if self.player.dir == Direction::None {
            return Ok(());
        }
        let candidate = self.player.position.offset(self.player.dir);
        let Ok(target) = self.grid.get(candidate) else {
            return Ok(());
        };

        // Collecting spends the tick; the player steps in on the next one.
        if let Some(kind) = target.power_up() {
            self.apply_power_up(kind);
            self.grid.set(candidate, Cell::Empty)?;
            return Ok(());
        }

        match target {
            Cell::Wall if self.effects.is_active(StatusEffect::WallBreak) => {
                self.grid.set(candidate, Cell::Empty)?;
                self.move_player_to(candidate)?;
            }
            Cell::Empty => self.move_player_to(candidate)?,
            Cell::Adversary => self.run_into_adversary(candidate)?,
            _ => {}
        }
        Ok(())
    }

    /// Mouth phase flip driven by the animation ticker.
    pub fn toggle_mouth(&mut self) -> Result<(), GameError> {
        if self.is_ended() || !self.player.alive {
            return Ok(());
        }
        self.player.cell = if self.player.cell == Cell::PlayerOpenMouth {
            Cell::PlayerClosedMouth
        } else {
            Cell::PlayerOpenMouth
        };
        self.grid.set(self.player.position, self.player.cell)?;
        Ok(())
    }

    fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::SpeedBoost => self
                .effects
                .activate(StatusEffect::SpeedBoost, SPEED_BOOST_DURATION_MS),
            PowerUpKind::Invincibility => self
                .effects
                .activate(StatusEffect::Invincibility, INVINCIBILITY_DURATION_MS),
            PowerUpKind::WallBreak => self
                .effects
                .activate(StatusEffect::WallBreak, WALL_BREAK_DURATION_MS),
            PowerUpKind::ExtraLife => self.lives += 1,
            PowerUpKind::ExtraScore => self.score += EXTRA_SCORE_BONUS,
        }
        tracing::debug!(?kind, lives = self.lives, score = self.score, "power-up collected");
    }

    fn move_player_to(&mut self, target: Position) -> Result<(), GameError> {
        self.grid.set(self.player.position, Cell::Empty)?;
        self.player.position = target;
        self.grid.set(target, self.player.cell)?;
        Ok(())
    }

    fn run_into_adversary(&mut self, target: Position) -> Result<(), GameError> {
        let origin = self.player.position;
        if self.effects.is_active(StatusEffect::Invincibility) {
            // Trade places so neither occupant disappears from the board.
            if let Some(slot) = self.adversaries.iter().position(|pos| *pos == target) {
                self.adversaries[slot] = origin;
            }
            self.player.position = target;
            self.grid.set(target, self.player.cell)?;
            self.grid.set(origin, Cell::Adversary)?;
            return Ok(());
        }

        self.grid.set(origin, Cell::Empty)?;
        self.player.position = target;
        self.resolve_collision(None)
    }

    /// The player shares a cell with an adversary. The adversary keeps the
    /// cell; the player pays a life and reappears elsewhere, or the session
    /// ends when no life is left. `vacated` is the cell the catching
    /// adversary just left; it is only reused when nothing else is free.
    pub(super) fn resolve_collision(
        &mut self,
        vacated: Option<Position>,
    ) -> Result<(), GameError> {
        if self.effects.is_active(StatusEffect::Invincibility) {
            return Ok(());
        }
        self.lives = self.lives.saturating_sub(1);
        tracing::info!(lives = self.lives, "player caught");
        if self.lives == 0 {
            self.player.alive = false;
            self.end(SessionEndReason::LivesExhausted);
            return Ok(());
        }

        let spawn = match find_random_empty_cell_except(&self.grid, &mut self.rng, vacated) {
            Ok(pos) => pos,
            Err(PlacementError::Exhausted) => match self.respawn_over_power_up() {
                Some(pos) => pos,
                None => vacated.ok_or(PlacementError::Exhausted)?,
            },
            Err(error) => return Err(error.into()),
        };
        self.player.position = spawn;
        self.grid.set(spawn, self.player.cell)?;
        Ok(())
    }

    /// A board packed with uncollected power-ups still has to take the
    /// player back; one of them is discarded unused.
    fn respawn_over_power_up(&mut self) -> Option<Position> {
        let candidates: Vec<Position> = (0..self.grid.cells().len())
            .filter(|&index| self.grid.cells()[index].power_up().is_some())
            .map(|index| self.grid.position_of(index))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.below(candidates.len())])
    }
}
