use std::collections::HashSet;

use tokio::time::Duration;

use crate::clock::SessionClock;
use crate::config::SessionConfig;
use crate::constants::{player_tick_ms, ADVERSARY_COUNT, INITIAL_LIVES, SCORE_TICK_BONUS};
use crate::effects::{StatusEffect, StatusEffects};
use crate::error::{GameError, PlacementError};
use crate::grid::Grid;
use crate::placement::{
    ensure_capacity, find_random_empty_cell, find_random_empty_cell_except,
};
use crate::rng::Rng;
use crate::types::{
    Cell, Direction, PlayerView, Position, SessionEndReason, SessionSnapshot, SessionSummary,
};

mod adversary_system;
mod player_system;
mod power_up_system;

#[derive(Clone, Copy, Debug)]
struct PlayerState {
    position: Position,
    dir: Direction,
    /// Player, PlayerOpenMouth or PlayerClosedMouth.
    cell: Cell,
    alive: bool,
}

/// Single owner of the grid and every counter of one play-through.
///
/// Each `step_*`/`award_*` method is one bounded unit of work for one
/// ticker; the runtime calls them under a single lock so they never
/// interleave. Once the session has ended every mutator is a no-op.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: SessionConfig,
    grid: Grid,
    rng: Rng,
    player: PlayerState,
    adversaries: Vec<Position>,
    effects: StatusEffects,
    lives: u32,
    score: u64,
    clock: SessionClock,
    elapsed_secs: u64,
    end_reason: Option<SessionEndReason>,
    full_refresh_pending: bool,
}

impl GameSession {
    /// Generates a maze from the config seed and places the adversaries and
    /// the player on random empty cells.
    pub fn new(config: SessionConfig) -> Result<Self, GameError> {
        let mut rng = Rng::new(config.seed);
        let mut grid = Grid::generate(config.grid_size, &mut rng);
        ensure_capacity(&grid)?;

        let mut adversaries = Vec::with_capacity(ADVERSARY_COUNT);
        for _ in 0..ADVERSARY_COUNT {
            let pos = find_random_empty_cell(&grid, &mut rng)?;
            grid.set(pos, Cell::Adversary)?;
            adversaries.push(pos);
        }
        let player_pos = find_random_empty_cell(&grid, &mut rng)?;
        grid.set(player_pos, Cell::Player)?;
        grid.drain_changes();

        tracing::info!(
            seed = config.seed,
            size = config.grid_size,
            walls = grid.count(|cell| cell == Cell::Wall),
            "session generated"
        );
        Ok(Self::assemble(config, grid, rng, player_pos, adversaries))
    }

    /// Builds a session on a prepared board. Existing Player and Adversary
    /// cells are replaced by the given positions, which must be distinct,
    /// in bounds and not walls.
    pub fn from_layout(
        config: SessionConfig,
        mut grid: Grid,
        player: Position,
        adversaries: Vec<Position>,
    ) -> Result<Self, GameError> {
        for index in 0..grid.cells().len() {
            let pos = grid.position_of(index);
            let cell = grid.get(pos)?;
            if cell.is_player() || cell == Cell::Adversary {
                grid.set(pos, Cell::Empty)?;
            }
        }
        let mut claimed = HashSet::new();
        for &pos in adversaries.iter().chain(std::iter::once(&player)) {
            if grid.get(pos)? == Cell::Wall || !claimed.insert(pos) {
                return Err(PlacementError::Blocked {
                    row: pos.row,
                    col: pos.col,
                }
                .into());
            }
        }
        for &pos in &adversaries {
            grid.set(pos, Cell::Adversary)?;
        }
        grid.set(player, Cell::Player)?;
        grid.drain_changes();

        let rng = Rng::new(config.seed);
        Ok(Self::assemble(config, grid, rng, player, adversaries))
    }

    fn assemble(
        config: SessionConfig,
        grid: Grid,
        rng: Rng,
        player_pos: Position,
        adversaries: Vec<Position>,
    ) -> Self {
        Self {
            config,
            grid,
            rng,
            player: PlayerState {
                position: player_pos,
                dir: Direction::None,
                cell: Cell::Player,
                alive: true,
            },
            adversaries,
            effects: StatusEffects::new(),
            lives: INITIAL_LIVES,
            score: 0,
            clock: SessionClock::new(),
            elapsed_secs: 0,
            end_reason: None,
            full_refresh_pending: true,
        }
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn player_position(&self) -> Option<Position> {
        self.player.alive.then_some(self.player.position)
    }

    pub fn direction(&self) -> Direction {
        self.player.dir
    }

    pub fn adversaries(&self) -> &[Position] {
        &self.adversaries
    }

    pub fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    pub fn is_ended(&self) -> bool {
        self.end_reason.is_some()
    }

    pub fn end_reason(&self) -> Option<SessionEndReason> {
        self.end_reason
    }

    /// Delay until the next player-motion tick, re-read after every tick.
    pub fn player_tick_interval(&self) -> Duration {
        Duration::from_millis(player_tick_ms(
            self.effects.is_active(StatusEffect::SpeedBoost),
        ))
    }

    pub fn award_time_score(&mut self) {
        if self.is_ended() {
            return;
        }
        self.score += SCORE_TICK_BONUS;
    }

    /// Copies the stopwatch into the display counter.
    pub fn refresh_clock(&mut self) {
        if self.is_ended() {
            return;
        }
        self.elapsed_secs = self.clock.elapsed_secs();
    }

    pub fn request_quit(&mut self) {
        self.end(SessionEndReason::Quit);
    }

    fn end(&mut self, reason: SessionEndReason) {
        if self.is_ended() {
            return;
        }
        self.end_reason = Some(reason);
        self.clock.stop();
        self.elapsed_secs = self.clock.elapsed_secs();
        tracing::info!(?reason, score = self.score, lives = self.lives, "session ended");
    }

    /// Collects the cells written since the previous snapshot, or the whole
    /// board when a full refresh is pending.
    pub fn build_snapshot(&mut self) -> SessionSnapshot {
        let changes = self.grid.drain_changes();
        let full_grid = if self.full_refresh_pending {
            self.full_refresh_pending = false;
            Some(self.grid.cells().to_vec())
        } else {
            None
        };
        SessionSnapshot {
            size: self.grid.dimensions(),
            lives: self.lives,
            score: self.score,
            elapsed_secs: self.elapsed_secs,
            player: self.player.alive.then_some(PlayerView {
                position: self.player.position,
                dir: self.player.dir,
                mouth_open: self.player.cell == Cell::PlayerOpenMouth,
            }),
            adversaries: self.adversaries.clone(),
            effects: self.effects.view(),
            changes: if full_grid.is_some() {
                Vec::new()
            } else {
                changes
            },
            full_grid,
            ended: self.is_ended(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            name: self.config.player_name.clone(),
            score: self.score,
            lives: self.lives,
            elapsed_secs: self.clock.elapsed_secs(),
            reason: self.end_reason.unwrap_or(SessionEndReason::Quit),
            seed: self.config.seed,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    #[cfg(test)]
    pub(crate) fn activate_effect(&mut self, effect: StatusEffect, duration_ms: u64) {
        self.effects.activate(effect, duration_ms);
    }
}
