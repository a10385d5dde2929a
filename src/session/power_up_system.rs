use super::*;

use crate::types::PowerUpKind;

impl GameSession {
    /// Drops one uniformly chosen power-up on a random empty cell. A full
    /// board skips the spawn rather than failing the session.
    pub fn spawn_power_up(&mut self) -> Result<Option<(PowerUpKind, Position)>, GameError> {
        if self.is_ended() {
            return Ok(None);
        }
        let kind = PowerUpKind::ALL[self.rng.below(PowerUpKind::ALL.len())];
        let pos = match find_random_empty_cell(&self.grid, &mut self.rng) {
            Ok(pos) => pos,
            Err(PlacementError::Exhausted) => {
                tracing::debug!(?kind, "no room for power-up");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };
        self.grid.set(pos, Cell::from(kind))?;
        tracing::debug!(?kind, row = pos.row, col = pos.col, "power-up spawned");
        Ok(Some((kind, pos)))
    }
}
