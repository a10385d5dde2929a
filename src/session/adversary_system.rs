use super::*;

impl GameSession {
    /// One random diagonal step per adversary, in a fixed order. A blocked
    /// step leaves the adversary where it was.
    pub fn step_adversaries(&mut self) -> Result<(), GameError> {
        for index in 0..self.adversaries.len() {
            if self.is_ended() {
                break;
            }
            let origin = self.adversaries[index];
            self.grid.set(origin, Cell::Empty)?;

            let candidate = origin.shifted(self.rng.unit_step(), self.rng.unit_step());
            let mut destination = origin;
            let mut caught_player = false;
            match self.grid.get(candidate) {
                Ok(Cell::Empty) => destination = candidate,
                Ok(cell)
                    if cell.is_player()
                        && !self.effects.is_active(StatusEffect::Invincibility) =>
                {
                    destination = candidate;
                    caught_player = true;
                }
                _ => {}
            }

            self.adversaries[index] = destination;
            self.grid.set(destination, Cell::Adversary)?;
            if caught_player {
                self.resolve_collision(Some(origin))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::constants::INITIAL_LIVES;

    #[test]
    fn boxed_in_adversary_stays_put() {
        let grid = walled_board(5, &[(2, 2), (0, 0)]);
        let mut session = GameSession::from_layout(
            config(5, 1),
            grid,
            Position::new(0, 0),
            vec![Position::new(2, 2)],
        )
        .expect("layout is valid");
        for _ in 0..20 {
            session.step_adversaries().expect("tick");
            assert_eq!(session.adversaries(), &[Position::new(2, 2)]);
            assert_eq!(session.grid().get(Position::new(2, 2)), Ok(Cell::Adversary));
        }
    }

    #[test]
    fn steps_are_single_diagonal_moves_onto_empty_cells() {
        for seed in 0..40u32 {
            let mut session = GameSession::new(config(12, seed)).expect("session builds");
            for _ in 0..30 {
                let before = session.adversaries().to_vec();
                session.step_adversaries().expect("tick");
                if session.is_ended() {
                    break;
                }
                for (old, new) in before.iter().zip(session.adversaries()) {
                    let dr = (new.row - old.row).abs();
                    let dc = (new.col - old.col).abs();
                    assert!(
                        (dr == 0 && dc == 0) || (dr == 1 && dc == 1),
                        "seed={seed} {old:?}->{new:?}"
                    );
                }
                assert_eq!(count_adversaries(&session), session.adversaries().len());
            }
        }
    }

    #[test]
    fn adversary_stepping_onto_player_costs_a_life() {
        // Only (4,4) is reachable diagonally from (5,5); the player sits there.
        let open = [(5, 5), (4, 4), (0, 9)];
        let grid = walled_board(10, &open);
        let mut session = GameSession::from_layout(
            config(10, 21),
            grid,
            Position::new(4, 4),
            vec![Position::new(5, 5)],
        )
        .expect("layout is valid");

        let mut ticks = 0;
        while session.lives() == INITIAL_LIVES {
            session.step_adversaries().expect("tick");
            ticks += 1;
            assert!(ticks < 200, "adversary never reached the player");
        }

        assert_eq!(session.lives(), INITIAL_LIVES - 1);
        assert_eq!(session.adversaries(), &[Position::new(4, 4)]);
        assert_eq!(session.player_position(), Some(Position::new(0, 9)));
        assert_eq!(count_players(&session), 1);
        assert_eq!(count_adversaries(&session), 1);
    }

    #[test]
    fn invincible_player_blocks_adversary() {
        let open = [(5, 5), (4, 4)];
        let grid = walled_board(10, &open);
        let mut session = GameSession::from_layout(
            config(10, 21),
            grid,
            Position::new(4, 4),
            vec![Position::new(5, 5)],
        )
        .expect("layout is valid");
        session.activate_effect(StatusEffect::Invincibility, 10_000);

        for _ in 0..50 {
            session.step_adversaries().expect("tick");
        }
        assert_eq!(session.lives(), INITIAL_LIVES);
        assert_eq!(session.adversaries(), &[Position::new(5, 5)]);
        assert_eq!(session.player_position(), Some(Position::new(4, 4)));
    }

    #[test]
    fn adversary_catches_player_on_ten_by_ten_grid() {
        // Every diagonal but the one leading onto the player is walled off.
        for seed in 0..200u32 {
            let grid = board(10, &[(7, 7), (7, 5), (5, 7)]);
            let mut session = GameSession::from_layout(
                config(10, seed),
                grid,
                Position::new(5, 5),
                vec![Position::new(6, 6)],
            )
            .expect("layout is valid");

            let mut ticks = 0;
            while session.lives() == INITIAL_LIVES {
                let empty_before: Vec<Position> = session.grid().empty_positions();
                session.step_adversaries().expect("tick");
                ticks += 1;
                assert!(ticks < 200, "seed={seed}");
                if session.lives() < INITIAL_LIVES {
                    let respawn = session.player_position().expect("player alive");
                    assert!(empty_before.contains(&respawn), "seed={seed} {respawn:?}");
                    assert_ne!(respawn, Position::new(6, 6), "seed={seed}");
                }
            }
            assert_eq!(session.lives(), INITIAL_LIVES - 1);
            assert_eq!(session.adversaries(), &[Position::new(5, 5)]);
            assert_eq!(session.grid().get(Position::new(5, 5)), Ok(Cell::Adversary));
            assert_eq!(count_players(&session), 1);
        }
    }

    #[test]
    fn vacated_cell_is_reused_only_when_nothing_else_is_free() {
        let grid = walled_board(10, &[(5, 5), (4, 4)]);
        let mut session = GameSession::from_layout(
            config(10, 8),
            grid,
            Position::new(4, 4),
            vec![Position::new(5, 5)],
        )
        .expect("layout is valid");

        while session.lives() == INITIAL_LIVES {
            session.step_adversaries().expect("tick");
        }
        assert_eq!(session.adversaries(), &[Position::new(4, 4)]);
        assert_eq!(session.player_position(), Some(Position::new(5, 5)));
        assert_eq!(count_players(&session), 1);
    }
}
