use crate::constants::{min_open_cells, MAX_PLACEMENT_ATTEMPTS};
use crate::error::PlacementError;
use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{Cell, Position};

/// Uniformly random Empty cell.
///
/// Samples blindly first; on a crowded board it falls back to picking among
/// the remaining empty cells so the call always terminates.
pub fn find_random_empty_cell(grid: &Grid, rng: &mut Rng) -> Result<Position, PlacementError> {
    find_random_empty_cell_except(grid, rng, None)
}

/// Same as [`find_random_empty_cell`] but never returns `excluded`, for cells
/// that read Empty only because an occupant left them this tick.
pub fn find_random_empty_cell_except(
    grid: &Grid,
    rng: &mut Rng,
    excluded: Option<Position>,
) -> Result<Position, PlacementError> {
    let size = grid.dimensions();
    if size == 0 {
        return Err(PlacementError::Exhausted);
    }
    let usable = |pos: Position| Some(pos) != excluded && grid.get(pos) == Ok(Cell::Empty);

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let row = rng.below(size) as i32;
        let col = rng.below(size) as i32;
        let candidate = Position::new(row, col);
        if usable(candidate) {
            return Ok(candidate);
        }
    }

    let open: Vec<Position> = grid
        .empty_positions()
        .into_iter()
        .filter(|pos| Some(*pos) != excluded)
        .collect();
    if open.is_empty() {
        return Err(PlacementError::Exhausted);
    }
    Ok(open[rng.below(open.len())])
}

/// Startup capacity check: the generated board must leave room for the
/// player, every adversary and a few spare cells.
pub fn ensure_capacity(grid: &Grid) -> Result<(), PlacementError> {
    let open = grid.count(|cell| cell == Cell::Empty);
    let required = min_open_cells();
    if open < required {
        return Err(PlacementError::GridTooSmall {
            size: grid.dimensions(),
            open,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_all_but(grid: &mut Grid, keep: &[Position]) {
        let size = grid.dimensions() as i32;
        for row in 0..size {
            for col in 0..size {
                let pos = Position::new(row, col);
                if !keep.contains(&pos) {
                    grid.set(pos, Cell::Wall).expect("in bounds");
                }
            }
        }
    }

    #[test]
    fn always_lands_on_an_empty_cell() {
        let mut rng = Rng::new(9);
        let grid = Grid::generate(12, &mut rng);
        for _ in 0..200 {
            let pos = find_random_empty_cell(&grid, &mut rng).expect("open cells exist");
            assert_eq!(grid.get(pos), Ok(Cell::Empty));
        }
    }

    #[test]
    fn finds_the_last_open_cell_on_a_saturated_board() {
        let mut grid = Grid::new(30);
        let last = Position::new(17, 23);
        fill_all_but(&mut grid, &[last]);
        let mut rng = Rng::new(1);
        assert_eq!(find_random_empty_cell(&grid, &mut rng), Ok(last));
    }

    #[test]
    fn excluded_cell_is_never_chosen() {
        let mut grid = Grid::new(6);
        let kept = [Position::new(0, 0), Position::new(4, 5)];
        fill_all_but(&mut grid, &kept);
        let mut rng = Rng::new(13);
        for _ in 0..100 {
            assert_eq!(
                find_random_empty_cell_except(&grid, &mut rng, Some(kept[0])),
                Ok(kept[1])
            );
        }
        assert_eq!(
            find_random_empty_cell_except(&grid, &mut Rng::new(2), Some(kept[1])),
            Ok(kept[0])
        );

        fill_all_but(&mut grid, &[kept[0]]);
        assert_eq!(
            find_random_empty_cell_except(&grid, &mut rng, Some(kept[0])),
            Err(PlacementError::Exhausted)
        );
    }

    #[test]
    fn full_board_reports_exhaustion() {
        let mut grid = Grid::new(4);
        fill_all_but(&mut grid, &[]);
        let mut rng = Rng::new(3);
        assert_eq!(
            find_random_empty_cell(&grid, &mut rng),
            Err(PlacementError::Exhausted)
        );
    }

    #[test]
    fn capacity_check_rejects_crowded_boards() {
        let mut grid = Grid::new(4);
        fill_all_but(&mut grid, &[Position::new(0, 0), Position::new(1, 1)]);
        assert_eq!(
            ensure_capacity(&grid),
            Err(PlacementError::GridTooSmall {
                size: 4,
                open: 2,
                required: min_open_cells(),
            })
        );
        assert_eq!(ensure_capacity(&Grid::new(4)), Ok(()));
    }
}
