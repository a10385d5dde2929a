use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    SpeedBoost,
    Invincibility,
    WallBreak,
    ExtraLife,
    ExtraScore,
}

impl PowerUpKind {
    pub const ALL: [Self; 5] = [
        Self::SpeedBoost,
        Self::Invincibility,
        Self::WallBreak,
        Self::ExtraLife,
        Self::ExtraScore,
    ];
}

/// Logic-level content of one grid coordinate. Render hints are derived by
/// the presentation layer, never stored here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Wall,
    Player,
    Adversary,
    PlayerOpenMouth,
    PlayerClosedMouth,
    SpeedBoost,
    Invincibility,
    WallBreak,
    ExtraLife,
    ExtraScore,
}

impl Cell {
    pub fn is_player(self) -> bool {
        matches!(
            self,
            Self::Player | Self::PlayerOpenMouth | Self::PlayerClosedMouth
        )
    }

    pub fn power_up(self) -> Option<PowerUpKind> {
        match self {
            Self::SpeedBoost => Some(PowerUpKind::SpeedBoost),
            Self::Invincibility => Some(PowerUpKind::Invincibility),
            Self::WallBreak => Some(PowerUpKind::WallBreak),
            Self::ExtraLife => Some(PowerUpKind::ExtraLife),
            Self::ExtraScore => Some(PowerUpKind::ExtraScore),
            _ => None,
        }
    }
}

impl From<PowerUpKind> for Cell {
    fn from(kind: PowerUpKind) -> Self {
        match kind {
            PowerUpKind::SpeedBoost => Self::SpeedBoost,
            PowerUpKind::Invincibility => Self::Invincibility,
            PowerUpKind::WallBreak => Self::WallBreak,
            PowerUpKind::ExtraLife => Self::ExtraLife,
            PowerUpKind::ExtraScore => Self::ExtraScore,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::None => (0, 0),
        }
    }
}

/// (row, column) pair. Signed so that a step off the edge is representable
/// and rejected by the grid instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        self.shifted(dr, dc)
    }

    pub fn shifted(self, dr: i32, dc: i32) -> Self {
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellChange {
    pub position: Position,
    pub cell: Cell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCommand {
    Move(Direction),
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    LivesExhausted,
    Quit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EffectsView {
    #[serde(rename = "speedBoost")]
    pub speed_boost: bool,
    pub invincibility: bool,
    #[serde(rename = "wallBreak")]
    pub wall_break: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub position: Position,
    pub dir: Direction,
    #[serde(rename = "mouthOpen")]
    pub mouth_open: bool,
}

/// Everything the presentation layer needs after one mutation. `full_grid`
/// is row-major and only present on structural change.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub size: usize,
    pub lives: u32,
    pub score: u64,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: u64,
    pub player: Option<PlayerView>,
    pub adversaries: Vec<Position>,
    pub effects: EffectsView,
    pub changes: Vec<CellChange>,
    #[serde(rename = "fullGrid", skip_serializing_if = "Option::is_none")]
    pub full_grid: Option<Vec<Cell>>,
    pub ended: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub score: u64,
    pub lives: u32,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: u64,
    pub reason: SessionEndReason,
    pub seed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_cells_map_back_to_their_kind() {
        for kind in PowerUpKind::ALL {
            assert_eq!(Cell::from(kind).power_up(), Some(kind));
        }
        assert_eq!(Cell::Wall.power_up(), None);
        assert_eq!(Cell::PlayerOpenMouth.power_up(), None);
    }

    #[test]
    fn every_mouth_phase_counts_as_player() {
        assert!(Cell::Player.is_player());
        assert!(Cell::PlayerOpenMouth.is_player());
        assert!(Cell::PlayerClosedMouth.is_player());
        assert!(!Cell::Adversary.is_player());
    }

    #[test]
    fn offset_moves_one_cell_and_none_stays() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.offset(Direction::Up), Position::new(4, 5));
        assert_eq!(origin.offset(Direction::Down), Position::new(6, 5));
        assert_eq!(origin.offset(Direction::Left), Position::new(5, 4));
        assert_eq!(origin.offset(Direction::Right), Position::new(5, 6));
        assert_eq!(origin.offset(Direction::None), origin);
    }
}
