pub const PLAYER_TICK_MS: u64 = 300;
pub const BOOSTED_PLAYER_TICK_MS: u64 = PLAYER_TICK_MS / 2;
pub const ADVERSARY_TICK_MS: u64 = 500;
pub const POWER_UP_SPAWN_MS: u64 = 5_000;
pub const SCORE_TICK_MS: u64 = 5_000;
pub const ANIMATION_TICK_MS: u64 = 300;
pub const CLOCK_TICK_MS: u64 = 1_000;

// Effect durations are counted down by PLAYER_TICK_MS on every motion tick,
// whatever the current cadence.
pub const SPEED_BOOST_DURATION_MS: u64 = 10_000;
pub const INVINCIBILITY_DURATION_MS: u64 = 10_000;
pub const WALL_BREAK_DURATION_MS: u64 = 7_000;

pub const INITIAL_LIVES: u32 = 3;
pub const ADVERSARY_COUNT: usize = 5;
pub const SCORE_TICK_BONUS: u64 = 10;
pub const EXTRA_SCORE_BONUS: u64 = 15;

pub const WALL_DENSITY: f32 = 0.2;
pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 200;
pub const DEFAULT_GRID_SIZE: usize = 20;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 256;

/// Empty cells that must remain after walls are laid, beyond the player and
/// the adversaries, so power-ups and respawns have somewhere to go.
pub const PLACEMENT_RESERVE: usize = 4;

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const MAX_PLAYER_NAME_CHARS: usize = 16;

/// Smallest grid that can host the player, every adversary and the reserve.
pub fn min_open_cells() -> usize {
    1 + ADVERSARY_COUNT + PLACEMENT_RESERVE
}

pub fn player_tick_ms(speed_boost_active: bool) -> u64 {
    if speed_boost_active {
        BOOSTED_PLAYER_TICK_MS
    } else {
        PLAYER_TICK_MS
    }
}
