use serde::Serialize;

use crate::types::EffectsView;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    SpeedBoost,
    Invincibility,
    WallBreak,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectTimer {
    active: bool,
    remaining_ms: u64,
}

impl EffectTimer {
    /// Overwrites any countdown already running; boosts never stack.
    pub fn activate(&mut self, duration_ms: u64) {
        self.active = duration_ms > 0;
        self.remaining_ms = duration_ms;
    }

    pub fn tick(&mut self, step_ms: u64) {
        if self.active && self.remaining_ms > step_ms {
            self.remaining_ms -= step_ms;
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.remaining_ms = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }
}

/// The three timed boosts, counted down together once per player-motion tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusEffects {
    speed_boost: EffectTimer,
    invincibility: EffectTimer,
    wall_break: EffectTimer,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, effect: StatusEffect, duration_ms: u64) {
        self.timer_mut(effect).activate(duration_ms);
    }

    pub fn tick(&mut self, step_ms: u64) {
        self.speed_boost.tick(step_ms);
        self.invincibility.tick(step_ms);
        self.wall_break.tick(step_ms);
    }

    pub fn is_active(&self, effect: StatusEffect) -> bool {
        self.timer(effect).is_active()
    }

    pub fn remaining_ms(&self, effect: StatusEffect) -> u64 {
        self.timer(effect).remaining_ms()
    }

    pub fn view(&self) -> EffectsView {
        EffectsView {
            speed_boost: self.speed_boost.is_active(),
            invincibility: self.invincibility.is_active(),
            wall_break: self.wall_break.is_active(),
        }
    }

    fn timer(&self, effect: StatusEffect) -> &EffectTimer {
        match effect {
            StatusEffect::SpeedBoost => &self.speed_boost,
            StatusEffect::Invincibility => &self.invincibility,
            StatusEffect::WallBreak => &self.wall_break,
        }
    }

    fn timer_mut(&mut self, effect: StatusEffect) -> &mut EffectTimer {
        match effect {
            StatusEffect::SpeedBoost => &mut self.speed_boost,
            StatusEffect::Invincibility => &mut self.invincibility,
            StatusEffect::WallBreak => &mut self.wall_break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PLAYER_TICK_MS, SPEED_BOOST_DURATION_MS, WALL_BREAK_DURATION_MS};

    #[test]
    fn countdown_expires_after_expected_tick_count() {
        let mut effects = StatusEffects::new();
        effects.activate(StatusEffect::SpeedBoost, SPEED_BOOST_DURATION_MS);

        let mut ticks = 0;
        while effects.is_active(StatusEffect::SpeedBoost) {
            effects.tick(PLAYER_TICK_MS);
            ticks += 1;
            assert!(ticks < 100, "timer never expired");
        }
        assert_eq!(ticks, 34);
        assert_eq!(effects.remaining_ms(StatusEffect::SpeedBoost), 0);
    }

    #[test]
    fn reactivation_overwrites_instead_of_stacking() {
        let mut effects = StatusEffects::new();
        effects.activate(StatusEffect::WallBreak, WALL_BREAK_DURATION_MS);
        effects.tick(PLAYER_TICK_MS);
        effects.tick(PLAYER_TICK_MS);
        effects.activate(StatusEffect::WallBreak, WALL_BREAK_DURATION_MS);
        assert_eq!(
            effects.remaining_ms(StatusEffect::WallBreak),
            WALL_BREAK_DURATION_MS
        );
    }

    #[test]
    fn effects_tick_independently() {
        let mut effects = StatusEffects::new();
        effects.activate(StatusEffect::Invincibility, 600);
        effects.activate(StatusEffect::WallBreak, 5_000);
        effects.tick(300);
        effects.tick(300);
        assert!(!effects.is_active(StatusEffect::Invincibility));
        assert!(effects.is_active(StatusEffect::WallBreak));
        assert!(!effects.is_active(StatusEffect::SpeedBoost));
        assert_eq!(
            effects.view(),
            EffectsView {
                speed_boost: false,
                invincibility: false,
                wall_break: true,
            }
        );
    }

    #[test]
    fn zero_duration_never_activates() {
        let mut timer = EffectTimer::default();
        timer.activate(0);
        assert!(!timer.is_active());
    }
}
