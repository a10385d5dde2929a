/// SplitMix64 stream keyed by a `u32` session seed.
///
/// Every random decision of a session (maze walls, placement, adversary
/// steps, power-up kinds) draws from one of these, so a seed replays the
/// whole board history.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u64,
}

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: u64::from(seed),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        ((z ^ (z >> 31)) >> 32) as u32
    }

    /// True with the given odds.
    pub fn chance(&mut self, odds: f32) -> bool {
        (f64::from(self.next_u32()) / 4_294_967_296.0) < f64::from(odds)
    }

    /// Uniform index in `0..bound`; zero for an empty range.
    pub fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }

    /// -1 or +1.
    pub fn unit_step(&mut self) -> i32 {
        if self.next_u32() & 1 == 0 {
            -1
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_same_sequence() {
        let mut a = Rng::new(77);
        let mut b = Rng::new(77);
        let first: Vec<u32> = (0..100).map(|_| a.next_u32()).collect();
        let second: Vec<u32> = (0..100).map(|_| b.next_u32()).collect();
        assert_eq!(first, second);
        assert_ne!(Rng::new(78).next_u32(), first[0]);
    }

    #[test]
    fn below_stays_in_range_and_reaches_every_value() {
        let mut rng = Rng::new(5);
        for bound in 1..20 {
            let mut seen = vec![false; bound];
            for _ in 0..400 {
                let value = rng.below(bound);
                assert!(value < bound);
                seen[value] = true;
            }
            assert!(seen.iter().all(|hit| *hit), "bound={bound}");
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn chance_respects_the_extremes() {
        let mut rng = Rng::new(3);
        assert!((0..200).all(|_| !rng.chance(0.0)));
        assert!((0..200).all(|_| rng.chance(1.0)));
        let hits = (0..10_000).filter(|_| rng.chance(0.2)).count();
        assert!((1_500..2_500).contains(&hits), "hits={hits}");
    }

    #[test]
    fn unit_step_produces_both_signs() {
        let mut rng = Rng::new(11);
        let steps: Vec<i32> = (0..200).map(|_| rng.unit_step()).collect();
        assert!(steps.iter().all(|step| *step == -1 || *step == 1));
        assert!(steps.contains(&-1));
        assert!(steps.contains(&1));
    }
}
