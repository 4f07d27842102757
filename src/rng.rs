/// Deterministic mulberry32-style generator. The simulation must replay
/// identically for a given seed, so the engine never touches OS entropy.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        out as f64 / 4_294_967_296.0
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = Rng::new(1234);
        let mut b = Rng::new(1234);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn pick_index_stays_in_bounds() {
        let mut rng = Rng::new(7);
        for len in 1..12usize {
            for _ in 0..200 {
                assert!(rng.pick_index(len) < len);
            }
        }
    }

    #[test]
    fn outputs_cover_unit_interval() {
        let mut rng = Rng::new(42);
        let mut low = false;
        let mut high = false;
        for _ in 0..1000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
            low |= value < 0.25;
            high |= value > 0.75;
        }
        assert!(low && high);
    }
}
