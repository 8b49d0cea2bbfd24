/// Variety pass — anti-repetition selection over fixed candidate sets.
///
/// Every distinct candidate collection gets its own shuffle bag: no member
/// is picked twice until all members have been picked once.
use rand::Rng;
use rustc_hash::FxHashMap;

/// Registry of shuffle bags keyed by the candidate collection's contents.
#[derive(Debug, Clone)]
pub struct VarietyPass {
    bags: FxHashMap<Vec<String>, Vec<usize>>,
    enabled: bool,
}

impl Default for VarietyPass {
    fn default() -> Self {
        Self {
            bags: FxHashMap::default(),
            enabled: true,
        }
    }
}

impl VarietyPass {
    /// With variety off every pick is a plain uniform choice.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Index of the next option, or `None` for an empty slice.
    pub fn pick_index<S, R>(&mut self, options: &[S], rng: &mut R) -> Option<usize>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if options.is_empty() {
            return None;
        }
        if !self.enabled {
            return Some(rng.gen_range(0..options.len()));
        }

        let key: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let bag = self.bags.entry(key).or_default();
        if bag.is_empty() {
            bag.extend(0..options.len());
        }
        let slot = rng.gen_range(0..bag.len());
        Some(bag.swap_remove(slot))
    }

    pub fn pick<'a, S, R>(&mut self, options: &'a [S], rng: &mut R) -> Option<&'a S>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let index = self.pick_index(options, rng)?;
        options.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rustc_hash::FxHashSet;

    #[test]
    fn empty_options_yield_nothing() {
        let mut vp = VarietyPass::default();
        let mut rng = StdRng::seed_from_u64(1);
        let none: [&str; 0] = [];
        assert!(vp.pick(&none, &mut rng).is_none());
    }

    #[test]
    fn overlapping_sets_are_tracked_separately() {
        let mut vp = VarietyPass::default();
        let mut rng = StdRng::seed_from_u64(5);
        let small = ["a", "b"];
        let large = ["a", "b", "c"];
        let first = *vp.pick(&small, &mut rng).unwrap();
        for _ in 0..3 {
            vp.pick(&large, &mut rng);
        }
        let second = *vp.pick(&small, &mut rng).unwrap();
        assert_ne!(first, second, "small set must finish its cycle independently");
    }

    #[test]
    fn disabled_still_picks_members() {
        let mut vp = VarietyPass::default();
        vp.set_enabled(false);
        let mut rng = StdRng::seed_from_u64(2);
        let opts = ["x", "y", "z"];
        for _ in 0..20 {
            assert!(opts.contains(vp.pick(&opts, &mut rng).unwrap()));
        }
        assert!(vp.bags.is_empty());
    }

    proptest! {
        #[test]
        fn every_option_appears_once_per_cycle(n in 1usize..12, seed in any::<u64>(), cycles in 1usize..4) {
            let options: Vec<String> = (0..n).map(|i| format!("option {}", i)).collect();
            let mut vp = VarietyPass::default();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..cycles {
                let mut seen = FxHashSet::default();
                for _ in 0..n {
                    let picked = vp.pick(&options, &mut rng).unwrap().clone();
                    prop_assert!(seen.insert(picked), "repeat inside a cycle");
                }
                prop_assert_eq!(seen.len(), n);
            }
        }
    }
}
