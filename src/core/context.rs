/// Narrative context — the seeded RNG stream and anti-repetition registry
/// threaded through every rule, pass, and render call.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::variety::VarietyPass;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone)]
pub struct NarrativeContext {
    seed: u64,
    rng: StdRng,
    variety: VarietyPass,
}

impl NarrativeContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            variety: VarietyPass::default(),
        }
    }

    /// A context seeded from OS entropy. The seed is kept so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn variety(&self) -> &VarietyPass {
        &self.variety
    }

    pub fn variety_mut(&mut self) -> &mut VarietyPass {
        &mut self.variety
    }

    /// True with `percent`% probability (a d100 roll at or under `percent`).
    pub fn chance(&mut self, percent: u32) -> bool {
        self.rng.gen_range(1..=100) <= percent
    }

    /// Uniform choice; `None` when empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Uniform choice from a word table; empty string when the table is empty.
    pub fn choose_str(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Removes and returns a random element matching `filter`.
    pub fn extract<T>(&mut self, items: &mut Vec<T>, filter: impl Fn(&T) -> bool) -> Option<T> {
        let matching: Vec<usize> = (0..items.len()).filter(|&i| filter(&items[i])).collect();
        let index = *matching.choose(&mut self.rng)?;
        Some(items.remove(index))
    }

    /// Inclusive integer range.
    pub fn range(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    /// Anti-repetition choice: cycles through `options` before repeating.
    pub fn pick_varied<'a, S: AsRef<str>>(&mut self, options: &'a [S]) -> Option<&'a S> {
        self.variety.pick(options, &mut self.rng)
    }

    /// A few words of random lowercase letters.
    pub fn gibberish(&mut self) -> String {
        let words = self.range(3, 9);
        let mut out = Vec::with_capacity(words);
        for _ in 0..words {
            let len = self.range(3, 8);
            let word: String = (0..len)
                .map(|_| LETTERS[self.rng.gen_range(0..LETTERS.len())] as char)
                .collect();
            out.push(word);
        }
        out.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = NarrativeContext::new(42);
        let mut b = NarrativeContext::new(42);
        let xs: Vec<bool> = (0..50).map(|_| a.chance(50)).collect();
        let ys: Vec<bool> = (0..50).map(|_| b.chance(50)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn chance_bounds() {
        let mut ctx = NarrativeContext::new(7);
        assert!((0..100).all(|_| ctx.chance(100)));
        assert!((0..100).all(|_| !ctx.chance(0)));
    }

    #[test]
    fn extract_removes_matching_element() {
        let mut ctx = NarrativeContext::new(1);
        let mut items = vec![1, 2, 3, 4];
        let even = ctx.extract(&mut items, |n| n % 2 == 0).unwrap();
        assert!(even == 2 || even == 4);
        assert_eq!(items.len(), 3);
        assert!(!items.contains(&even));
        assert!(ctx.extract(&mut items, |n| *n > 10).is_none());
    }

    #[test]
    fn gibberish_is_lowercase_words() {
        let mut ctx = NarrativeContext::new(11);
        let g = ctx.gibberish();
        let words: Vec<&str> = g.split(' ').collect();
        assert!((3..=9).contains(&words.len()));
        assert!(g.chars().all(|c| c == ' ' || c.is_ascii_lowercase()));
    }
}
