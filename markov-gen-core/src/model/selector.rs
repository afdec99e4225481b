use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of the uniform rank drawn at each step of a walk.
///
/// Injected into the generator so that callers choose between real
/// randomness, a reproducible seeded stream, or a scripted sequence.
pub trait IndexSelector {
	/// Returns an index in `[0, max]` (inclusive).
	fn select(&mut self, max: usize) -> usize;
}

/// Uniform selector backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSelector<R: Rng = ThreadRng> {
	rng: R,
}

impl RandomSelector<ThreadRng> {
	/// Uses the thread-local generator.
	pub fn new() -> Self {
		Self { rng: rand::rng() }
	}
}

impl Default for RandomSelector<ThreadRng> {
	fn default() -> Self {
		Self::new()
	}
}

impl RandomSelector<StdRng> {
	/// Reproducible stream: the same seed always yields the same ranks.
	pub fn seeded(seed: u64) -> Self {
		Self { rng: StdRng::seed_from_u64(seed) }
	}
}

impl<R: Rng> RandomSelector<R> {
	pub fn from_rng(rng: R) -> Self {
		Self { rng }
	}
}

impl<R: Rng> IndexSelector for RandomSelector<R> {
	fn select(&mut self, max: usize) -> usize {
		self.rng.random_range(0..=max)
	}
}

/// Always returns the same rank (clamped to `max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSelector(pub usize);

impl IndexSelector for FixedSelector {
	fn select(&mut self, max: usize) -> usize {
		self.0.min(max)
	}
}

/// Replays a scripted list of ranks, cycling when exhausted.
///
/// Each value is clamped to `max`. An empty script always yields 0.
#[derive(Debug, Clone)]
pub struct SequenceSelector {
	indices: Vec<usize>,
	cursor: usize,
}

impl SequenceSelector {
	pub fn new(indices: Vec<usize>) -> Self {
		Self { indices, cursor: 0 }
	}
}

impl IndexSelector for SequenceSelector {
	fn select(&mut self, max: usize) -> usize {
		if self.indices.is_empty() {
			return 0;
		}
		let index = self.indices[self.cursor % self.indices.len()];
		self.cursor += 1;
		index.min(max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn random_selector_stays_in_range() {
		let mut selector = RandomSelector::new();
		for _ in 0..1000 {
			assert!(selector.select(5) <= 5);
		}
	}

	#[test]
	fn random_selector_covers_every_rank() {
		let mut selector = RandomSelector::seeded(7);
		let mut seen = [false; 6];
		for _ in 0..1000 {
			seen[selector.select(5)] = true;
		}
		assert!(seen.iter().all(|s| *s));
	}

	#[test]
	fn seeded_selectors_agree() {
		let mut a = RandomSelector::seeded(42);
		let mut b = RandomSelector::seeded(42);
		let left: Vec<usize> = (0..32).map(|_| a.select(5)).collect();
		let right: Vec<usize> = (0..32).map(|_| b.select(5)).collect();
		assert_eq!(left, right);
	}

	#[test]
	fn sequence_selector_cycles_and_clamps() {
		let mut selector = SequenceSelector::new(vec![1, 9]);
		assert_eq!(selector.select(5), 1);
		assert_eq!(selector.select(5), 5);
		assert_eq!(selector.select(5), 1);
		assert_eq!(SequenceSelector::new(Vec::new()).select(5), 0);
	}
}
