use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::selector::IndexSelector;

/// Successors observed after one state of the chain, with their counts.
///
/// Conceptually, this is the set of outgoing edges of a node in a Markov
/// chain, weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate successor occurrences (loading, merging)
/// - Rank successors by frequency for top-k sampling
/// - Pick the next state from the ranked shortlist
///
/// ## Invariants
/// - Successors are kept in first-seen order; ranking relies on it for ties
/// - Each stored count is strictly positive
///
/// Serialized as a plain map `{"successor ": count}`. Entry order is kept on
/// both sides, which a `HashMap` field could not guarantee. When a map repeats
/// a successor, the last count wins, as it does for repeated states.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuccessorSet {
	/// Example: [("holmes ", 42), ("watson ", 3)]
	transitions: Vec<(String, u64)>,
}

impl SuccessorSet {
	/// Creates an empty successor set.
	pub fn new() -> Self {
		Self::default()
	}

	fn with_capacity(capacity: usize) -> Self {
		Self { transitions: Vec::with_capacity(capacity) }
	}

	/// Records `count` occurrences of a transition toward `successor`.
	///
	/// - If the successor already exists, its count is increased, saturating
	///   at `u64::MAX`.
	/// - Otherwise it is appended after every known successor.
	/// - A zero count is ignored: zero-count entries are never materialized.
	pub fn add_transition(&mut self, successor: &str, count: u64) {
		if count == 0 {
			return;
		}
		match self.transitions.iter_mut().find(|(s, _)| s == successor) {
			Some((_, existing)) => *existing = existing.saturating_add(count),
			None => self.transitions.push((successor.to_owned(), count)),
		}
	}

	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates over `(successor, count)` in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(s, c)| (s.as_str(), *c))
	}

	/// Returns every successor ordered by descending count.
	///
	/// The sort is stable, so equal counts keep their first-seen order.
	pub fn ranked(&self) -> Vec<(&str, u64)> {
		let mut ranked: Vec<(&str, u64)> = self.iter().collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1));
		ranked
	}

	/// Returns the `pool_size` most frequent successors, best first.
	pub fn candidates(&self, pool_size: usize) -> Vec<&str> {
		self.ranked()
			.into_iter()
			.take(pool_size)
			.map(|(successor, _)| successor)
			.collect()
	}

	/// Picks the next state among the ranked candidates.
	///
	/// A uniform index in `[0, eligible - 1]` is drawn from `selector`,
	/// regardless of counts. When the index falls past the end of the
	/// candidate pool the most frequent successor (rank 0) is used.
	///
	/// Returns `None` if the set has no successors.
	pub fn pick<S: IndexSelector + ?Sized>(
		&self,
		pool_size: usize,
		eligible: usize,
		selector: &mut S,
	) -> Option<&str> {
		let candidates = self.candidates(pool_size);
		let index = selector.select(eligible.saturating_sub(1));
		candidates.get(index).or_else(|| candidates.first()).copied()
	}

	/// Merges another successor set into this one.
	///
	/// Counts of shared successors are summed; new successors are appended
	/// in the order `other` saw them.
	pub fn merge(&mut self, other: &Self) {
		for (successor, count) in other.iter() {
			self.add_transition(successor, count);
		}
	}

	/// Returns the first successor stored with a zero count, if any.
	pub(crate) fn find_zero_count(&self) -> Option<&str> {
		self.transitions.iter().find(|(_, c)| *c == 0).map(|(s, _)| s.as_str())
	}
}

impl Serialize for SuccessorSet {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.transitions.len()))?;
		for (successor, count) in &self.transitions {
			map.serialize_entry(successor, count)?;
		}
		map.end()
	}
}

struct SuccessorSetVisitor;

impl<'de> Visitor<'de> for SuccessorSetVisitor {
	type Value = SuccessorSet;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of successor states to occurrence counts")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
		let mut set = SuccessorSet::with_capacity(access.size_hint().unwrap_or(0));
		while let Some((successor, count)) = access.next_entry::<String, u64>()? {
			// Zero counts are kept here so that validation can report them.
			// A repeated key keeps its first position and takes the last value.
			match set.transitions.iter_mut().find(|(s, _)| *s == successor) {
				Some((_, existing)) => *existing = count,
				None => set.transitions.push((successor, count)),
			}
		}
		Ok(set)
	}
}

impl<'de> Deserialize<'de> for SuccessorSet {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(SuccessorSetVisitor)
	}
}
