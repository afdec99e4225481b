use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::state::SuccessorSet;
use crate::error::ModelError;
use crate::io::{cache_path, model_name, modified_after};

/// First-order Markov model over word phrases.
///
/// This struct manages:
/// - `states`: a map from a normalized phrase to its observed successors.
/// - `model_names`: names of the model files merged into this instance.
///
/// The model is read-only during generation. Share it between concurrent
/// walks behind an `Arc`; nothing in the generator mutates it.
///
/// # Invariants
/// - No stored successor count is zero
/// - No state is stored with an empty successor set
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkovModel {
	states: HashMap<String, SuccessorSet>,
	model_names: Vec<String>,
}

impl MarkovModel {
	/// Returns an empty model, useful as a merge target.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a model from a JSON file, going through a binary cache.
	///
	/// - `filepath` is the JSON model (`{"state ": {"successor ": count}}`).
	/// - If `<name>.bin` exists next to it and is not older than the JSON,
	///   the cache is loaded instead. A stale cache is rebuilt.
	/// - Otherwise the JSON is parsed, validated, and the cache is written
	///   with `postcard` for the next start.
	///
	/// A corrupt cache falls back to the JSON source; a cache that cannot be
	/// written (read-only data directory) is only reported.
	///
	/// # Errors
	/// Returns an error if the JSON cannot be read or parsed, or if the
	/// model breaks an invariant (empty, zero counts).
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, ModelError> {
		let filepath = filepath.as_ref();
		let binary_data_path = cache_path(filepath);
		let mut model = None;
		if binary_data_path.exists() {
			match modified_after(filepath, &binary_data_path) {
				Ok(false) => match Self::read_cache(&binary_data_path) {
					Ok(cached) => {
						debug!("Loaded model cache {}", binary_data_path.display());
						model = Some(cached);
					}
					Err(e) => warn!("Ignoring model cache {}: {e}", binary_data_path.display()),
				},
				Ok(true) => warn!(
					"Model cache {} is older than {}, rebuilding",
					binary_data_path.display(),
					filepath.display()
				),
				Err(e) => warn!("Ignoring model cache {}: {e}", binary_data_path.display()),
			}
		}

		let mut model = match model {
			Some(m) => m,
			None => {
				let m = Self::from_json_str(&std::fs::read_to_string(filepath)?)?;
				match postcard::to_stdvec(&m) {
					Ok(bytes) => match std::fs::write(&binary_data_path, bytes) {
						Ok(()) => info!("Wrote model cache {}", binary_data_path.display()),
						Err(e) => warn!("Could not write model cache {}: {e}", binary_data_path.display()),
					},
					Err(e) => warn!("Could not encode model cache: {e}"),
				}
				m
			}
		};

		model.model_names = vec![model_name(filepath)?];
		info!(
			"Loaded model {:?} ({} states)",
			model.model_names[0],
			model.len()
		);
		Ok(model)
	}

	fn read_cache(path: &Path) -> Result<Self, ModelError> {
		let bytes = std::fs::read(path)?;
		let model: Self = postcard::from_bytes(&bytes)?;
		model.validate()?;
		Ok(model)
	}

	/// Parses a model from JSON text.
	///
	/// Accepts the plain mapping and the double-encoded form where the whole
	/// mapping is itself stored as a JSON string. Empty successor sets are
	/// dropped, which turns those states into dead ends.
	///
	/// # Errors
	/// Returns `Json` on malformed input, `Empty` or `ZeroCount` on invalid
	/// content.
	pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
		let states: HashMap<String, SuccessorSet> = if text.trim_start().starts_with('"') {
			let inner: String = serde_json::from_str(text)?;
			serde_json::from_str(&inner)?
		} else {
			serde_json::from_str(text)?
		};

		let model = Self::from_states(states);
		model.validate()?;
		Ok(model)
	}

	/// Builds a model from an already decoded state map.
	pub fn from_states(states: HashMap<String, SuccessorSet>) -> Self {
		let before = states.len();
		let states: HashMap<String, SuccessorSet> = states
			.into_iter()
			.filter(|(_, successors)| !successors.is_empty())
			.collect();
		if states.len() < before {
			debug!("Dropped {} states without successors", before - states.len());
		}
		Self { states, model_names: Vec::new() }
	}

	/// Checks the invariants a loaded model must satisfy.
	///
	/// # Errors
	/// - `Empty` if the model has no state.
	/// - `ZeroCount` for the first zero-count transition found.
	pub fn validate(&self) -> Result<(), ModelError> {
		if self.states.is_empty() {
			return Err(ModelError::Empty);
		}
		for (state, successors) in &self.states {
			if let Some(successor) = successors.find_zero_count() {
				return Err(ModelError::ZeroCount {
					state: state.clone(),
					successor: successor.to_owned(),
				});
			}
		}
		Ok(())
	}

	/// Records `count` transitions from `state` to `successor`.
	///
	/// A zero count is ignored.
	pub fn add_transition(&mut self, state: &str, successor: &str, count: u64) {
		if count == 0 {
			return;
		}
		self.states
			.entry(state.to_owned())
			.or_default()
			.add_transition(successor, count);
	}

	/// Returns the successors of `state`, or `None` if the state is unknown.
	pub fn successors(&self, state: &str) -> Option<&SuccessorSet> {
		self.states.get(state)
	}

	pub fn contains(&self, state: &str) -> bool {
		self.states.contains_key(state)
	}

	/// Number of states with at least one successor.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Iterates over every state phrase, in no particular order.
	pub fn states(&self) -> impl Iterator<Item = &str> {
		self.states.keys().map(String::as_str)
	}

	/// Returns the names of the model files merged into this instance.
	pub fn get_model_names(&self) -> &[String] {
		&self.model_names
	}

	/// Returns the most frequent successor across the whole model that is
	/// itself a known state.
	///
	/// Totals are summed over every state. States are visited in sorted
	/// order so that ties resolve the same way on every run.
	pub fn top_successor(&self) -> Option<&str> {
		let mut keys: Vec<&String> = self.states.keys().collect();
		keys.sort();

		let mut totals: Vec<(&str, u64)> = Vec::new();
		let mut positions: HashMap<&str, usize> = HashMap::new();
		for key in keys {
			for (successor, count) in self.states[key].iter() {
				match positions.get(successor) {
					Some(&i) => totals[i].1 = totals[i].1.saturating_add(count),
					None => {
						positions.insert(successor, totals.len());
						totals.push((successor, count));
					}
				}
			}
		}

		totals.sort_by(|a, b| b.1.cmp(&a.1));
		totals
			.into_iter()
			.map(|(successor, _)| successor)
			.find(|successor| self.states.contains_key(*successor))
	}

	/// Merges another model into this one.
	///
	/// # Behavior
	/// - Successor sets of shared states are merged (counts summed, new
	///   successors appended).
	/// - States only present in `other` are cloned.
	/// - Model names are appended.
	///
	/// # Errors
	/// Returns `AlreadyLoaded` if a model name of `other` is already merged.
	pub fn merge(&mut self, other: &Self) -> Result<(), ModelError> {
		if let Some(name) = other.model_names.iter().find(|n| self.model_names.contains(n)) {
			return Err(ModelError::AlreadyLoaded(name.clone()));
		}

		for (state, successors) in &other.states {
			if let Some(existing) = self.states.get_mut(state) {
				existing.merge(successors);
			} else {
				self.states.insert(state.clone(), successors.clone());
			}
		}

		self.model_names.extend(other.model_names.iter().cloned());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FIXTURE: &str = r#"{"a ": {"b ": 5, "c ": 1}, "b ": {"a ": 3}}"#;

	#[test]
	fn parses_plain_json() {
		let model = MarkovModel::from_json_str(FIXTURE).unwrap();
		assert_eq!(model.len(), 2);
		assert!(model.contains("a "));
		assert!(!model.contains("c "));
		assert_eq!(model.successors("a ").unwrap().candidates(10), vec!["b ", "c "]);
	}

	#[test]
	fn parses_double_encoded_json() {
		let encoded = serde_json::to_string(FIXTURE).unwrap();
		let model = MarkovModel::from_json_str(&encoded).unwrap();
		assert_eq!(model, MarkovModel::from_json_str(FIXTURE).unwrap());
	}

	#[test]
	fn rejects_empty_model() {
		assert!(matches!(MarkovModel::from_json_str("{}"), Err(ModelError::Empty)));
		assert!(matches!(
			MarkovModel::from_json_str(r#"{"a ": {}}"#),
			Err(ModelError::Empty)
		));
	}

	#[test]
	fn rejects_zero_counts() {
		let err = MarkovModel::from_json_str(r#"{"a ": {"b ": 0}}"#).unwrap_err();
		assert!(matches!(err, ModelError::ZeroCount { ref state, ref successor } if state == "a " && successor == "b "));
	}

	#[test]
	fn rejects_malformed_json() {
		assert!(matches!(MarkovModel::from_json_str("[1, 2]"), Err(ModelError::Json(_))));
		assert!(matches!(
			MarkovModel::from_json_str(r#"{"a ": {"b ": -1}}"#),
			Err(ModelError::Json(_))
		));
	}

	#[test]
	fn drops_states_without_successors() {
		let model = MarkovModel::from_json_str(r#"{"a ": {"b ": 1}, "b ": {}}"#).unwrap();
		assert!(!model.contains("b "));
	}

	#[test]
	fn top_successor_prefers_known_states() {
		// "c " has the highest total but is not a state
		let model = MarkovModel::from_json_str(
			r#"{"a ": {"c ": 9, "b ": 2}, "b ": {"c ": 9, "a ": 1}}"#,
		)
		.unwrap();
		assert_eq!(model.top_successor(), Some("b "));
	}

	#[test]
	fn top_successor_none_without_known_successor() {
		let model = MarkovModel::from_json_str(r#"{"a ": {"z ": 1}}"#).unwrap();
		assert_eq!(model.top_successor(), None);
	}

	#[test]
	fn top_successor_totals_saturate() {
		let model = MarkovModel::from_json_str(
			r#"{"a ": {"b ": 18446744073709551615}, "b ": {"b ": 1, "a ": 2}}"#,
		)
		.unwrap();
		assert_eq!(model.top_successor(), Some("b "));
	}

	#[test]
	fn repeated_states_take_last_entry() {
		let model = MarkovModel::from_json_str(r#"{"a ": {"b ": 1}, "b ": {"a ": 1}, "a ": {"c ": 2, "b ": 4}}"#)
			.unwrap();
		assert_eq!(
			model.successors("a ").unwrap().iter().collect::<Vec<_>>(),
			vec![("c ", 2), ("b ", 4)]
		);
	}

	#[test]
	fn merge_saturates_counts() {
		let mut left = MarkovModel::from_json_str(r#"{"a ": {"b ": 18446744073709551615}}"#).unwrap();
		left.model_names = vec!["left".to_owned()];
		let mut right = MarkovModel::from_json_str(r#"{"a ": {"b ": 1}}"#).unwrap();
		right.model_names = vec!["right".to_owned()];

		left.merge(&right).unwrap();
		assert_eq!(left.successors("a ").unwrap().iter().collect::<Vec<_>>(), vec![("b ", u64::MAX)]);
	}

	#[test]
	fn merge_sums_counts_and_names() {
		let mut left = MarkovModel::from_json_str(FIXTURE).unwrap();
		left.model_names = vec!["left".to_owned()];
		let mut right = MarkovModel::from_json_str(r#"{"a ": {"d ": 2, "c ": 1}, "d ": {"a ": 1}}"#).unwrap();
		right.model_names = vec!["right".to_owned()];

		left.merge(&right).unwrap();
		assert_eq!(left.len(), 3);
		assert_eq!(
			left.successors("a ").unwrap().iter().collect::<Vec<_>>(),
			vec![("b ", 5), ("c ", 2), ("d ", 2)]
		);
		assert_eq!(left.get_model_names(), ["left".to_owned(), "right".to_owned()]);

		assert!(matches!(left.merge(&right), Err(ModelError::AlreadyLoaded(n)) if n == "right"));
	}

	#[test]
	fn add_transition_ignores_zero() {
		let mut model = MarkovModel::new();
		model.add_transition("a ", "b ", 0);
		assert!(model.is_empty());
		model.add_transition("a ", "b ", 2);
		assert_eq!(model.successors("a ").unwrap().len(), 1);
	}

	#[test]
	fn postcard_round_trip_keeps_order() {
		let model = MarkovModel::from_json_str(r#"{"a ": {"z ": 1, "y ": 1, "x ": 1}}"#).unwrap();
		let bytes = postcard::to_stdvec(&model).unwrap();
		let decoded: MarkovModel = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(decoded.successors("a ").unwrap().candidates(10), vec!["z ", "y ", "x "]);
	}
}
