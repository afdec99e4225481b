use std::fmt;
use std::sync::Arc;

use log::debug;

use super::generation_input::{DeadEndPolicy, GenerationInput};
use super::markov_model::MarkovModel;
use super::selector::{IndexSelector, RandomSelector};
use crate::error::GenerationError;

/// Where a walk ran out of successors under `DeadEndPolicy::Stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadEnd {
	/// State without successors
	pub state: String,
	/// Step at which the lookup failed
	pub step: usize,
}

/// Outcome of one walk.
///
/// `dead_end` is set when the walk stopped before `limit` steps, so a
/// truncated text can be told apart from a complete one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
	pub text: String,
	pub dead_end: Option<DeadEnd>,
}

impl Walk {
	pub fn is_truncated(&self) -> bool {
		self.dead_end.is_some()
	}
}

impl fmt::Display for Walk {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)?;
		if let Some(dead_end) = &self.dead_end {
			write!(
				f,
				" [stopped at step {}: {:?} has no successor]",
				dead_end.step,
				dead_end.state.trim()
			)?;
		}
		Ok(())
	}
}

/// High-level generator walking a shared, read-only Markov model.
///
/// # Responsibilities
/// - Hold a handle on the model (cheap to clone, safe to share across threads)
/// - Precompute the restart state used by `DeadEndPolicy::Restart`
/// - Run single walks and batches of independent walks
#[derive(Debug, Clone)]
pub struct Generator {
	model: Arc<MarkovModel>,
	restart_state: Option<String>,
}

impl Generator {
	/// Creates a generator over `model`.
	///
	/// # Errors
	/// Returns `EmptyModel` if the model has no state.
	pub fn new(model: Arc<MarkovModel>) -> Result<Self, GenerationError> {
		if model.is_empty() {
			return Err(GenerationError::EmptyModel);
		}
		let restart_state = model.top_successor().map(str::to_owned);
		Ok(Self { model, restart_state })
	}

	pub fn model(&self) -> &Arc<MarkovModel> {
		&self.model
	}

	/// Walks the chain once.
	///
	/// # Returns
	/// - `Ok(String)`: the start state followed by every sampled state,
	///   joined by single spaces.
	/// - `Err(GenerationError)`: see `walk`.
	pub fn generate<S: IndexSelector + ?Sized>(
		&self,
		input: &GenerationInput,
		selector: &mut S,
	) -> Result<String, GenerationError> {
		Ok(self.walk(input, selector)?.text)
	}

	/// Walks the chain once, reporting a stop on a dead end.
	pub fn walk<S: IndexSelector + ?Sized>(
		&self,
		input: &GenerationInput,
		selector: &mut S,
	) -> Result<Walk, GenerationError> {
		walk(&self.model, input, self.restart_state.as_deref(), selector)
	}

	/// Runs `runs` independent walks with the same input.
	///
	/// Stops at the first failed walk and returns its error.
	pub fn generate_batch<S: IndexSelector + ?Sized>(
		&self,
		input: &GenerationInput,
		runs: usize,
		selector: &mut S,
	) -> Result<Vec<String>, GenerationError> {
		(0..runs).map(|_| self.generate(input, selector)).collect()
	}

	/// Same as `generate_batch`, keeping each run's dead-end report.
	pub fn walk_batch<S: IndexSelector + ?Sized>(
		&self,
		input: &GenerationInput,
		runs: usize,
		selector: &mut S,
	) -> Result<Vec<Walk>, GenerationError> {
		(0..runs).map(|_| self.walk(input, selector)).collect()
	}
}

/// Labels a batch of walks for display.
///
/// Each text becomes `s_<n>: <text>` followed by a blank-line separator,
/// numbered from 1. A truncated `Walk` carries its stop marker.
pub fn render_batch<T: fmt::Display>(texts: &[T]) -> String {
	texts
		.iter()
		.enumerate()
		.map(|(i, text)| format!("s_{}: {}\n \n", i + 1, text))
		.collect()
}

/// Walks `model` for `limit` steps from `start` using the thread RNG.
///
/// Dead ends fail with `UnknownState`.
pub fn generate(model: &MarkovModel, start: &str, limit: i64) -> Result<String, GenerationError> {
	generate_with(model, start, limit, &mut RandomSelector::new())
}

/// Same as `generate`, drawing ranks from `selector`.
pub fn generate_with<S: IndexSelector + ?Sized>(
	model: &MarkovModel,
	start: &str,
	limit: i64,
	selector: &mut S,
) -> Result<String, GenerationError> {
	let input = GenerationInput::new(start).with_limit(limit)?;
	Ok(walk(model, &input, None, selector)?.text)
}

/// Core sampling loop.
///
/// Per step:
/// - Look up the current state's successors
/// - Keep the `pool_size` most frequent ones, draw a uniform rank among the
///   first `eligible` (rank 0 when the draw lands outside the pool)
/// - Append the chosen state; it becomes the current state
///
/// # Errors
/// - `EmptyModel` before any sampling if the model has no state.
/// - `UnknownState` when the walk reaches a state without successors and the
///   input's policy is `Fail` (or `Restart` with no restart state).
fn walk<'a, S: IndexSelector + ?Sized>(
	model: &'a MarkovModel,
	input: &'a GenerationInput,
	restart_state: Option<&'a str>,
	selector: &mut S,
) -> Result<Walk, GenerationError> {
	if model.is_empty() {
		return Err(GenerationError::EmptyModel);
	}

	let mut text = input.start().to_owned();
	let mut current: &'a str = input.start();

	for step in 0..input.limit() {
		let next = model
			.successors(current)
			.and_then(|successors| successors.pick(input.pool_size(), input.eligible(), selector));

		let next = match (next, input.dead_end, restart_state) {
			(Some(next), _, _) => next,
			(None, DeadEndPolicy::Stop, _) => {
				debug!("Dead end at {current:?} (step {step}), stopping");
				return Ok(Walk {
					text,
					dead_end: Some(DeadEnd { state: current.to_owned(), step }),
				});
			}
			(None, DeadEndPolicy::Restart, Some(restart)) => {
				debug!("Dead end at {current:?} (step {step}), restarting from {restart:?}");
				restart
			}
			(None, _, _) => {
				debug!("Dead end at {current:?} (step {step})");
				return Err(GenerationError::UnknownState {
					state: current.to_owned(),
					step,
					partial: text,
				});
			}
		};

		text.push(' ');
		text.push_str(next);
		current = next;
	}

	Ok(Walk { text, dead_end: None })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::selector::{FixedSelector, SequenceSelector};

	fn fixture() -> MarkovModel {
		MarkovModel::from_json_str(r#"{"a ": {"b ": 5, "c ": 1}, "b ": {"a ": 3}}"#).unwrap()
	}

	#[test]
	fn reference_walk_with_rank_zero() {
		let text = generate_with(&fixture(), "a ", 2, &mut FixedSelector(0)).unwrap();
		assert_eq!(text, "a  b  a ");
	}

	#[test]
	fn zero_limit_returns_start() {
		assert_eq!(generate_with(&fixture(), "a ", 0, &mut FixedSelector(3)).unwrap(), "a ");
		// No lookup happens without a step
		assert_eq!(generate_with(&fixture(), "zzz ", 0, &mut FixedSelector(0)).unwrap(), "zzz ");
	}

	#[test]
	fn negative_limit_is_rejected_before_sampling() {
		assert_eq!(
			generate_with(&fixture(), "a ", -3, &mut FixedSelector(0)),
			Err(GenerationError::InvalidLimit(-3))
		);
	}

	#[test]
	fn empty_model_is_rejected() {
		let model = MarkovModel::new();
		assert_eq!(
			generate_with(&model, "a ", 1, &mut FixedSelector(0)),
			Err(GenerationError::EmptyModel)
		);
		assert!(matches!(Generator::new(Arc::new(model)), Err(GenerationError::EmptyModel)));
	}

	#[test]
	fn unknown_start_fails_at_step_zero() {
		let err = generate_with(&fixture(), "x ", 4, &mut FixedSelector(0)).unwrap_err();
		assert!(err.is_unknown_start());
		assert_eq!(
			err,
			GenerationError::UnknownState { state: "x ".to_owned(), step: 0, partial: "x ".to_owned() }
		);
	}

	#[test]
	fn mid_walk_dead_end_carries_partial_text() {
		// rank 1 from "a " is "c ", which has no successors
		let err = generate_with(&fixture(), "a ", 5, &mut SequenceSelector::new(vec![0, 0, 1])).unwrap_err();
		assert_eq!(
			err,
			GenerationError::UnknownState {
				state: "c ".to_owned(),
				step: 3,
				partial: "a  b  a  c ".to_owned(),
			}
		);
		assert!(!err.is_unknown_start());
	}

	#[test]
	fn stop_policy_returns_partial_text() {
		let generator = Generator::new(Arc::new(fixture())).unwrap();
		let input = GenerationInput::new("a ")
			.with_limit(5)
			.unwrap()
			.with_dead_end(DeadEndPolicy::Stop);
		let text = generator.generate(&input, &mut SequenceSelector::new(vec![1])).unwrap();
		assert_eq!(text, "a  c ");
	}

	#[test]
	fn stopped_walk_reports_where_it_stopped() {
		let generator = Generator::new(Arc::new(fixture())).unwrap();
		let input = GenerationInput::new("a ")
			.with_limit(5)
			.unwrap()
			.with_dead_end(DeadEndPolicy::Stop);
		let walk = generator.walk(&input, &mut SequenceSelector::new(vec![1])).unwrap();
		assert!(walk.is_truncated());
		assert_eq!(walk.dead_end, Some(DeadEnd { state: "c ".to_owned(), step: 1 }));
		assert_eq!(walk.to_string(), "a  c  [stopped at step 1: \"c\" has no successor]");

		let complete = generator.walk(&input.clone().with_limit(2).unwrap(), &mut FixedSelector(0)).unwrap();
		assert!(!complete.is_truncated());
		assert_eq!(complete.to_string(), "a  b  a ");
	}

	#[test]
	fn restart_policy_keeps_one_state_per_step() {
		let generator = Generator::new(Arc::new(fixture())).unwrap();
		let input = GenerationInput::new("a ")
			.with_limit(4)
			.unwrap()
			.with_dead_end(DeadEndPolicy::Restart);
		// "a " -> "c " (dead end) -> restart at "b " -> "a " -> "c "
		let text = generator.generate(&input, &mut FixedSelector(1)).unwrap();
		assert_eq!(text, "a  c  b  a  c ");
	}

	#[test]
	fn restart_without_candidate_fails() {
		let model = MarkovModel::from_json_str(r#"{"a ": {"z ": 1}}"#).unwrap();
		let generator = Generator::new(Arc::new(model)).unwrap();
		let input = GenerationInput::new("a ")
			.with_limit(3)
			.unwrap()
			.with_dead_end(DeadEndPolicy::Restart);
		let err = generator.generate(&input, &mut FixedSelector(0)).unwrap_err();
		assert!(matches!(err, GenerationError::UnknownState { step: 1, .. }));
	}

	#[test]
	fn custom_candidate_pool_limits_ranks() {
		let model = MarkovModel::from_json_str(
			r#"{"s ": {"a ": 5, "b ": 4, "c ": 3}, "a ": {"s ": 1}, "b ": {"s ": 1}, "c ": {"s ": 1}}"#,
		)
		.unwrap();
		let generator = Generator::new(Arc::new(model)).unwrap();
		let mut input = GenerationInput::new("s ").with_limit(1).unwrap();
		input.set_candidate_pool(2, 2).unwrap();
		// rank 2 is outside a pool of 2: the selector is clamped to 1
		assert_eq!(generator.generate(&input, &mut FixedSelector(2)).unwrap(), "s  b ");
	}

	#[test]
	fn batch_runs_independent_walks() {
		let generator = Generator::new(Arc::new(fixture())).unwrap();
		let input = GenerationInput::new("b ").with_limit(1).unwrap();
		let texts = generator.generate_batch(&input, 3, &mut FixedSelector(0)).unwrap();
		assert_eq!(texts, vec!["b  a ", "b  a ", "b  a "]);
		assert!(generator.generate_batch(&input, 0, &mut FixedSelector(0)).unwrap().is_empty());
	}

	#[test]
	fn batch_rendering_labels_each_run() {
		assert_eq!(render_batch(&["x y", "z"]), "s_1: x y\n \ns_2: z\n \n");
		assert_eq!(render_batch::<String>(&[]), "");

		let walks = vec![
			Walk { text: "b  a ".to_owned(), dead_end: None },
			Walk {
				text: "c ".to_owned(),
				dead_end: Some(DeadEnd { state: "c ".to_owned(), step: 0 }),
			},
		];
		assert_eq!(
			render_batch(&walks),
			"s_1: b  a \n \ns_2: c  [stopped at step 0: \"c\" has no successor]\n \n"
		);
	}
}
