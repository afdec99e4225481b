use std::fmt;
use std::str::FromStr;

use crate::error::GenerationError;

/// Number of top-ranked successors kept as candidates.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Number of leading candidates eligible for the uniform draw (ranks 0-5).
pub const DEFAULT_ELIGIBLE: usize = 6;

/// Step budget used when the caller does not choose one.
pub const DEFAULT_LIMIT: usize = 50;

/// What a walk does when its current state has no recorded successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadEndPolicy {
	/// Report `GenerationError::UnknownState` with the partial text.
	#[default]
	Fail,
	/// Return the text produced so far as a successful result.
	Stop,
	/// Substitute the model's most frequent successor and keep walking.
	Restart,
}

impl FromStr for DeadEndPolicy {
	type Err = GenerationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"fail" => Ok(DeadEndPolicy::Fail),
			"stop" => Ok(DeadEndPolicy::Stop),
			"restart" => Ok(DeadEndPolicy::Restart),
			_ => Err(GenerationError::InvalidDeadEndPolicy(s.to_owned())),
		}
	}
}

impl fmt::Display for DeadEndPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DeadEndPolicy::Fail => "fail",
			DeadEndPolicy::Stop => "stop",
			DeadEndPolicy::Restart => "restart",
		};
		f.write_str(name)
	}
}

/// Normalizes free-form user words into a chain state.
///
/// Lowercases, trims, then appends the single trailing space that every
/// state of the model carries: `"  Dear Holmes"` → `"dear holmes "`.
pub fn normalize_start(words: &str) -> String {
	let mut state = words.to_lowercase().trim().to_owned();
	state.push(' ');
	state
}

/// Parameters of a single walk.
///
/// # Responsibilities
/// - Hold the start state and the step budget
/// - Hold the sampling window (candidate pool size and eligible ranks)
/// - Hold the dead-end policy
///
/// # Invariants
/// - `1 <= eligible <= pool_size`
/// - The limit is never negative; setters reject negative values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInput {
	start: String,
	limit: usize,
	pool_size: usize,
	eligible: usize,

	/// Behavior when the walk reaches a state absent from the model.
	pub dead_end: DeadEndPolicy,
}

impl GenerationInput {
	/// Creates an input starting from `start` verbatim, with default settings.
	pub fn new(start: impl Into<String>) -> Self {
		Self {
			start: start.into(),
			limit: DEFAULT_LIMIT,
			pool_size: DEFAULT_POOL_SIZE,
			eligible: DEFAULT_ELIGIBLE,
			dead_end: DeadEndPolicy::default(),
		}
	}

	/// Creates an input from user words, normalized with `normalize_start`.
	pub fn from_words(words: &str) -> Self {
		Self::new(normalize_start(words))
	}

	pub fn start(&self) -> &str {
		&self.start
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	pub fn pool_size(&self) -> usize {
		self.pool_size
	}

	pub fn eligible(&self) -> usize {
		self.eligible
	}

	/// Sets the number of successor-sampling steps.
	///
	/// # Errors
	/// Returns `InvalidLimit` if `limit` is negative.
	pub fn set_limit(&mut self, limit: i64) -> Result<(), GenerationError> {
		self.limit = usize::try_from(limit).map_err(|_| GenerationError::InvalidLimit(limit))?;
		Ok(())
	}

	/// Builder form of `set_limit`.
	pub fn with_limit(mut self, limit: i64) -> Result<Self, GenerationError> {
		self.set_limit(limit)?;
		Ok(self)
	}

	/// Builder form of the `dead_end` field.
	pub fn with_dead_end(mut self, policy: DeadEndPolicy) -> Self {
		self.dead_end = policy;
		self
	}

	/// Sets the sampling window.
	///
	/// # Parameters
	/// - `pool_size`: how many top-ranked successors form the candidate pool.
	/// - `eligible`: how many leading candidates the uniform draw covers.
	///
	/// # Errors
	/// Returns `InvalidCandidatePool` unless `1 <= eligible <= pool_size`.
	pub fn set_candidate_pool(&mut self, pool_size: usize, eligible: usize) -> Result<(), GenerationError> {
		if eligible == 0 || eligible > pool_size {
			return Err(GenerationError::InvalidCandidatePool { pool: pool_size, eligible });
		}
		self.pool_size = pool_size;
		self.eligible = eligible;
		Ok(())
	}
}
