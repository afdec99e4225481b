use thiserror::Error;

/// Failures raised while walking the chain.
///
/// `UnknownState` is the expected, frequent case: sparse corpora leave many
/// phrases without recorded successors. It carries the text produced before
/// the walk got stuck so that callers can report a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
	#[error("state {state:?} is not present in the model (step {step})")]
	UnknownState {
		state: String,
		step: usize,
		partial: String,
	},

	#[error("the model contains no states")]
	EmptyModel,

	#[error("step limit must be >= 0, got {0}")]
	InvalidLimit(i64),

	#[error("invalid candidate pool: {eligible} eligible out of {pool} (need 1 <= eligible <= pool)")]
	InvalidCandidatePool { pool: usize, eligible: usize },

	#[error("unknown dead-end policy {0:?} (expected fail, stop or restart)")]
	InvalidDeadEndPolicy(String),
}

impl GenerationError {
	/// True when the walk could not even leave its starting phrase.
	pub fn is_unknown_start(&self) -> bool {
		matches!(self, GenerationError::UnknownState { step: 0, .. })
	}
}

/// Failures raised while loading, caching or merging a model.
#[derive(Debug, Error)]
pub enum ModelError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed model JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("binary model cache error: {0}")]
	Cache(#[from] postcard::Error),

	#[error("model contains no states")]
	Empty,

	#[error("zero occurrence count for {state:?} -> {successor:?}")]
	ZeroCount { state: String, successor: String },

	#[error("model {0:?} already loaded")]
	AlreadyLoaded(String),
}

/// Failures raised by the corpus lister and reader.
#[derive(Debug, Error)]
pub enum CorpusError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("invalid chapter name {0:?}")]
	InvalidName(String),

	#[error("chapter {0:?} not found")]
	NotFound(String),
}
