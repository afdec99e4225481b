use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use log::info;

use markov_gen_core::corpus::Corpus;
use markov_gen_core::io::{is_plain_file_name, list_files};
use markov_gen_core::{Generator, MarkovModel};

use crate::config::ServerConfig;
use crate::error::ServiceError;

/// Extension of the model files served from the data directory.
pub const MODEL_EXTENSION: &str = "json";

/// Limits and defaults applied to generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
	pub default_limit: i64,
	pub default_runs: usize,
	pub max_limit: usize,
	pub max_runs: usize,
}

/// State shared by every worker.
///
/// The current model is immutable once loaded. Handlers clone the
/// `Generator` handle under a short read lock and walk without holding it;
/// a reload builds the new model first, then swaps the handle, so in-flight
/// walks finish on the model they started with.
pub struct SharedData {
	generator: RwLock<Option<Generator>>,
	data_dir: PathBuf,
	corpus: Corpus,
	pub limits: RequestLimits,
}

impl SharedData {
	pub fn new(config: &ServerConfig) -> Self {
		Self {
			generator: RwLock::new(None),
			data_dir: config.data_dir.clone(),
			corpus: Corpus::new(&config.corpus_dir),
			limits: RequestLimits {
				default_limit: config.default_limit,
				default_runs: config.default_runs,
				max_limit: config.max_limit,
				max_runs: config.max_runs,
			},
		}
	}

	/// Returns a handle on the current generator, if a model is loaded.
	pub fn generator(&self) -> Result<Option<Generator>, ServiceError> {
		let guard = self.generator.read().map_err(|_| ServiceError::Lock)?;
		Ok(guard.clone())
	}

	/// Names of the model files merged into the current model.
	pub fn loaded_model_names(&self) -> Result<Vec<String>, ServiceError> {
		Ok(self
			.generator()?
			.map(|g| g.model().get_model_names().to_vec())
			.unwrap_or_default())
	}

	/// Names (without extension) of the models available in the data directory.
	pub fn available_models(&self) -> Result<Vec<String>, ServiceError> {
		let suffix = format!(".{MODEL_EXTENSION}");
		Ok(list_files(&self.data_dir, Some(MODEL_EXTENSION))?
			.into_iter()
			.map(|file| file.trim_end_matches(&suffix).to_owned())
			.collect())
	}

	pub fn corpus(&self) -> &Corpus {
		&self.corpus
	}

	/// Replaces the current model with the merge of the named models.
	///
	/// # Errors
	/// - `BadRequest` if no name is given or a name is not a plain file name.
	/// - `Model` if a model fails to load or is named twice.
	///
	/// On error the current model is left untouched.
	pub fn load_models(&self, names: &[&str]) -> Result<(), ServiceError> {
		if names.is_empty() {
			return Err(ServiceError::BadRequest("Missing or empty model name".to_owned()));
		}

		let mut merged = MarkovModel::new();
		for name in names {
			if !is_plain_file_name(name) {
				return Err(ServiceError::BadRequest(format!("Invalid model name {name:?}")));
			}
			let path = self.data_dir.join(format!("{name}.{MODEL_EXTENSION}"));
			let model_error = |source| ServiceError::Model { name: (*name).to_owned(), source };
			let partial = MarkovModel::load(&path).map_err(model_error)?;
			merged.merge(&partial).map_err(model_error)?;
		}

		let generator = Generator::new(Arc::new(merged))?;
		info!(
			"Serving model {:?} ({} states)",
			generator.model().get_model_names(),
			generator.model().len()
		);

		let mut guard = self.generator.write().map_err(|_| ServiceError::Lock)?;
		*guard = Some(generator);
		Ok(())
	}
}
