use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use markov_gen_core::{CorpusError, GenerationError, ModelError};

/// Errors returned by the HTTP handlers, rendered as plain text.
#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("No model loaded. Load one with PUT /v1/load_models?names=...")]
	NoModel,

	#[error(
		"The words {0:?} are not present in the model. \
		Try a different word combination after writing two full words."
	)]
	UnknownStart(String),

	#[error("Generation reached {state:?}, which has no known successor. Partial text: {partial}")]
	DeadEnd { state: String, partial: String },

	#[error("{0}")]
	BadRequest(String),

	#[error("Model {name:?}: {source}")]
	Model { name: String, source: ModelError },

	#[error("{0}")]
	Corpus(#[from] CorpusError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Model lock failed")]
	Lock,
}

impl From<GenerationError> for ServiceError {
	fn from(e: GenerationError) -> Self {
		match e {
			GenerationError::UnknownState { state, step: 0, .. } => {
				ServiceError::UnknownStart(state.trim().to_owned())
			}
			GenerationError::UnknownState { state, partial, .. } => ServiceError::DeadEnd { state, partial },
			GenerationError::EmptyModel => ServiceError::NoModel,
			other => ServiceError::BadRequest(other.to_string()),
		}
	}
}

impl ResponseError for ServiceError {
	fn status_code(&self) -> StatusCode {
		match self {
			ServiceError::NoModel => StatusCode::SERVICE_UNAVAILABLE,
			ServiceError::UnknownStart(_) => StatusCode::NOT_FOUND,
			ServiceError::DeadEnd { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServiceError::Model { source: ModelError::Io(e), .. } if e.kind() == std::io::ErrorKind::NotFound => {
				StatusCode::NOT_FOUND
			}
			ServiceError::Model { source: ModelError::AlreadyLoaded(_), .. } => StatusCode::BAD_REQUEST,
			ServiceError::Model { .. } => StatusCode::INTERNAL_SERVER_ERROR,
			ServiceError::Corpus(CorpusError::InvalidName(_)) => StatusCode::BAD_REQUEST,
			ServiceError::Corpus(CorpusError::NotFound(_)) => StatusCode::NOT_FOUND,
			ServiceError::Corpus(CorpusError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
			ServiceError::Io(_) | ServiceError::Lock => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code())
			.insert_header(ContentType::plaintext())
			.body(self.to_string())
	}
}
