use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, put, web};
use log::debug;
use serde::Deserialize;

use markov_gen_core::{DeadEndPolicy, GenerationInput, Generator, IndexSelector, RandomSelector, render_batch};

use crate::error::ServiceError;
use crate::state::{RequestLimits, SharedData};

/// Query parameters of `/v1/generate`
#[derive(Deserialize, Debug)]
pub struct GenerateParams {
	/// Free-form start words, normalized before lookup (e.g. "Dear Holmes")
	start: Option<String>,
	limit: Option<i64>,
	runs: Option<usize>,
	/// Seed for reproducible output; random when absent
	seed: Option<u64>,
	/// fail, stop (default) or restart
	on_dead_end: Option<String>,
}

#[derive(Deserialize)]
pub struct ModelQuery {
	names: Option<String>,
}

/// Registers every endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_models)
		.service(get_loaded_models)
		.service(put_models)
		.service(get_chapters)
		.service(get_chapter);
}

fn plain_text(body: String) -> HttpResponse {
	HttpResponse::Ok().insert_header(ContentType::plaintext()).body(body)
}

/// Builds the walk parameters of a request, applying server defaults and caps.
fn build_input(params: &GenerateParams, limits: &RequestLimits) -> Result<(GenerationInput, usize), ServiceError> {
	let words = match params.start.as_deref().map(str::trim) {
		Some(s) if !s.is_empty() => s,
		_ => return Err(ServiceError::BadRequest("Missing or empty start words".to_owned())),
	};

	let mut input = GenerationInput::from_words(words);
	input.set_limit(params.limit.unwrap_or(limits.default_limit))?;
	if input.limit() > limits.max_limit {
		return Err(ServiceError::BadRequest(format!(
			"limit must be <= {}, got {}",
			limits.max_limit,
			input.limit()
		)));
	}

	input.dead_end = match &params.on_dead_end {
		Some(policy) => policy.parse()?,
		None => DeadEndPolicy::Stop,
	};

	let runs = params.runs.unwrap_or(limits.default_runs);
	if runs == 0 || runs > limits.max_runs {
		return Err(ServiceError::BadRequest(format!(
			"runs must be between 1 and {}, got {runs}",
			limits.max_runs
		)));
	}

	Ok((input, runs))
}

/// Runs the batch synchronously; nothing here crosses an await point.
fn run_batch(generator: &Generator, input: &GenerationInput, runs: usize, seed: Option<u64>) -> Result<String, ServiceError> {
	if !generator.model().contains(input.start()) {
		return Err(ServiceError::UnknownStart(input.start().trim().to_owned()));
	}

	let mut selector: Box<dyn IndexSelector> = match seed {
		Some(seed) => Box::new(RandomSelector::seeded(seed)),
		None => Box::new(RandomSelector::new()),
	};
	let walks = generator.walk_batch(input, runs, &mut *selector)?;
	Ok(render_batch(&walks))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Normalizes the start words, runs several independent walks and returns
/// them labelled `s_1`, `s_2`, ... separated by blank lines. A run cut short
/// by a dead end ends with a `[stopped at step N: ...]` marker.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<SharedData>,
	query: web::Query<GenerateParams>,
) -> Result<HttpResponse, ServiceError> {
	let (input, runs) = build_input(&query, &data.limits)?;
	let generator = data.generator()?.ok_or(ServiceError::NoModel)?;
	debug!("Generating {runs} x {} steps from {:?}", input.limit(), input.start());
	Ok(plain_text(run_batch(&generator, &input, runs, query.seed)?))
}

/// HTTP GET endpoint `/v1/models`: models available in the data directory.
#[get("/v1/models")]
async fn get_models(data: web::Data<SharedData>) -> Result<HttpResponse, ServiceError> {
	Ok(plain_text(data.available_models()?.join("\n")))
}

/// HTTP GET endpoint `/v1/loaded_models`: models merged into the current one.
#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<SharedData>) -> Result<HttpResponse, ServiceError> {
	Ok(plain_text(data.loaded_model_names()?.join("\n")))
}

/// HTTP PUT endpoint `/v1/load_models?names=a,b`
///
/// Replaces the current model with the merge of the named models.
#[put("/v1/load_models")]
async fn put_models(
	data: web::Data<SharedData>,
	query: web::Query<ModelQuery>,
) -> Result<HttpResponse, ServiceError> {
	let names: Vec<&str> = query
		.names
		.as_deref()
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.collect();

	data.load_models(&names)?;
	Ok(plain_text("Models loaded successfully".to_owned()))
}

/// HTTP GET endpoint `/v1/chapters`: corpus chapter names.
#[get("/v1/chapters")]
async fn get_chapters(data: web::Data<SharedData>) -> Result<HttpResponse, ServiceError> {
	Ok(plain_text(data.corpus().list_chapters()?.join("\n")))
}

/// HTTP GET endpoint `/v1/chapters/{name}`: raw text of one chapter.
#[get("/v1/chapters/{name}")]
async fn get_chapter(
	data: web::Data<SharedData>,
	name: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
	Ok(plain_text(data.corpus().read_chapter(&name)?))
}
