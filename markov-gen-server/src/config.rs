use std::path::PathBuf;

use clap::Parser;

/// Configuration of the generation server.
///
/// Every flag can also be set through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "markov-gen-server")]
#[command(about = "HTTP service generating text by walking a Markov chain")]
pub struct ServerConfig {
	/// Address to bind
	#[arg(long, env = "MARKOV_HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Port to listen on
	#[arg(short, long, env = "MARKOV_PORT", default_value = "5000")]
	pub port: u16,

	/// Directory holding the JSON models (and their .bin caches)
	#[arg(long, env = "MARKOV_DATA_DIR", default_value = "./data")]
	pub data_dir: PathBuf,

	/// Directory holding the corpus chapters
	#[arg(long, env = "MARKOV_CORPUS_DIR", default_value = "./data/corpus")]
	pub corpus_dir: PathBuf,

	/// Comma-separated model names to load at startup (e.g. "sherlock,watson")
	#[arg(short, long, env = "MARKOV_MODELS", value_delimiter = ',')]
	pub models: Vec<String>,

	/// Number of HTTP workers (default: number of CPUs)
	#[arg(short, long, env = "MARKOV_WORKERS")]
	pub workers: Option<usize>,

	/// Steps per walk when a request does not choose
	#[arg(long, env = "MARKOV_DEFAULT_LIMIT", default_value = "10", value_parser = clap::value_parser!(i64).range(0..))]
	pub default_limit: i64,

	/// Walks per request when a request does not choose
	#[arg(long, env = "MARKOV_DEFAULT_RUNS", default_value = "10")]
	pub default_runs: usize,

	/// Largest step count a request may ask for
	#[arg(long, env = "MARKOV_MAX_LIMIT", default_value = "1000")]
	pub max_limit: usize,

	/// Largest number of walks a request may ask for
	#[arg(long, env = "MARKOV_MAX_RUNS", default_value = "100")]
	pub max_runs: usize,

	/// Log level (off, error, warn, info, debug, trace)
	#[arg(long, env = "MARKOV_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
	pub log_level: log::LevelFilter,
}

fn parse_level(s: &str) -> Result<log::LevelFilter, String> {
	s.parse()
		.map_err(|_| format!("unknown log level {s:?}, expected one of off, error, warn, info, debug, trace"))
}

impl ServerConfig {
	/// Worker count, never below 1.
	pub fn workers(&self) -> usize {
		self.workers.unwrap_or_else(num_cpus::get).max(1)
	}

	/// Startup model names, trimmed, blanks removed.
	pub fn model_names(&self) -> Vec<&str> {
		self.models
			.iter()
			.map(|s| s.trim())
			.filter(|s| !s.is_empty())
			.collect()
	}
}
