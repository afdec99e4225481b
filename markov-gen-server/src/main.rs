use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use log::{error, info};

use markov_gen_server::config::ServerConfig;
use markov_gen_server::routes;
use markov_gen_server::state::SharedData;

/// Main entry point for the server.
///
/// Parses the configuration, loads the startup models, and serves the
/// shared read-only model from every worker.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config = ServerConfig::parse();

	let mut logger_builder = env_logger::Builder::from_default_env();
	logger_builder.filter_level(config.log_level);
	logger_builder.init();

	info!("Configuration: {:?}", config);

	let shared_data = web::Data::new(SharedData::new(&config));
	let startup_models = config.model_names();
	if !startup_models.is_empty() {
		if let Err(e) = shared_data.load_models(&startup_models) {
			error!("Failed to load startup models: {e}");
			return Err(std::io::Error::other(e.to_string()));
		}
	}

	let workers = config.workers();
	info!("Listening on {}:{} with {} workers", config.host, config.port, workers);

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes::configure)
	})
		.workers(workers)
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
