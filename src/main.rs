use essay_grader::{
    api::Server,
    capability::{Capabilities, HttpGrader, JsonStudentDirectory, LogMailer, NoDirectory, StudentDirectory},
    config::Config,
    service::GradingService,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Entry point: load configuration, wire capabilities, start the retention
/// sweeper and serve the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Essay grader starting with config from {}", config_path);
    info!(
        "Grader endpoint {}, batch {:?}, upload {:?}",
        config.grader.endpoint, config.batch, config.upload
    );

    let directory: Arc<dyn StudentDirectory> = match &config.students.directory_path {
        Some(path) => Arc::new(JsonStudentDirectory::load(path)?),
        None => Arc::new(NoDirectory),
    };
    let capabilities = Capabilities {
        grader: Arc::new(HttpGrader::new(&config.grader)),
        mailer: Arc::new(LogMailer),
        directory,
    };

    let service = GradingService::new(config.clone(), capabilities);
    service.spawn_retention();
    info!("Retention sweeper started");

    Server::new(config.api.clone(), service).start().await?;
    Ok(())
}
