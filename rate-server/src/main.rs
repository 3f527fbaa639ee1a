use rate_server::utils::logger;
use rate_server::{Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Starting ratecard server"
    );

    Server::new(config).run().await
}
