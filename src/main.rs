use adtech_server::config::load_config;
use adtech_server::error::Error;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    adtech_server::run(config).await
}
