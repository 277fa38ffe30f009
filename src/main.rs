use std::net::SocketAddr;

use axum::{routing::get, Extension, Router};
use clap::Parser;
use ilm_exporter::{log_filter::LogFilter, Exporter};
use log::{error, info};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser)]
struct Opts {
    #[clap(short, long, default_value = "config.yaml")]
    config: String,

    #[clap(short, long, default_value = "localhost:9090")]
    address: String,

    #[clap(long, default_value = "info")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    tracing_subscriber::registry()
        .with(tracing_logfmt::layer().with_filter(LogFilter::new(opts.log_level)))
        .init();

    if let Err(err) = run(opts).await {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    let exporter = ilm_exporter::config::parse(&opts.config)?.build()?;

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(collect_metrics))
        .layer(Extension(exporter))
        .layer(TraceLayer::new_for_http());

    let addr = tokio::net::lookup_host(&opts.address)
        .await?
        .next()
        .ok_or_else(|| format!("could not resolve address {}", opts.address))?;

    serve(app, addr).await
}

async fn serve(app: Router, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    info!("Listening on {}", addr);

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "OK"
}

async fn collect_metrics(exporter: Extension<Exporter>) -> String {
    exporter.render().await
}
