use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use sign_bridge::agent::SentenceGeneratorAgent;
use sign_bridge::classifier::SignClassifier;
use sign_bridge::config::ServerConfig;
use sign_bridge::extractor::OrtHolisticEngine;
use sign_bridge::llm::LlmClient;
use sign_bridge::model_download;
use sign_bridge::routes::build_router;
use sign_bridge::state::AppState;
use sign_bridge::worker;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    log::info!(
        "starting on {}:{} (sequence length {})",
        config.host,
        config.port,
        config.max_frames
    );

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    model_download::ensure_models_available(&config)?;

    let engine = OrtHolisticEngine::load(
        &model_download::pose_model_path(&config),
        &model_download::hand_model_path(&config),
    )?;
    let classifier = SignClassifier::load(
        &model_download::classifier_model_path(&config),
        &model_download::labels_path(&config),
    )?;
    let (predictor, _worker) = worker::start_worker(engine, classifier, config.max_frames);
    log::info!("inference worker started");

    let llm = LlmClient::new(config.llm_endpoint.clone(), config.llm_model.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        predictor,
        agent: Arc::new(SentenceGeneratorAgent::new(llm)),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(serve(state, &config))
}

async fn serve(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = build_router(state, config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on {addr}");

    axum::serve(listener, app).await.context("server error")
}
