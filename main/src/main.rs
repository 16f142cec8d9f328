use std::sync::Arc;
use std::time::Duration;

use api_router::{api_routes_v1, api_state::ApiState};
use axum::Router;
use common::{index::client::SearchIndexClient, utils::config::get_config};
use query_pipeline::{Classifier, PipelineTuning, QueryPipeline};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Long-lived clients, shared across requests for connection pooling.
    let index = Arc::new(SearchIndexClient::new(
        &config.index_url,
        &config.index_api_key,
        &config.index_collection,
        Duration::from_secs(config.index_timeout_secs),
    )?);

    let openai_client = Arc::new(async_openai::Client::with_config(
        async_openai::config::OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_base_url),
    ));

    let classifier = Classifier::new(
        openai_client,
        config.classifier_model.as_str(),
        Duration::from_secs(config.classifier_timeout_secs),
    );
    let tuning = PipelineTuning {
        retrieval_count: config.retrieval_count,
        max_categories: config.max_categories,
        samples_per_category: config.samples_per_category,
    };
    let pipeline = Arc::new(QueryPipeline::new(Arc::clone(&index), classifier, tuning));
    info!(
        collection = index.collection(),
        model = %config.classifier_model,
        confidence_threshold = config.confidence_threshold,
        "Query pipeline initialized"
    );

    let api_state = ApiState {
        pipeline,
        index,
        config: config.clone(),
    };

    // Create Axum router
    let app = Router::new()
        .nest("/api/v1", api_routes_v1())
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
