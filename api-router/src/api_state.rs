use std::sync::Arc;

use common::{index::client::SearchIndexClient, utils::config::AppConfig};
use query_pipeline::QueryPipeline;

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<QueryPipeline>,
    pub index: Arc<SearchIndexClient>,
    pub config: AppConfig,
}
