use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub index_url: String,
    pub index_api_key: String,
    #[serde(default = "default_index_collection")]
    pub index_collection: String,
    pub openai_api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    pub http_port: u16,
    #[serde(default = "default_index_timeout_secs")]
    pub index_timeout_secs: u64,
    #[serde(default = "default_classifier_timeout_secs")]
    pub classifier_timeout_secs: u64,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_retrieval_count")]
    pub retrieval_count: u32,
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
    #[serde(default = "default_samples_per_category")]
    pub samples_per_category: usize,
}

fn default_index_collection() -> String {
    "products".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_index_timeout_secs() -> u64 {
    5
}

// Classification dominates end-to-end latency, so it gets a longer budget
// than the index calls.
fn default_classifier_timeout_secs() -> u64 {
    30
}

fn default_confidence_threshold() -> f64 {
    0.75
}

fn default_retrieval_count() -> u32 {
    20
}

fn default_max_categories() -> usize {
    5
}

fn default_samples_per_category() -> usize {
    3
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
