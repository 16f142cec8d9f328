pub mod classifier;
pub mod classifier_prompt;
pub mod context;
pub mod filter;
pub mod gate;
pub mod limit;
pub mod partition;
pub mod pipeline;

pub use classifier::{Classification, Classifier};
pub use context::{build_category_context, CategoryContext};
pub use pipeline::{PipelineTuning, QueryPipeline, SearchOptions};
