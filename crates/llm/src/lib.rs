pub mod model_file;
pub mod providers;
pub mod traits;
pub mod types;

pub use model_file::ModelFile;
pub use traits::ModelRuntime;
pub use types::{ModelConfig, SamplingParams};

// Re-export providers
pub use providers::llama_server::LlamaServer;
pub use providers::mock::{FailingRuntime, RecordedCall, RecordingRuntime};
