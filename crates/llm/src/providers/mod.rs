pub mod llama_server;
pub mod mock;
