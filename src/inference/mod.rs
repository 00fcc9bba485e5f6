pub mod client;
pub mod extract;
pub mod proxy;
pub mod types;

pub use client::{HuggingFaceClient, InferenceBackend};
pub use extract::extract_output;
pub use proxy::{InferenceProxy, is_valid_model};
pub use types::*;
