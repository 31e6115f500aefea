pub mod huggingface;

pub use huggingface::{HuggingFaceClient, HuggingFaceConfig};
