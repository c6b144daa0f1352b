pub mod inference;

pub use inference::{InferenceClient, InferenceConfig};
