mod builder;
#[allow(clippy::module_inception)]
mod client;
mod types;

pub use builder::EmotionClientBuilder;
pub use client::{EmotionClient, EmotionPredictor};
pub use types::{EmotionResponse, TextRequest};
