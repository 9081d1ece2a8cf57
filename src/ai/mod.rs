//! Client for the hosted text-generation API

mod client;
mod models;

pub use client::{GenerationError, TextGenClient};
pub use models::GenerationConfig;
