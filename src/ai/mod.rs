pub mod classifier;
pub mod client;
pub mod error;
pub mod inference;
pub mod label;
pub mod prompt;

pub use classifier::ClassifierService;
pub use client::CompletionClient;
