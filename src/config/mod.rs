pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, OpenAiConfig};
pub use loader::load_config;
