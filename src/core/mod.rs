pub mod api_key;
pub mod app;
pub mod booster;
pub mod cli;
pub mod config;
pub mod dates;
pub mod export;
pub mod history;
pub mod llm;
pub mod paths;
pub mod text;
