pub mod app;
pub mod backends;
pub mod batch;
pub mod cli;
pub mod config_loader;
pub mod error;
pub mod lines;
pub mod manifest;
pub mod resolver;
