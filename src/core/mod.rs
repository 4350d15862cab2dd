pub mod alerts;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod record;
