pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod source;
pub mod spider;
