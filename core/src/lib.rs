pub mod config;
pub mod host;
pub mod project;
pub mod time;
