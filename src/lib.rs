pub mod config;
pub mod engine;
pub mod errors;
pub mod fellows;
pub mod github;
pub mod logging;
pub mod report;
pub mod rules;
pub mod runner;
pub mod snapshot;
pub mod util;
