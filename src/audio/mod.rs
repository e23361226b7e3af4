pub mod binding;
pub mod config;
pub mod element;
pub mod error;
pub mod progress;
pub mod queue;
pub mod report;
pub mod resolver;
pub mod state;
pub mod system;
pub mod traits;
