pub mod completion;
pub mod config;
pub mod directive;
pub mod format;
pub mod history;
pub mod persistence;
pub mod policy;
pub mod record;
pub mod types;

pub use types::*;
