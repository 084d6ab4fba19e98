pub mod client;
pub mod config;
pub mod error;

pub use client::Supa;
pub use config::SupaConfig;
pub use error::{SupaError, SupaResult};
