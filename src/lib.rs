pub mod auth;
pub mod config;
pub mod connection;
mod utils;

pub use utils::ServerError;
