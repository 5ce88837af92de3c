pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod runtime;
