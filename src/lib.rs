pub mod calc;
pub mod config;
pub mod error;
pub mod export;
pub mod ipc;
pub mod model;
pub mod store;
pub mod validate;
