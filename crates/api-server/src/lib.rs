#![warn(clippy::unwrap_used)]

pub mod loyalty_rest;
pub mod rest;
pub mod server;

pub use server::ApiServer;
