//! Health registration service: the REST backend that stores residents'
//! medical registrations and the singleton admin account, plus the client
//! side (typed API client and UI-free screen state machines).

pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod routes;
pub mod screens;
pub mod state;
pub mod utils;
