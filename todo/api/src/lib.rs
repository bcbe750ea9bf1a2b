pub mod api;
pub mod config;
pub mod database;
pub mod global;
pub mod service;
pub mod store;
