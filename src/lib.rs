pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;
