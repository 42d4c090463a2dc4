pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod memory;
pub mod reports;
pub mod state;
