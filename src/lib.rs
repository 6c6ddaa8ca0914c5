pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod sweeper;

pub use db::create_pool;
