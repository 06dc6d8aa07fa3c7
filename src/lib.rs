pub mod ads;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod media;
pub mod query;
pub mod store;
pub mod users;
