pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod logging;
pub mod openapi;
pub mod pages;
pub mod services;
pub mod state;
