pub mod api;
pub mod app;
pub mod browser;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod ui;
pub mod view;
