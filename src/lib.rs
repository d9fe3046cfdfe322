//! Library entrypoint for pricewatch.
//!
//! Integration tests under `tests/` import the app state, routers,
//! controllers and the scheduling core from here.

pub mod config;
pub mod error;
pub mod models;

pub mod services;
pub mod templates;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub db: mongodb::Database,
    pub settings: config::Settings,
}
