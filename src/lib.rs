pub mod auth;
pub mod cache;
pub mod configuration;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;
pub mod storage;
pub mod telemetry;
