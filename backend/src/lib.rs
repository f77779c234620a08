pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod predictor;
pub mod routes;
pub mod upstream;
