pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod outline;
pub mod routes;
pub mod rubric_import;
pub mod state;
pub mod storage;
pub mod store;
pub mod xlsx;
