pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod stats;
pub mod storage;
