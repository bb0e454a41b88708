//! HTTP handlers

pub mod health;
pub mod auth;
pub mod dashboard;
pub mod scans;
pub mod history;
pub mod visualizer;
pub mod reports;
