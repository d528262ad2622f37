//! Data models for medication records and configuration.

pub mod config;
pub mod medication;
