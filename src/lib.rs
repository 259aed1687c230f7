//! fishcast library
//!
//! Scores Hong Kong fishing conditions from Observatory weather and tide feeds
//! plus the moon phase, and keeps a per-user catch log. The binary in
//! `main.rs` is a thin command-line front end over [`advisor::Advisor`].

pub mod advisor;
pub mod cli;
pub mod config;
pub mod data;
pub mod display;
pub mod location;
pub mod lunar;
pub mod scoring;
pub mod similarity;
pub mod store;
