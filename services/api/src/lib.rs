//! services/api/src/lib.rs
//!
//! The study planner HTTP service: configuration, the Gemini adapter and
//! the REST surface over the core planner.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
