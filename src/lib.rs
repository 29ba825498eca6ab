//! Gatekeeper - Per-Key Rate Limiting Service
//!
//! This crate implements a single-process, in-memory rate limiting service.
//! Requests are admitted or rejected per caller key using a fixed-window
//! algorithm, and the decision engine is exposed over a small HTTP/JSON API.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
