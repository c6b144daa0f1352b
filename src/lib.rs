//! SDG document classification worker.
//!
//! Splits documents into chunks, scores every chunk against the 17 UN
//! Sustainable Development Goals through an HTTP inference backend, smooths
//! the per-chunk scores with a trailing moving average, and aggregates them
//! into document-level scores plus a top goal label.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod app;
pub mod clients;
pub mod config;
pub mod goals;
pub mod observability;
pub mod pipeline;
pub mod scoring;
