//! Retouch: a small image editor built around a replayable transform history.
//!
//! The editing core (`raster`, `transform`, `history`, `engine`, `export`)
//! has no UI dependencies; `app` is the egui shell on top of it.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod history;
pub mod raster;
pub mod transform;
