//! Blast-radius explorer for service dependency graphs.
//!
//! [`graph`] answers focus/hop queries against an organization catalog, [`engine`] turns a graph
//! response into render-ready frames and owns the interaction state, and [`config`] holds the
//! user's persisted defaults. The desktop viewer in `main.rs` wires them to egui.

pub mod config;
pub mod engine;
pub mod graph;
pub mod util;
