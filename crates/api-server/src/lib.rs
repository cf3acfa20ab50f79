//! HTTP surface of the planner: REST handlers, router and metrics exporter.

#![warn(clippy::unwrap_used)]

pub mod rest;
pub mod server;

pub use server::ApiServer;
