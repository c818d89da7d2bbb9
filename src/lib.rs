//! 9-box talent classification dashboard.
//!
//! Loads scored employee records, filters them with [`data::filter`],
//! aggregates the result with [`data::aggregate`] and hands renderer-agnostic
//! output from [`present`] to the egui dashboard ([`app`], [`ui`]) or the CLI.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod present;
pub mod state;
pub mod ui;
