//! reviewlens - Product Review Analysis
//!
//! Turns a CSV export of product reviews into one structured analysis per
//! product. Each product's reviews are sent to a text-generation model for
//! feature and sentiment extraction; whenever that path fails the record is
//! rebuilt from deterministic heuristics, so every product always gets a
//! well-formed result.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
