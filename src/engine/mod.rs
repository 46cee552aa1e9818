//! Reconciliation engine.
//!
//! `differ` decides what a single desired record needs (create, update, or
//! nothing); `reconciler` drives the full desired set against the remote
//! store and collects per-record outcomes.

pub mod differ;
pub mod reconciler;

pub use reconciler::{Reconciler, SyncReport};
