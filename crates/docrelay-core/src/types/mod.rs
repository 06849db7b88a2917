//! Core type definitions used across the DocRelay workspace.

pub mod id;

pub use id::*;
