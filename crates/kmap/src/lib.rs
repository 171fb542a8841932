//! Kmap - a concept-dependency graph engine.
//!
//! This crate provides a library for maintaining a directed graph of
//! prerequisite relationships between concepts, and a CLI that runs its
//! queries over JSON datasets.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod events;
pub mod graph;
pub mod id_generation;
pub mod loader;

// Public CLI modules (needed by binary)
pub mod app;
pub mod cli;
pub mod config;
pub mod output;
