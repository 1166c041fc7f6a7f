#![doc = "fndoc-core: core logic library for fndoc."]

//! This crate holds the documentation pipelines, data models and the
//! generation client used by the `fndoc` CLI.
//!
//! # Usage
//! Depend on this crate for extraction, prompt building, per-module
//! documentation, aggregation and report composition. The CLI crate only
//! wires configuration to these entry points.

pub mod artifact;
pub mod combine;
pub mod config;
pub mod contract;
pub mod document;
pub mod extract;
pub mod gemini;
pub mod manual;
pub mod pdf;
pub mod prompt;
pub mod report;
