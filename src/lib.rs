//! MemoLive: Notes Into Stories
//!
//! Turns a short user note into a long-form generated story tagged with a
//! background-music keyword. Generation falls back sequentially through an
//! ordered list of candidate model configurations until one produces text.

pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod generation;
pub mod logging;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod view;
