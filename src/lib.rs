//! prism — Payload Rendering and Inspection of Streamed Messages.
//!
//! Parses captured messages-API traffic (complete JSON requests/responses or
//! streamed SSE text) into structured models and renders them as collapsible
//! inspection documents.

pub mod cli;
pub mod config;
pub mod export;
pub mod inspector;
pub mod render;
pub mod utils;
pub mod web;
