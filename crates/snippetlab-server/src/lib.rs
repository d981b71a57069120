//! HTTP/JSON API server for the snippet pipeline.
//!
//! Exposes snippet records and the generate, refine, test and run
//! operations of [`snippetlab_pipeline::SnippetService`] as REST endpoints.
//! This crate contains the server framework, API schema types, error
//! handling, configuration and route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
