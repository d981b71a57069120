//! HTTP handler modules for the snippet API.
//!
//! Handlers parse requests, delegate to [`snippetlab_pipeline::SnippetService`],
//! and return JSON responses. No business logic lives in handlers.

pub mod snippets;
