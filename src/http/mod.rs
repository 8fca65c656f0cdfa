//! HTTP Transport layer for the Model Context Protocol
//!
//! Provides the external API routing: the `/mcp` endpoint with its CORS preflight,
//! and the health and discovery endpoints.

pub mod handlers;
