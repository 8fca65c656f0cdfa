//! Domain objects parsing and tool integrations
//!
//! Provides the deal-context validation, Markdown rendering and the tools exposed
//! over the MCP protocol

pub mod formatter;
pub mod request;
pub mod text;
pub mod tools;
