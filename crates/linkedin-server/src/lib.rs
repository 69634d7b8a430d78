//! LinkedIn MCP server
//!
//! Exposes the LinkedIn operations of [`linkedin_client::LinkedInClient`] as
//! MCP tools served over standard input/output using the rmcp SDK.

pub mod error;
pub mod server;
pub mod tools;

pub use error::{Result, ServerError};
pub use server::{McpServer, ToolFuture, ToolHandler};
pub use tools::register_linkedin_tools;
