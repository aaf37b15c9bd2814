//! `stdio-mcp` — A Rust library for building MCP (Model Context Protocol) servers.
//!
//! Implements the MCP 2025-03-26 specification as a protocol handler with a
//! newline-delimited stdio transport. Define tools, resources and prompts in
//! JSON, register async handlers, and call `Server::handle()` directly or
//! hand the server to [`serve_stdio`].
//!
//! # Quick start
//!
//! ```rust
//! use stdio_mcp::{Server, FnToolHandler, text_result, JsonRpcRequest};
//! use serde_json::Value;
//!
//! # async fn example() {
//! let mut server = Server::builder()
//!     .tools_json(r#"[{"name":"echo","description":"echoes","inputSchema":{"type":"object","properties":{"message":{"type":"string"}},"required":["message"]}}]"#.as_bytes())
//!     .server_info("my-server", "0.1.0")
//!     .build();
//!
//! server.handle_tool("echo", FnToolHandler::new(|args: Value| async move {
//!     let msg = args.get("message").and_then(|v| v.as_str()).unwrap_or("");
//!     Ok(text_result(msg))
//! }));
//!
//! let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
//! let resp = server.handle(req).await;
//! let json = serde_json::to_string(&resp).unwrap();
//! # }
//! ```

pub mod loader;
pub mod server;
pub mod transport_stdio;
pub mod types;
mod validate;

// Re-export the most commonly used items at the crate root.
pub use loader::{parse_prompts, parse_resources, parse_tools};
pub use server::{
    FnToolHandler, PromptHandler, ResourceHandler, Server, ServerBuilder, ToolHandler,
    TypedToolHandler,
};
pub use transport_stdio::{serve, serve_stdio};
pub use types::{
    error_result, new_error_response, text_result, Annotations, ContentBlock, JsonRpcRequest,
    JsonRpcResponse, McpError, Prompt, PromptArgument, PromptMessage, PromptResult, Resource,
    ResourceContent, Role, RpcError, Tool, ToolResult, PROTOCOL_VERSION,
};
