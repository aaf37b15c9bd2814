use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::loader;
use crate::types::*;

/// Handler trait for MCP tools. Implement this or use closures.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<ToolResult, McpError>;
}

/// Handler trait for MCP resources.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn call(&self, uri: &str) -> Result<ResourceContent, McpError>;
}

/// Handler trait for MCP prompts.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn call(&self, args: HashMap<String, String>) -> Result<PromptResult, McpError>;
}

/// Wraps an async closure into a ToolHandler.
pub struct FnToolHandler<F> {
    f: F,
}

impl<F, Fut> FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, McpError>> + Send + 'static,
{
    pub fn new(f: F) -> Arc<dyn ToolHandler> {
        Arc::new(Self { f })
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, McpError>> + Send + 'static,
{
    async fn call(&self, args: Value) -> Result<ToolResult, McpError> {
        (self.f)(args).await
    }
}

/// Wraps an async closure taking deserialized arguments into a ToolHandler.
///
/// Arguments arrive already validated, so the closure sees a typed struct.
/// Any error the closure returns becomes [`McpError::Tool`] carrying its
/// `Display` text, which the dispatcher turns into an error-flagged result.
pub struct TypedToolHandler<A, F> {
    f: F,
    _args: PhantomData<fn(A)>,
}

impl<A, F, Fut, E> TypedToolHandler<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    pub fn new(f: F) -> Arc<dyn ToolHandler> {
        Arc::new(Self {
            f,
            _args: PhantomData,
        })
    }
}

#[async_trait]
impl<A, F, Fut, E> ToolHandler for TypedToolHandler<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResult, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async fn call(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: A = serde_json::from_value(args)
            .map_err(|e| McpError::Validation(e.to_string()))?;
        (self.f)(args)
            .await
            .map_err(|e| McpError::Tool(e.to_string()))
    }
}

/// The MCP server. Create with `ServerBuilder`, register handlers, then serve.
pub struct Server {
    pub(crate) server_name: String,
    pub(crate) server_version: String,
    pub(crate) tools: HashMap<String, Tool>,
    pub(crate) tool_list: Vec<Tool>,
    pub(crate) resources: HashMap<String, Resource>,
    pub(crate) resource_list: Vec<Resource>,
    pub(crate) prompts: HashMap<String, Prompt>,
    pub(crate) prompt_list: Vec<Prompt>,
    pub(crate) tool_handlers: HashMap<String, Arc<dyn ToolHandler>>,
    pub(crate) resource_handlers: HashMap<String, Arc<dyn ResourceHandler>>,
    pub(crate) prompt_handlers: HashMap<String, Arc<dyn PromptHandler>>,
}

impl Server {
    /// Create a new server builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Register a tool handler.
    pub fn handle_tool(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.tool_handlers.insert(name.into(), handler);
    }

    /// Register a resource handler.
    pub fn handle_resource(&mut self, name: impl Into<String>, handler: Arc<dyn ResourceHandler>) {
        self.resource_handlers.insert(name.into(), handler);
    }

    /// Register a prompt handler.
    pub fn handle_prompt(&mut self, name: impl Into<String>, handler: Arc<dyn PromptHandler>) {
        self.prompt_handlers.insert(name.into(), handler);
    }

    /// Names of the declared tools, in declaration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_list.iter().map(|t| t.name.as_str()).collect()
    }

    /// Names of the declared resources, in declaration order.
    pub fn resource_names(&self) -> Vec<&str> {
        self.resource_list.iter().map(|r| r.name.as_str()).collect()
    }

    /// Names of the declared prompts, in declaration order.
    pub fn prompt_names(&self) -> Vec<&str> {
        self.prompt_list.iter().map(|p| p.name.as_str()).collect()
    }

    /// Route a JSON-RPC request to the appropriate MCP handler.
    ///
    /// Requests without an id are notifications: they are processed but the
    /// returned sentinel must not be written back.
    pub async fn handle(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if req.jsonrpc != "2.0" {
            return new_error_response(req.id, ERR_CODE_INVALID_REQ, "jsonrpc must be '2.0'");
        }

        let notification = req.is_notification();
        tracing::debug!(method = %req.method, notification, "dispatch");

        let resp = match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "ping" => new_ok_response(req.id, json!({})),
            "notifications/initialized" | "notifications/cancelled" => notification_response(),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req).await,
            "resources/list" => self.handle_resources_list(req),
            "resources/read" => self.handle_resources_read(req).await,
            "prompts/list" => self.handle_prompts_list(req),
            "prompts/get" => self.handle_prompts_get(req).await,
            _ => new_error_response(
                req.id,
                ERR_CODE_NO_METHOD,
                format!("Method not found: {}", req.method),
            ),
        };

        if notification {
            notification_response()
        } else {
            resp
        }
    }

    fn handle_initialize(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if let Some(params) = &req.params {
            if let Ok(p) = serde_json::from_value::<InitializeParams>(params.clone()) {
                let client_name = p.client_info.as_ref().map_or("", |c| c.name.as_str());
                let client_version = p.client_info.as_ref().map_or("", |c| c.version.as_str());
                tracing::info!(
                    client_name,
                    client_version,
                    protocol_version = ?p.protocol_version,
                    "initialize"
                );
            }
        }

        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
                "prompts": {"listChanged": false},
            },
            "serverInfo": {
                "name": self.server_name,
                "version": self.server_version,
            },
        });

        new_ok_response(req.id, result)
    }

    fn handle_tools_list(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({ "tools": self.tool_list });
        new_ok_response(req.id, result)
    }

    async fn handle_tools_call(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(&req) {
            Ok(p) => p,
            Err(resp) => return resp,
        };

        // Find tool definition.
        let tool = match self.tools.get(&params.name) {
            Some(t) => t,
            None => {
                return new_error_response(
                    req.id,
                    ERR_CODE_NO_METHOD,
                    format!("Unknown tool: {}", params.name),
                )
            }
        };

        // Validate arguments and fill defaults.
        let args = match tool.validate_arguments(&params.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!(tool = %params.name, error = %e, "rejected arguments");
                return new_error_response(req.id, ERR_CODE_BAD_PARAMS, e);
            }
        };

        // Find handler.
        let handler = match self.tool_handlers.get(&params.name) {
            Some(h) => h,
            None => {
                return new_error_response(
                    req.id,
                    ERR_CODE_INTERNAL,
                    format!("no handler for tool: {}", params.name),
                )
            }
        };

        // Execute handler. Arguments the handler cannot decode are a protocol
        // error; every other handler error is reported in-band.
        let result = match handler.call(args).await {
            Ok(r) => r,
            Err(McpError::Validation(e)) => {
                tracing::debug!(tool = %params.name, error = %e, "handler rejected arguments");
                return new_error_response(req.id, ERR_CODE_BAD_PARAMS, e);
            }
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "tool reported an error");
                error_result(e.to_string())
            }
        };

        match serde_json::to_value(&result) {
            Ok(value) => new_ok_response(req.id, value),
            Err(e) => new_error_response(req.id, ERR_CODE_INTERNAL, format!("encode result: {}", e)),
        }
    }

    fn handle_resources_list(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({ "resources": self.resource_list });
        new_ok_response(req.id, result)
    }

    async fn handle_resources_read(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let params: ResourceReadParams = match parse_params(&req) {
            Ok(p) => p,
            Err(resp) => return resp,
        };

        if params.name.is_none() && params.uri.is_none() {
            return new_error_response(
                req.id,
                ERR_CODE_BAD_PARAMS,
                "either name or uri must be provided",
            );
        }

        // Resolve resource.
        let target = if let Some(name) = &params.name {
            self.resources.get(name).cloned()
        } else {
            let uri = params.uri.as_deref().unwrap_or_default();
            self.resource_list.iter().find(|r| r.uri == uri).cloned()
        };

        let target = match target {
            Some(t) => t,
            None => return new_error_response(req.id, ERR_CODE_BAD_PARAMS, "resource not found"),
        };

        // Check for registered handler.
        if let Some(handler) = self.resource_handlers.get(&target.name) {
            match handler.call(&target.uri).await {
                Ok(content) => {
                    let result = json!({ "contents": [content] });
                    new_ok_response(req.id, result)
                }
                Err(e) => new_error_response(
                    req.id,
                    ERR_CODE_INTERNAL,
                    format!("read resource: {}", e),
                ),
            }
        } else {
            // Fallback: return metadata only.
            let result = json!({
                "contents": [{
                    "uri": target.uri,
                    "mimeType": target.mime_type,
                    "text": "",
                }],
            });
            new_ok_response(req.id, result)
        }
    }

    fn handle_prompts_list(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({ "prompts": self.prompt_list });
        new_ok_response(req.id, result)
    }

    async fn handle_prompts_get(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let params: PromptGetParams = match parse_params(&req) {
            Ok(p) => p,
            Err(resp) => return resp,
        };

        let prompt = match self.prompts.get(&params.name) {
            Some(p) => p,
            None => {
                return new_error_response(
                    req.id,
                    ERR_CODE_NO_METHOD,
                    format!("Unknown prompt: {}", params.name),
                )
            }
        };

        if let Some(missing) = prompt
            .arguments
            .iter()
            .find(|a| a.required && !params.arguments.contains_key(&a.name))
        {
            return new_error_response(
                req.id,
                ERR_CODE_BAD_PARAMS,
                format!("missing required argument \"{}\"", missing.name),
            );
        }

        let handler = match self.prompt_handlers.get(&params.name) {
            Some(h) => h,
            None => {
                return new_error_response(
                    req.id,
                    ERR_CODE_INTERNAL,
                    format!("no handler for prompt: {}", params.name),
                )
            }
        };

        match handler.call(params.arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => new_ok_response(req.id, value),
                Err(e) => new_error_response(req.id, ERR_CODE_INTERNAL, format!("encode prompt: {}", e)),
            },
            Err(e) => new_error_response(req.id, ERR_CODE_INTERNAL, format!("get prompt: {}", e)),
        }
    }
}

/// Deserialize request params, or build the matching error response.
fn parse_params<T: DeserializeOwned>(req: &JsonRpcRequest) -> Result<T, JsonRpcResponse> {
    match req.params.as_ref() {
        Some(p) => serde_json::from_value(p.clone()).map_err(|e| {
            new_error_response(
                req.id.clone(),
                ERR_CODE_BAD_PARAMS,
                format!("invalid params: {}", e),
            )
        }),
        None => Err(new_error_response(
            req.id.clone(),
            ERR_CODE_BAD_PARAMS,
            "params required",
        )),
    }
}

/// Builder for constructing an MCP Server.
#[derive(Default)]
pub struct ServerBuilder {
    tools: Vec<Tool>,
    resources: Vec<Resource>,
    prompts: Vec<Prompt>,
    server_name: Option<String>,
    server_version: Option<String>,
}

impl ServerBuilder {
    /// Add tool definitions directly.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Parse tool definitions from raw JSON bytes.
    pub fn tools_json(mut self, data: &[u8]) -> Self {
        match loader::parse_tools(data) {
            Ok(tools) => self.tools.extend(tools),
            Err(e) => tracing::error!("parse tools json: {}", e),
        }
        self
    }

    /// Parse resource definitions from raw JSON bytes.
    pub fn resources_json(mut self, data: &[u8]) -> Self {
        match loader::parse_resources(data) {
            Ok(resources) => self.resources.extend(resources),
            Err(e) => tracing::error!("parse resources json: {}", e),
        }
        self
    }

    /// Parse prompt definitions from raw JSON bytes.
    pub fn prompts_json(mut self, data: &[u8]) -> Self {
        match loader::parse_prompts(data) {
            Ok(prompts) => self.prompts.extend(prompts),
            Err(e) => tracing::error!("parse prompts json: {}", e),
        }
        self
    }

    /// Set server name and version.
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self.server_version = Some(version.into());
        self
    }

    /// Build the server.
    pub fn build(self) -> Server {
        let tool_map: HashMap<String, Tool> =
            self.tools.iter().map(|t| (t.name.clone(), t.clone())).collect();
        let res_map: HashMap<String, Resource> =
            self.resources.iter().map(|r| (r.name.clone(), r.clone())).collect();
        let prompt_map: HashMap<String, Prompt> =
            self.prompts.iter().map(|p| (p.name.clone(), p.clone())).collect();

        Server {
            server_name: self.server_name.unwrap_or_else(|| "stdio-mcp".into()),
            server_version: self.server_version.unwrap_or_else(|| "1.0.0".into()),
            tools: tool_map,
            tool_list: self.tools,
            resources: res_map,
            resource_list: self.resources,
            prompts: prompt_map,
            prompt_list: self.prompts,
            tool_handlers: HashMap::new(),
            resource_handlers: HashMap::new(),
            prompt_handlers: HashMap::new(),
        }
    }
}
