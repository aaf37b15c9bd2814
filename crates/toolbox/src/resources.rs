use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use stdio_mcp::{McpError, ResourceContent, ResourceHandler, Server};

use crate::imagegen::{IMAGE_MODEL, IMAGE_PROVIDER, INFERENCE_STEPS};
use crate::prompts::REVIEW_FOCUS_AREAS;
use crate::tools::calculator::Operator;
use crate::tools::greeting::Language;
use crate::tools::time::DEFAULT_TIMEZONE;

/// Self-description served at `mcp://server/info`.
pub struct ServerInfoResource {
    name: String,
    version: String,
    tools: Vec<String>,
    resources: Vec<String>,
    prompts: Vec<String>,
}

impl ServerInfoResource {
    /// Snapshot the names declared on `srv`.
    pub fn from_server(srv: &Server, name: &str, version: &str) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: owned(srv.tool_names()),
            resources: owned(srv.resource_names()),
            prompts: owned(srv.prompt_names()),
        }
    }

    pub fn describe(&self) -> Value {
        let languages: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
        let operators: Vec<&str> = Operator::ALL.iter().map(|o| o.symbol()).collect();
        let focus: Vec<&str> = REVIEW_FOCUS_AREAS.iter().map(|(title, _)| *title).collect();

        json!({
            "name": self.name,
            "version": self.version,
            "tools": self.tools,
            "resources": self.resources,
            "prompts": self.prompts,
            "toolsInfo": {
                "greeting": {"supportedLanguages": languages},
                "calculator": {"supportedOperators": operators},
                "getCurrentTime": {"defaultTimezone": DEFAULT_TIMEZONE},
                "generateImage": {
                    "provider": IMAGE_PROVIDER,
                    "model": IMAGE_MODEL,
                    "inferenceSteps": INFERENCE_STEPS,
                    "credentialEnv": "HF_TOKEN",
                },
            },
            "promptsInfo": {
                "code_review": {
                    "arguments": ["code", "language", "context"],
                    "focusAreas": focus,
                },
            },
            "status": "running",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl ResourceHandler for ServerInfoResource {
    async fn call(&self, uri: &str) -> Result<ResourceContent, McpError> {
        let text = serde_json::to_string_pretty(&self.describe())?;
        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: Some("application/json".into()),
            text: Some(text),
            blob: None,
        })
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}

/// Register resource handlers. Call after the definitions are loaded.
pub fn register(srv: &mut Server, name: &str, version: &str) {
    let info = ServerInfoResource::from_server(srv, name, version);
    srv.handle_resource("server-info", Arc::new(info));
}
