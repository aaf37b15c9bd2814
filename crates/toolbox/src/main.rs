mod config;
mod imagegen;
mod prompts;
mod resources;
mod tools;

use std::sync::Arc;

use config::Config;
use imagegen::{HfInferenceClient, ImageApi, ImageError};
use tools::Deps;

const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_deps(config: &Config) -> Result<Arc<Deps>, ImageError> {
    let images = HfInferenceClient::new(&config.image_api_base)?;
    Ok(Arc::new(Deps {
        images: Arc::new(images) as Arc<dyn ImageApi>,
        hf_token: config.hf_token.clone(),
    }))
}

fn build_server(deps: Arc<Deps>) -> stdio_mcp::Server {
    let mut srv = stdio_mcp::Server::builder()
        .tools_json(include_bytes!("../tools.json"))
        .resources_json(include_bytes!("../resources.json"))
        .prompts_json(include_bytes!("../prompts.json"))
        .server_info(SERVER_NAME, SERVER_VERSION)
        .build();

    tools::register_all(&mut srv, deps);
    resources::register(&mut srv, SERVER_NAME, SERVER_VERSION);
    prompts::register(&mut srv);
    srv
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = Config::from_env();
    if config.hf_token.is_none() {
        tracing::warn!("HF_TOKEN is not set; generateImage will report an error");
    }

    let deps = match build_deps(&config) {
        Ok(deps) => deps,
        Err(e) => {
            tracing::error!(error = %e, "failed to build dependencies");
            std::process::exit(1);
        }
    };
    let srv = build_server(deps);

    tracing::info!(
        name = SERVER_NAME,
        version = SERVER_VERSION,
        tools = ?srv.tool_names(),
        "starting MCP server on stdio"
    );

    if let Err(e) = stdio_mcp::serve_stdio(srv).await {
        tracing::error!(error = %e, "stdio transport failed");
        std::process::exit(1);
    }

    tracing::info!("shutdown");
}
