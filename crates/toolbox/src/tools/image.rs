use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use stdio_mcp::{Annotations, ContentBlock, Role, Server, ToolResult, TypedToolHandler};

use super::{Deps, ToolError};
use crate::imagegen::{ImageError, ImageOutput, IMAGE_MODEL};

#[derive(Debug, Deserialize)]
pub struct GenerateImageArgs {
    pub prompt: String,
}

pub fn register(srv: &mut Server, deps: Arc<Deps>) {
    srv.handle_tool(
        "generateImage",
        TypedToolHandler::new(move |args: GenerateImageArgs| {
            let deps = deps.clone();
            async move { handle_generate_image(&deps, args).await }
        }),
    );
}

async fn handle_generate_image(deps: &Deps, args: GenerateImageArgs) -> Result<ToolResult, ToolError> {
    let token = deps.hf_token.as_deref().ok_or(ToolError::MissingCredential)?;

    tracing::info!(model = IMAGE_MODEL, prompt_len = args.prompt.len(), "generating image");
    let bytes = match deps.images.text_to_image(token, &args.prompt).await? {
        ImageOutput::Bytes(bytes) => bytes,
        ImageOutput::Url(url) => {
            tracing::debug!(url = %url, "provider returned a url, fetching");
            deps.images.fetch(&url).await?
        }
    };

    if bytes.is_empty() {
        return Err(ImageError::UnexpectedFormat("empty image body".into()).into());
    }

    let block = ContentBlock::image(STANDARD.encode(&bytes), "image/png").with_annotations(Annotations {
        audience: vec![Role::User],
        priority: Some(0.9),
    });

    Ok(ToolResult {
        content: vec![block],
        is_error: false,
    })
}
