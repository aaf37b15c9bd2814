use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

pub const IMAGE_PROVIDER: &str = "hf-inference";
pub const IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
pub const INFERENCE_STEPS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// What the provider handed back for a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutput {
    /// Raw encoded image.
    Bytes(Vec<u8>),
    /// Location of the image; needs one more fetch.
    Url(String),
}

/// Trait abstracting the text-to-image provider for testing.
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn text_to_image(&self, token: &str, prompt: &str) -> Result<ImageOutput, ImageError>;
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError>;
}

/// Hosted inference API client.
pub struct HfInferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl HfInferenceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ImageError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, IMAGE_MODEL)
    }
}

#[async_trait]
impl ImageApi for HfInferenceClient {
    async fn text_to_image(&self, token: &str, prompt: &str) -> Result<ImageOutput, ImageError> {
        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(token)
            .header("accept", "image/png")
            .json(&json!({
                "inputs": prompt,
                "parameters": {"num_inference_steps": INFERENCE_STEPS},
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ImageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = resp.bytes().await?;
        tracing::debug!(content_type = %content_type, len = body.len(), "image provider answered");

        classify(&content_type, &body)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                status: status.as_u16(),
                body: format!("fetching {}", url),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Decide the output shape once, from the response content type and body.
///
/// JSON and text answers must carry a URL. Any other non-empty body is raw
/// image data, including `application/octet-stream` or no content type.
fn classify(content_type: &str, body: &[u8]) -> Result<ImageOutput, ImageError> {
    if content_type.contains("json") {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ImageError::UnexpectedFormat(format!("invalid json: {}", e)))?;
        return match value {
            Value::String(url) if is_url(&url) => Ok(ImageOutput::Url(url)),
            Value::Object(ref obj) => match obj.get("url").and_then(|u| u.as_str()) {
                Some(url) if is_url(url) => Ok(ImageOutput::Url(url.to_string())),
                _ => Err(ImageError::UnexpectedFormat("json object without url".into())),
            },
            _ => Err(ImageError::UnexpectedFormat("json value is not a url".into())),
        };
    }

    if content_type.starts_with("text/") {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if is_url(&text) {
            return Ok(ImageOutput::Url(text));
        }
        return Err(ImageError::UnexpectedFormat(content_type.to_string()));
    }

    if body.is_empty() {
        return Err(ImageError::UnexpectedFormat("empty body".into()));
    }
    Ok(ImageOutput::Bytes(body.to_vec()))
}

fn is_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every call; answers generation with a fixed output.
    pub struct MockImageApi {
        pub output: ImageOutput,
        pub fetched_bytes: Vec<u8>,
        pub prompts: Mutex<Vec<String>>,
        pub fetches: Mutex<Vec<String>>,
    }

    impl MockImageApi {
        pub fn new(output: ImageOutput) -> Self {
            Self {
                output,
                fetched_bytes: b"\x89PNG fetched".to_vec(),
                prompts: Mutex::new(Vec::new()),
                fetches: Mutex::new(Vec::new()),
            }
        }

        pub fn generate_calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn fetch_calls(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageApi for MockImageApi {
        async fn text_to_image(&self, _token: &str, prompt: &str) -> Result<ImageOutput, ImageError> {
            self.prompts.lock().unwrap().push(prompt.into());
            Ok(self.output.clone())
        }

        async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
            self.fetches.lock().unwrap().push(url.into());
            Ok(self.fetched_bytes.clone())
        }
    }
}
