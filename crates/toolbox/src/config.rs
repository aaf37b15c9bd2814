/// Default endpoint prefix for the hosted inference API; the model id is appended.
pub const DEFAULT_IMAGE_API_BASE: &str = "https://router.huggingface.co/hf-inference/models";

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the image provider. Absence only disables `generateImage`.
    pub hf_token: Option<String>,
    pub image_api_base: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            hf_token: get("HF_TOKEN").filter(|t| !t.trim().is_empty()),
            image_api_base: get("IMAGE_API_BASE_URL")
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_API_BASE.into()),
        }
    }
}
