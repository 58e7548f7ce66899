use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub persist_path: Option<PathBuf>,
    /// Present only when `OPENAI_API_KEY` is set; otherwise the offline word
    /// bank stands in for the AI.
    pub openai: Option<OpenAiConfig>,
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub image_model: String,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            image_model: var("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_IMAGE_MODEL.to_string()),
        });

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            persist_path: var("PERSIST_PATH").map(PathBuf::from),
            openai,
        }
    }
}
