//! Collaborator configuration read from the environment.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatCompletionModel;
use crate::error::GatewayError;
use crate::gateway::LanguageModel;
use crate::offline::OfflineModel;
use crate::python::PythonSandbox;
use crate::sandbox::Sandbox;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PYTHON: &str = "python3";
const DEFAULT_RUN_TIMEOUT_MS: u64 = 5000;

/// Which language model backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Any endpoint speaking the OpenAI chat completions protocol.
    OpenAiCompatible,
    OpenRouter,
    /// Canned responses, no network.
    Offline,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAiCompatible => "openai_compatible",
            Provider::OpenRouter => "openrouter",
            Provider::Offline => "offline",
        }
    }

    /// Base URL used when none is configured.
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Provider::OpenAiCompatible => Some("https://api.openai.com/v1"),
            Provider::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Provider::Offline => None,
        }
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai_compatible" | "openai" => Ok(Provider::OpenAiCompatible),
            "openrouter" => Ok(Provider::OpenRouter),
            "offline" => Ok(Provider::Offline),
            other => Err(GatewayError::Config(format!(
                "unsupported provider '{}': use openai_compatible, openrouter or offline",
                other
            ))),
        }
    }
}

/// Language model client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Offline,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Reads `SNIPPETLAB_LLM_*`, falling back to the `OPENAI_*` variables.
    ///
    /// Without an explicit provider, a configured API key selects
    /// `openai_compatible`; otherwise the offline model is used.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = env_any(&["SNIPPETLAB_LLM_API_KEY", "OPENAI_API_KEY"]);
        let provider = match env_any(&["SNIPPETLAB_LLM_PROVIDER"]) {
            Some(provider) => provider.parse()?,
            None if api_key.is_some() => Provider::OpenAiCompatible,
            None => Provider::Offline,
        };
        let timeout = match env_any(&["SNIPPETLAB_LLM_TIMEOUT_SECS"]) {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                GatewayError::Config(format!("invalid SNIPPETLAB_LLM_TIMEOUT_SECS '{}'", raw))
            })?),
            None => Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        };

        Ok(Self {
            provider,
            model: env_any(&["SNIPPETLAB_LLM_MODEL"]).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base_url: env_any(&["SNIPPETLAB_LLM_API_BASE_URL", "OPENAI_API_BASE"]),
            api_key,
            timeout,
        })
    }

    /// The chat completions base URL, configured or provider default.
    pub fn base_url(&self) -> Result<String, GatewayError> {
        self.api_base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .ok_or_else(|| {
                GatewayError::Config(format!(
                    "provider '{}' has no chat completions endpoint",
                    self.provider.as_str()
                ))
            })
    }

    /// Builds the configured model client.
    pub fn build_model(&self) -> Result<Arc<dyn LanguageModel>, GatewayError> {
        let model: Arc<dyn LanguageModel> = match self.provider {
            Provider::Offline => Arc::new(OfflineModel),
            Provider::OpenAiCompatible | Provider::OpenRouter => {
                Arc::new(ChatCompletionModel::new(self.clone())?)
            }
        };
        Ok(model)
    }
}

/// Execution sandbox settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Interpreter used for Python snippets.
    pub python: String,
    /// Wall-clock limit per run.
    pub timeout: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            timeout: Duration::from_millis(DEFAULT_RUN_TIMEOUT_MS),
        }
    }
}

impl SandboxConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            python: env_any(&["SNIPPETLAB_PYTHON"]).unwrap_or(defaults.python),
            timeout: env_any(&["SNIPPETLAB_RUN_TIMEOUT_MS"])
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn build_sandbox(&self) -> Arc<dyn Sandbox> {
        Arc::new(PythonSandbox::new(self))
    }
}

/// Everything needed to build the pipeline's collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub llm: LlmConfig,
    pub sandbox: SandboxConfig,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self {
            llm: LlmConfig::from_env()?,
            sandbox: SandboxConfig::from_env(),
        })
    }
}

/// First non-empty value among `names`.
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!(
            "openrouter".parse::<Provider>().unwrap(),
            Provider::OpenRouter
        );
        assert_eq!(
            " OpenAI_Compatible ".parse::<Provider>().unwrap(),
            Provider::OpenAiCompatible
        );
        assert!("anthropic".parse::<Provider>().is_err());
    }

    #[test]
    fn base_url_falls_back_to_provider_default() {
        let config = LlmConfig {
            provider: Provider::OpenRouter,
            ..LlmConfig::default()
        };
        assert_eq!(config.base_url().unwrap(), "https://openrouter.ai/api/v1");

        let config = LlmConfig {
            provider: Provider::OpenAiCompatible,
            api_base_url: Some("http://localhost:8080/v1".into()),
            ..LlmConfig::default()
        };
        assert_eq!(config.base_url().unwrap(), "http://localhost:8080/v1");

        assert!(LlmConfig::default().base_url().is_err());
    }

    #[test]
    fn sandbox_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.python, "python3");
        assert_eq!(config.timeout, Duration::from_millis(5000));
    }
}
