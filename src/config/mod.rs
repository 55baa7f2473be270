use crate::core::error::DriveThruError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    OpenRouter,
    Anthropic,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "openrouter" => Some(Provider::OpenRouter),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    /// Environment variable consulted when the config carries no key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    pub active_provider: Option<Provider>,
    #[serde(default)]
    pub providers: HashMap<Provider, ProviderConfig>,
    /// Remote menu page; the bundled menu is used when unset and the
    /// default page is unreachable.
    pub menu_url: Option<String>,
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join(".drivethru").join("config.yaml")
    }

    pub fn load() -> Result<Config, DriveThruError> {
        let path = Self::config_path();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config = serde_yml::from_str::<Config>(&contents)
                .map_err(|e| DriveThruError::Config(format!("Parse {}: {}", path.display(), e)))?;
            return Ok(config);
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let config = Config::default();
        let _ = config.save();
        Ok(config)
    }

    pub fn save(&self) -> Result<(), DriveThruError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(&path, yaml_content)?;
        Ok(())
    }

    /// Per-provider config with the API key resolved from the config file
    /// or the provider's environment variable. A missing key is a fatal
    /// configuration error at startup.
    pub fn resolve_provider(&self, provider: Provider) -> Result<ProviderConfig, DriveThruError> {
        let mut resolved = self.providers.get(&provider).cloned().unwrap_or_default();

        if resolved.api_key.is_none() {
            resolved.api_key = env::var(provider.api_key_env()).ok().filter(|k| !k.is_empty());
        }

        if resolved.api_key.is_none() {
            return Err(DriveThruError::Config(format!(
                "No API key for {:?}: set {} or add it to {}",
                provider,
                provider.api_key_env(),
                Self::config_path().display()
            )));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_str_is_case_insensitive() {
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("ANTHROPIC"), Some(Provider::Anthropic));
        assert_eq!(Provider::from_str("gemini"), None);
    }

    #[test]
    fn config_roundtrips_through_yaml() {
        let mut providers = HashMap::new();
        providers.insert(
            Provider::OpenAI,
            ProviderConfig {
                api_key: Some("sk-test".to_string()),
                base_url: None,
                model: Some("gpt-4.1-mini".to_string()),
            },
        );
        let config = Config {
            active_provider: Some(Provider::OpenAI),
            providers,
            menu_url: Some("https://example.com/menu.html".to_string()),
        };

        let yaml = serde_yml::to_string(&config).unwrap();
        let parsed: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.active_provider, Some(Provider::OpenAI));
        assert_eq!(
            parsed.providers[&Provider::OpenAI].model.as_deref(),
            Some("gpt-4.1-mini")
        );
        assert_eq!(parsed.menu_url.as_deref(), Some("https://example.com/menu.html"));
    }

    #[test]
    fn resolve_provider_requires_a_key() {
        // ensure the env fallback does not interfere
        unsafe { env::remove_var("OPENROUTER_API_KEY") };

        let config = Config::default();
        let err = config.resolve_provider(Provider::OpenRouter).unwrap_err();
        assert!(matches!(err, DriveThruError::Config(_)));
    }

    #[test]
    fn resolve_provider_reads_the_environment() {
        unsafe { env::set_var("ANTHROPIC_API_KEY", "sk-ant-test") };

        let config = Config::default();
        let resolved = config.resolve_provider(Provider::Anthropic).unwrap();
        assert_eq!(resolved.api_key.as_deref(), Some("sk-ant-test"));

        unsafe { env::remove_var("ANTHROPIC_API_KEY") };
    }
}
