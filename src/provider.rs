use serde::{Deserialize, Serialize};

/// Backend LLM providers the settings form can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    Openai,
    Anthropic,
    Local,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Groq,
        Provider::Openai,
        Provider::Anthropic,
        Provider::Local,
    ];
}

/// Provider configuration as exchanged with the backend:
/// `{"provider": "<tag>", "config": {...}}` with a disjoint field set per
/// variant. Missing fields deserialize as empty strings; the backend may
/// return a masked API key, which the client treats as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "config", rename_all = "lowercase")]
pub enum ProviderConfig {
    Groq {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        model: String,
    },
    Openai {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        model: String,
    },
    Anthropic {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        model: String,
    },
    Local {
        #[serde(default)]
        endpoint_url: String,
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        model: String,
    },
}

impl ProviderConfig {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderConfig::Groq { .. } => Provider::Groq,
            ProviderConfig::Openai { .. } => Provider::Openai,
            ProviderConfig::Anthropic { .. } => Provider::Anthropic,
            ProviderConfig::Local { .. } => Provider::Local,
        }
    }

    /// Split a loaded config into its variant tag and editable fields.
    pub fn into_fields(self) -> (Provider, ProviderFields) {
        match self {
            ProviderConfig::Groq { api_key, model } => (
                Provider::Groq,
                ProviderFields {
                    api_key,
                    model,
                    endpoint_url: String::new(),
                },
            ),
            ProviderConfig::Openai { api_key, model } => (
                Provider::Openai,
                ProviderFields {
                    api_key,
                    model,
                    endpoint_url: String::new(),
                },
            ),
            ProviderConfig::Anthropic { api_key, model } => (
                Provider::Anthropic,
                ProviderFields {
                    api_key,
                    model,
                    endpoint_url: String::new(),
                },
            ),
            ProviderConfig::Local {
                endpoint_url,
                api_key,
                model,
            } => (
                Provider::Local,
                ProviderFields {
                    api_key,
                    model,
                    endpoint_url,
                },
            ),
        }
    }
}

/// Editable field group backing one provider variant in the settings form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderFields {
    pub api_key: String,
    pub model: String,
    pub endpoint_url: String,
}

/// Static per-provider metadata: one table instead of repeated per-provider
/// branches, shared by the save and test-connection paths.
pub struct ProviderSpec {
    pub provider: Provider,
    pub label: &'static str,
    pub default_model: &'static str,
    pub has_endpoint: bool,
    pub key_required: bool,
    pub missing_field_error: &'static str,
}

static PROVIDER_SPECS: [ProviderSpec; 4] = [
    ProviderSpec {
        provider: Provider::Groq,
        label: "Groq",
        default_model: "llama-3.1-8b-instant",
        has_endpoint: false,
        key_required: true,
        missing_field_error: "Groq API key is required",
    },
    ProviderSpec {
        provider: Provider::Openai,
        label: "OpenAI",
        default_model: "gpt-4",
        has_endpoint: false,
        key_required: true,
        missing_field_error: "OpenAI API key is required",
    },
    ProviderSpec {
        provider: Provider::Anthropic,
        label: "Anthropic",
        default_model: "claude-3-sonnet-20240229",
        has_endpoint: false,
        key_required: true,
        missing_field_error: "Anthropic API key is required",
    },
    ProviderSpec {
        provider: Provider::Local,
        label: "Local model",
        default_model: "llama2",
        has_endpoint: true,
        key_required: false,
        missing_field_error: "Endpoint URL is required for local models",
    },
];

pub fn spec(provider: Provider) -> &'static ProviderSpec {
    match provider {
        Provider::Groq => &PROVIDER_SPECS[0],
        Provider::Openai => &PROVIDER_SPECS[1],
        Provider::Anthropic => &PROVIDER_SPECS[2],
        Provider::Local => &PROVIDER_SPECS[3],
    }
}

/// Required-field check applied before any save or test-connection request.
pub fn validate(provider: Provider, fields: &ProviderFields) -> Result<(), &'static str> {
    let spec = spec(provider);
    if spec.key_required && fields.api_key.trim().is_empty() {
        return Err(spec.missing_field_error);
    }
    if spec.has_endpoint && fields.endpoint_url.trim().is_empty() {
        return Err(spec.missing_field_error);
    }
    Ok(())
}

/// Build the wire config for the selected variant from its own fields only.
pub fn assemble(provider: Provider, fields: &ProviderFields) -> ProviderConfig {
    match provider {
        Provider::Groq => ProviderConfig::Groq {
            api_key: fields.api_key.clone(),
            model: fields.model.clone(),
        },
        Provider::Openai => ProviderConfig::Openai {
            api_key: fields.api_key.clone(),
            model: fields.model.clone(),
        },
        Provider::Anthropic => ProviderConfig::Anthropic {
            api_key: fields.api_key.clone(),
            model: fields.model.clone(),
        },
        Provider::Local => ProviderConfig::Local {
            endpoint_url: fields.endpoint_url.clone(),
            api_key: fields.api_key.clone(),
            model: fields.model.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(api_key: &str, model: &str, endpoint_url: &str) -> ProviderFields {
        ProviderFields {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint_url: endpoint_url.to_string(),
        }
    }

    #[test]
    fn key_providers_require_an_api_key() {
        for provider in [Provider::Groq, Provider::Openai, Provider::Anthropic] {
            let err = validate(provider, &fields("", "some-model", "")).unwrap_err();
            assert!(err.contains("API key is required"), "{err}");
            assert!(validate(provider, &fields("sk-123", "some-model", "")).is_ok());
        }
    }

    #[test]
    fn local_requires_endpoint_but_not_key() {
        let err = validate(Provider::Local, &fields("", "llama2", "")).unwrap_err();
        assert_eq!(err, "Endpoint URL is required for local models");
        assert!(validate(Provider::Local, &fields("", "llama2", "http://localhost:11434")).is_ok());
    }

    #[test]
    fn assemble_reads_only_the_selected_variant() {
        let config = assemble(Provider::Groq, &fields("gsk-1", "llama-3.1-8b-instant", "ignored"));
        assert_eq!(
            config,
            ProviderConfig::Groq {
                api_key: "gsk-1".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
            }
        );
    }

    #[test]
    fn wire_shape_is_provider_plus_config() {
        let config = ProviderConfig::Local {
            endpoint_url: "http://localhost:11434".to_string(),
            api_key: String::new(),
            model: "llama2".to_string(),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["provider"], "local");
        assert_eq!(value["config"]["endpoint_url"], "http://localhost:11434");
    }

    #[test]
    fn missing_config_fields_deserialize_empty() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"provider":"openai","config":{}}"#).unwrap();
        let (provider, fields) = config.into_fields();
        assert_eq!(provider, Provider::Openai);
        assert!(fields.api_key.is_empty());
        assert!(fields.model.is_empty());
    }

    #[test]
    fn default_models_match_the_documented_literals() {
        assert_eq!(spec(Provider::Groq).default_model, "llama-3.1-8b-instant");
        assert_eq!(spec(Provider::Openai).default_model, "gpt-4");
        assert_eq!(spec(Provider::Anthropic).default_model, "claude-3-sonnet-20240229");
        assert_eq!(spec(Provider::Local).default_model, "llama2");
    }
}
