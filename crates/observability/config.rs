use std::env;

/// Identifies the emitting process in every log line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    /// Fallback directive when `RUST_LOG` is unset or invalid.
    pub(crate) default_directive: String,
    /// Collected while parsing so they can be logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let component = component.trim().to_string();
        let mut warnings = Vec::new();

        let service_name = non_empty(lookup("SERVICE_NAME")).unwrap_or_else(|| component.clone());
        let environment =
            non_empty(lookup("STAGE")).unwrap_or_else(|| "unknown".to_string());

        let default_directive = match non_empty(lookup("LOG_LEVEL")) {
            Some(raw) => match parse_level(&raw) {
                Some(level) => level.to_string(),
                None => {
                    warnings.push(format!(
                        "LOG_LEVEL is invalid (value: {raw}); defaulting to info"
                    ));
                    "info".to_string()
                }
            },
            None => "info".to_string(),
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            default_directive,
            warnings,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_level(input: &str) -> Option<&'static str> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
