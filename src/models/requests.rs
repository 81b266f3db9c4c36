//! Request DTOs for the configuration API
//!
//! Query strings use the camelCase parameter names existing callers send.

use serde::Deserialize;

use crate::keys::{ConfigAddress, NamedConfigAddress};

/// Query identifying a named config (GET /fetchNamedConfig)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedConfigQuery {
    pub version: String,
    pub app_name: String,
    pub module_name: String,
    pub config_name: String,
    pub named_config: String,
}

impl From<NamedConfigQuery> for NamedConfigAddress {
    fn from(q: NamedConfigQuery) -> Self {
        NamedConfigAddress::new(q.version, q.app_name, q.module_name, q.config_name, q.named_config)
    }
}

/// Query identifying a single parameter (fetch and put endpoints)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigQuery {
    pub version: String,
    pub app_name: String,
    pub module_name: String,
    pub config_name: String,
    pub named_config: String,
    pub parameter_name: String,
}

impl From<ConfigQuery> for ConfigAddress {
    fn from(q: ConfigQuery) -> Self {
        ConfigAddress::new(
            q.version,
            q.app_name,
            q.module_name,
            q.config_name,
            q.named_config,
            q.parameter_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_query_deserialize() {
        let json = r#"{"version":"v1","appName":"AppX","moduleName":"ModY",
            "configName":"cfg","namedConfig":"uat","parameterName":"limit"}"#;
        let query: ConfigQuery = serde_json::from_str(json).unwrap();
        let address: ConfigAddress = query.into();
        assert_eq!(address, ConfigAddress::new("v1", "AppX", "ModY", "cfg", "uat", "limit"));
    }

    #[test]
    fn test_config_query_requires_parameter() {
        let json = r#"{"version":"v1","appName":"AppX","moduleName":"ModY",
            "configName":"cfg","namedConfig":"uat"}"#;
        assert!(serde_json::from_str::<ConfigQuery>(json).is_err());
        assert!(serde_json::from_str::<NamedConfigQuery>(json).is_ok());
    }
}
