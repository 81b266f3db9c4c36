//! Configuration Address Model
//!
//! Identifies a named config (the parameter set) and a single parameter
//! within it.

use std::fmt;

// == Named Config Address ==
/// Address of one named configuration, i.e. a set of parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedConfigAddress {
    /// Configuration schema version, carried as text
    pub version: String,
    /// Owning application
    pub app_name: String,
    /// Module within the application
    pub module_name: String,
    /// Config set name
    pub config_name: String,
    /// Named config within the config set (e.g. an environment)
    pub named_config: String,
}

impl NamedConfigAddress {
    pub fn new(
        version: impl Into<String>,
        app_name: impl Into<String>,
        module_name: impl Into<String>,
        config_name: impl Into<String>,
        named_config: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            app_name: app_name.into(),
            module_name: module_name.into(),
            config_name: config_name.into(),
            named_config: named_config.into(),
        }
    }

    /// Narrows this address to a single parameter.
    pub fn parameter(self, parameter_name: impl Into<String>) -> ConfigAddress {
        ConfigAddress {
            named: self,
            parameter_name: parameter_name.into(),
        }
    }

    /// Components in key order, paired with their field names.
    pub(crate) fn segments(&self) -> [(&'static str, &str); 5] {
        [
            ("appName", self.app_name.as_str()),
            ("moduleName", self.module_name.as_str()),
            ("version", self.version.as_str()),
            ("configName", self.config_name.as_str()),
            ("namedConfig", self.named_config.as_str()),
        ]
    }
}

impl fmt::Display for NamedConfigAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}/{}/{}",
            self.app_name, self.module_name, self.version, self.config_name, self.named_config
        )
    }
}

// == Config Address ==
/// Full address of one configuration parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigAddress {
    /// The named config the parameter belongs to
    pub named: NamedConfigAddress,
    /// Parameter name
    pub parameter_name: String,
}

impl ConfigAddress {
    pub fn new(
        version: impl Into<String>,
        app_name: impl Into<String>,
        module_name: impl Into<String>,
        config_name: impl Into<String>,
        named_config: impl Into<String>,
        parameter_name: impl Into<String>,
    ) -> Self {
        NamedConfigAddress::new(version, app_name, module_name, config_name, named_config)
            .parameter(parameter_name)
    }
}

impl fmt::Display for ConfigAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.named, self.parameter_name)
    }
}
