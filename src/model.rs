use serde::{Deserialize, Serialize};

/// Reported when no detection mechanism yields a database version.
pub const DATABASE_VERSION_UNAVAILABLE: &str = "n/a";

/// Snapshot of a deployment's identifying metadata, ready to hand to a collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataHarvest {
    pub platform_version: String,
    pub runtime_version: String,
    pub site_name: Option<String>,
    pub server_software: Option<String>,
    pub database_version: String,  // "n/a" if undeterminable
    pub deployment_context: String, // e.g., "Production/Staging"
    pub uses_dependency_manager: bool,
    pub installed_modules: Vec<ExtensionVersion>,
}

impl DataHarvest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionVersion {
    pub key: String,
    pub version: String,
}

/// Entry of the host's package registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub key: String,
    pub version: String,
    pub part_of_factory_default: bool, // bundled with the core distribution
}

impl Package {
    pub fn new(key: impl Into<String>, version: impl Into<String>, factory_default: bool) -> Self {
        Self {
            key: key.into(),
            version: version.into(),
            part_of_factory_default: factory_default,
        }
    }
}
