use serde::{Deserialize, Serialize};

const DOTNET_RUNTIME_MARKER: &str = "dotnet";

/// Subset of the remote site configuration used for runtime detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSiteConfig {
    /// Runtime stack descriptor, e.g. `DOTNETCORE|8.0`
    #[serde(default)]
    pub linux_fx_version: Option<String>,
}

impl RemoteSiteConfig {
    pub fn with_runtime(runtime: impl Into<String>) -> Self {
        Self {
            linux_fx_version: Some(runtime.into()),
        }
    }

    pub fn runtime_identifier(&self) -> Option<&str> {
        self.linux_fx_version.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_dotnet(&self) -> bool {
        self.runtime_identifier()
            .map(|r| r.to_lowercase().contains(DOTNET_RUNTIME_MARKER))
            .unwrap_or(false)
    }
}
