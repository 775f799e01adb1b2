use serde::{Deserialize, Serialize};

/// A deployed site as seen by the health probes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteHandle {
    pub name: String,
    pub default_host_name: String,
    #[serde(default)]
    pub is_linux: bool,
}

impl SiteHandle {
    pub fn new(name: impl Into<String>, default_host_name: impl Into<String>, is_linux: bool) -> Self {
        Self {
            name: name.into(),
            default_host_name: default_host_name.into(),
            is_linux,
        }
    }

    /// Base URL of the site; bare host names are served over https
    pub fn url(&self) -> String {
        let host = self.default_host_name.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}
