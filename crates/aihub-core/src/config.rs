use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// When no session is persisted, create and persist a demo session on
    /// load instead of ending up `Unauthenticated`. A demo-build convenience;
    /// `false` fails closed.
    pub demo_auto_login: bool,
    /// Base URL for the (currently unused) backend API client.
    pub api_base_url: Option<String>,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            demo_auto_login: false,
            api_base_url: None,
        }
    }

    pub fn with_demo_auto_login(mut self, enabled: bool) -> Self {
        self.demo_auto_login = enabled;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new("aihub_data")
    }
}
