use application::ReadingLifecycleService;

/// Shared state handed to every request handler.
pub struct AppState {
    pub readings: ReadingLifecycleService,
    /// Prefix for returned image URLs, e.g. "http://localhost:3000".
    /// When unset, relative paths are returned.
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new(readings: ReadingLifecycleService, public_base_url: Option<String>) -> Self {
        Self {
            readings,
            public_base_url,
        }
    }

    pub fn absolute_image_url(&self, url_path: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), url_path),
            None => url_path.to_string(),
        }
    }
}
