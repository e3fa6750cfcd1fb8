use std::{path::PathBuf, sync::Arc};

use crate::assets::TemplateStore;

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<TemplateStore>,
}

impl AppState {
    /// Asset locations come from the environment with in-repo defaults:
    /// `TEMPLATES_DIR` for the background images, `CERT_FONT` for the
    /// render font. Both are resolved lazily at first use.
    pub fn from_env() -> Self {
        let dir = std::env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/templates"));
        let font = std::env::var("CERT_FONT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/fonts/DejaVuSans-Bold.ttf"));

        Self {
            templates: Arc::new(TemplateStore::new(dir, font)),
        }
    }
}
