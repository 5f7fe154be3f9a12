// Worker queue connection settings

use reportflow_core::domain::JobKind;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://queue.fal.run";

/// Connection settings for the worker queue
///
/// Each job kind is served by its own queue application (`{base_url}/{app}`).
#[derive(Debug, Clone)]
pub struct FalConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub pdf_app: String,
    pub analysis_app: String,
    pub timeout: Duration,
}

impl FalConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            pdf_app: "reportflow/pdf-render".to_string(),
            analysis_app: "reportflow/data-analysis".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_apps(mut self, pdf_app: impl Into<String>, analysis_app: impl Into<String>) -> Self {
        self.pdf_app = pdf_app.into();
        self.analysis_app = analysis_app.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queue application for a job kind
    pub fn app(&self, kind: JobKind) -> &str {
        match kind {
            JobKind::Pdf => &self.pdf_app,
            JobKind::Analysis => &self.analysis_app,
        }
    }

    /// `{base_url}/{app}` with surplus slashes removed
    pub fn app_url(&self, kind: JobKind) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.app(kind).trim_matches('/')
        )
    }
}

impl Default for FalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
