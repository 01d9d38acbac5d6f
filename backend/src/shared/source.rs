use regex::Regex;
use std::sync::OnceLock;

/// Sentinel source reference that forces synthetic data
pub const SIMULATION_SENTINEL: &str = "simulation";

/// Default pattern extracting the document id from a share URL
pub const DEFAULT_ID_PATTERN: &str = r"/d/([a-zA-Z0-9_-]+)";

/// Default tabular-export URL; `{id}` is replaced with the document id
pub const DEFAULT_EXPORT_URL_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{id}/export?format=csv";

const ID_PLACEHOLDER: &str = "{id}";

/// Errors raised while building a source configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceConfigError {
    #[error("Invalid document id pattern: {0}")]
    InvalidPattern(String),

    #[error("Export URL template must contain {{id}}: {0}")]
    InvalidTemplate(String),
}

/// Where the ingestor should get its data from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    /// Synthetic data was explicitly requested
    Simulation,
    /// Fetch delimited text from this URL
    Fetch(String),
}

/// Injectable source resolution settings
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub default_source_url: String,
    pub id_pattern: Regex,
    pub export_url_template: String,
}

impl SourceConfig {
    /// Create a config with the default id pattern and export template
    pub fn new(default_source_url: impl Into<String>) -> Self {
        static DEFAULT_REGEX: OnceLock<Regex> = OnceLock::new();
        let id_pattern = DEFAULT_REGEX
            .get_or_init(|| Regex::new(DEFAULT_ID_PATTERN).unwrap())
            .clone();

        Self {
            default_source_url: default_source_url.into(),
            id_pattern,
            export_url_template: DEFAULT_EXPORT_URL_TEMPLATE.to_string(),
        }
    }

    /// Replace the id pattern. The pattern must have a capture group for the id.
    pub fn with_id_pattern(mut self, pattern: &str) -> Result<Self, SourceConfigError> {
        let regex =
            Regex::new(pattern).map_err(|e| SourceConfigError::InvalidPattern(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(SourceConfigError::InvalidPattern(format!(
                "{} has no capture group",
                pattern
            )));
        }
        self.id_pattern = regex;
        Ok(self)
    }

    pub fn with_export_url_template(
        mut self,
        template: impl Into<String>,
    ) -> Result<Self, SourceConfigError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(SourceConfigError::InvalidTemplate(template));
        }
        self.export_url_template = template;
        Ok(self)
    }

    /// Resolve a caller-supplied source reference
    ///
    /// - `"simulation"` → `SourceRequest::Simulation`
    /// - a share URL matching `id_pattern` → the export URL for that document
    /// - any other string → fetched verbatim
    /// - absent or blank → the default source URL, rewritten the same way
    pub fn resolve(&self, source_ref: Option<&str>) -> SourceRequest {
        let source_ref = source_ref.map(str::trim).filter(|s| !s.is_empty());

        match source_ref {
            Some(SIMULATION_SENTINEL) => SourceRequest::Simulation,
            Some(reference) => SourceRequest::Fetch(self.export_url_for(reference)),
            None => SourceRequest::Fetch(self.export_url_for(&self.default_source_url)),
        }
    }

    /// Rewrite a share URL to its export form, or return it unchanged
    pub fn export_url_for(&self, reference: &str) -> String {
        let Some(document_id) = self
            .id_pattern
            .captures(reference)
            .and_then(|caps| caps.get(1))
        else {
            return reference.to_string();
        };

        let mut url = self
            .export_url_template
            .replace(ID_PLACEHOLDER, document_id.as_str());

        if let Some(gid) = sheet_gid(reference) {
            if !url.contains("gid=") {
                let separator = if url.contains('?') { '&' } else { '?' };
                url.push(separator);
                url.push_str("gid=");
                url.push_str(gid);
            }
        }

        url
    }
}

/// Extract a sheet tab selector (`gid=<n>`) from a query string or fragment
fn sheet_gid(reference: &str) -> Option<&str> {
    static GID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = GID_REGEX.get_or_init(|| Regex::new(r"[?&#]gid=([0-9]+)").unwrap());

    regex
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_URL: &str = "https://example.com/feed.csv";

    fn config() -> SourceConfig {
        SourceConfig::new(DEFAULT_URL)
    }

    #[test]
    fn test_resolve_simulation() {
        assert_eq!(config().resolve(Some("simulation")), SourceRequest::Simulation);
        assert_eq!(
            config().resolve(Some("  simulation ")),
            SourceRequest::Simulation
        );
    }

    #[test]
    fn test_resolve_absent_uses_default() {
        assert_eq!(
            config().resolve(None),
            SourceRequest::Fetch(DEFAULT_URL.to_string())
        );
        assert_eq!(
            config().resolve(Some("   ")),
            SourceRequest::Fetch(DEFAULT_URL.to_string())
        );
    }

    #[test]
    fn test_resolve_default_share_url_rewritten() {
        let config = SourceConfig::new("https://docs.google.com/spreadsheets/d/base01/edit");
        assert_eq!(
            config.resolve(None),
            SourceRequest::Fetch(
                "https://docs.google.com/spreadsheets/d/base01/export?format=csv".to_string()
            )
        );
    }

    #[test]
    fn test_resolve_share_url_rewritten() {
        let share = "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit?usp=sharing";
        assert_eq!(
            config().resolve(Some(share)),
            SourceRequest::Fetch(
                "https://docs.google.com/spreadsheets/d/1AbC-d_9/export?format=csv".to_string()
            )
        );
    }

    #[test]
    fn test_resolve_share_url_keeps_gid() {
        let share = "https://docs.google.com/spreadsheets/d/1AbC/edit#gid=123456";
        assert_eq!(
            config().export_url_for(share),
            "https://docs.google.com/spreadsheets/d/1AbC/export?format=csv&gid=123456"
        );
    }

    #[test]
    fn test_resolve_export_url_is_stable() {
        let export = "https://docs.google.com/spreadsheets/d/1AbC/export?format=csv";
        assert_eq!(config().export_url_for(export), export);
    }

    #[test]
    fn test_resolve_plain_url_verbatim() {
        let plain = "https://sensors.example.org/npk/latest.csv";
        assert_eq!(
            config().resolve(Some(plain)),
            SourceRequest::Fetch(plain.to_string())
        );
    }

    #[test]
    fn test_custom_id_pattern_and_template() {
        let config = config()
            .with_id_pattern(r"/sheet/([0-9]+)")
            .unwrap()
            .with_export_url_template("https://files.example.org/{id}.csv")
            .unwrap();

        assert_eq!(
            config.export_url_for("https://app.example.org/sheet/42/view"),
            "https://files.example.org/42.csv"
        );
    }

    #[test]
    fn test_id_pattern_without_group_rejected() {
        let result = config().with_id_pattern(r"/d/[a-z]+");
        assert!(matches!(result, Err(SourceConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = config().with_id_pattern(r"/d/([a-z+");
        assert!(matches!(result, Err(SourceConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let result = config().with_export_url_template("https://example.com/export.csv");
        assert!(matches!(result, Err(SourceConfigError::InvalidTemplate(_))));
    }
}
