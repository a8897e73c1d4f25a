//! Page settings
//!
//! Host-side knobs (selectors, link bases, allow-listed messaging domain)
//! stored as TOML. Every field has a default so a partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::dom::Selector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    /// Id of the inline element carrying the JSON payload
    #[serde(default = "default_config_element_id")]
    pub config_element_id: String,

    /// Element whose rendered height sits above the decision line
    #[serde(default = "default_header_selector")]
    pub header_selector: String,

    /// Table-of-contents anchors, in document order
    #[serde(default = "default_toc_link_selector")]
    pub toc_link_selector: String,

    /// Gap between the header bottom and the decision line, in CSS pixels
    #[serde(default = "default_decision_padding")]
    pub decision_padding: f64,

    /// Messaging links must point at this host or one of its subdomains
    #[serde(default = "default_messaging_domain")]
    pub messaging_domain: String,

    /// Social profile base; per-user links append the handle
    #[serde(default = "default_social_root_url")]
    pub social_root_url: String,

    /// Map search base; the encoded address is appended
    #[serde(default = "default_map_search_url")]
    pub map_search_url: String,

    /// Shown in place of a missing or rejected email address
    #[serde(default = "default_email_placeholder")]
    pub email_placeholder: String,

    /// Section ids the boot self-check expects to find
    #[serde(default = "default_required_sections")]
    pub required_sections: Vec<String>,
}

fn default_config_element_id() -> String {
    "club-config".to_string()
}

fn default_header_selector() -> String {
    "header".to_string()
}

fn default_toc_link_selector() -> String {
    r##"nav.toc a[href^="#"]"##.to_string()
}

fn default_decision_padding() -> f64 {
    24.0
}

fn default_messaging_domain() -> String {
    "line.me".to_string()
}

fn default_social_root_url() -> String {
    "https://x.com/".to_string()
}

fn default_map_search_url() -> String {
    "https://www.google.com/maps?q=".to_string()
}

fn default_email_placeholder() -> String {
    "（後日掲載）".to_string()
}

fn default_required_sections() -> Vec<String> {
    vec!["about".to_string(), "qa".to_string()]
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            config_element_id: default_config_element_id(),
            header_selector: default_header_selector(),
            toc_link_selector: default_toc_link_selector(),
            decision_padding: default_decision_padding(),
            messaging_domain: default_messaging_domain(),
            social_root_url: default_social_root_url(),
            map_search_url: default_map_search_url(),
            email_placeholder: default_email_placeholder(),
            required_sections: default_required_sections(),
        }
    }
}

impl PageSettings {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load settings from `path` (or the default location)
    ///
    /// A missing file yields defaults; a file that fails to parse is an error
    /// so a typo never silently reverts the page to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut settings = match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents)
                .context(format!("Failed to parse settings file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(e).context(format!("Failed to read settings file {}", path.display()));
            }
        };
        settings.apply_env_overrides();
        settings.validate_and_clamp();
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(contents).context("Invalid settings TOML")?;
        settings.validate_and_clamp();
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings to TOML")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create settings directory: {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .context(format!("Failed to write settings file to {}", path.display()))?;
        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var("DECISION_PADDING") {
            match raw.trim().parse::<f64>() {
                Ok(padding) => self.decision_padding = padding,
                Err(e) => error!(var = "DECISION_PADDING", value = %raw, error = ?e, "failed to parse env var"),
            }
        }
        if let Ok(domain) = env::var("MESSAGING_DOMAIN") {
            self.messaging_domain = domain;
        }
    }

    /// Repair out-of-range or malformed values, falling back to defaults
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if !self.decision_padding.is_finite() || self.decision_padding < 0.0 {
            warn!(decision_padding = self.decision_padding, using = default_decision_padding(), "decision_padding invalid, using default");
            self.decision_padding = default_decision_padding();
        } else if self.decision_padding > MAX_DECISION_PADDING {
            warn!(decision_padding = self.decision_padding, max = MAX_DECISION_PADDING, "decision_padding exceeds maximum, clamping");
            self.decision_padding = MAX_DECISION_PADDING;
        }

        for (name, selector, fallback) in [
            ("header_selector", &mut self.header_selector, default_header_selector()),
            ("toc_link_selector", &mut self.toc_link_selector, default_toc_link_selector()),
        ] {
            if let Err(e) = Selector::parse(selector.as_str()) {
                warn!(setting = name, selector = %selector, error = %e, "invalid selector, using default");
                *selector = fallback;
            }
        }

        let domain = self.messaging_domain.trim().trim_end_matches('.').to_ascii_lowercase();
        if domain.is_empty() || domain.contains(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '.')) {
            warn!(messaging_domain = %self.messaging_domain, using = %default_messaging_domain(), "messaging_domain invalid, using default");
            self.messaging_domain = default_messaging_domain();
        } else {
            self.messaging_domain = domain;
        }

        for (name, url, fallback) in [
            ("social_root_url", &mut self.social_root_url, default_social_root_url()),
            ("map_search_url", &mut self.map_search_url, default_map_search_url()),
        ] {
            if !url.starts_with("https://") {
                warn!(setting = name, url = %url, using = %fallback, "link base must be https, using default");
                *url = fallback;
            }
        }
        if !self.social_root_url.ends_with('/') {
            self.social_root_url.push('/');
        }

        if self.email_placeholder.trim().is_empty() {
            warn!(using = %default_email_placeholder(), "email_placeholder empty, using default");
            self.email_placeholder = default_email_placeholder();
        }

        self.required_sections.retain(|id| !id.trim().is_empty());
    }
}
