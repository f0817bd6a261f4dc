//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub assets_dir: String,

    // Home page
    pub home_posts: usize,
    pub home_projects: usize,

    // Content store
    #[serde(default)]
    pub cms: CmsConfig,

    // Contact form delivery
    #[serde(default)]
    pub mail: MailConfig,

    // Page rendering
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            assets_dir: "assets".to_string(),

            home_posts: 3,
            home_projects: 6,

            cms: CmsConfig::default(),
            mail: MailConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored, so an exported-but-blank variable never
    /// clears a value set in `_config.yml`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(project_id) = first(&[
            "SANITY_PROJECT_ID",
            "VITE_SANITY_PROJECT_ID",
            "NEXT_PUBLIC_SANITY_PROJECT_ID",
        ]) {
            self.cms.project_id = project_id;
        }
        if let Some(dataset) = first(&[
            "SANITY_DATASET",
            "VITE_SANITY_DATASET",
            "NEXT_PUBLIC_SANITY_DATASET",
        ]) {
            self.cms.dataset = dataset;
        }
        if let Some(api_version) = first(&[
            "SANITY_API_VERSION",
            "VITE_SANITY_API_VERSION",
            "NEXT_PUBLIC_SANITY_API_VERSION",
        ]) {
            self.cms.api_version = api_version;
        }
        if let Some(token) = first(&["SANITY_API_TOKEN"]) {
            self.cms.token = Some(token);
        }
        if let Some(api_key) = first(&["RESEND_API_KEY"]) {
            self.mail.api_key = Some(api_key);
        }
        if let Some(to) = first(&["CONTACT_TO_EMAIL"]) {
            self.mail.to = to;
        }
    }
}

/// Headless content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Overrides the computed API host, mostly useful for local mocks
    pub api_host: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-02-02".to_string(),
            use_cdn: false,
            token: None,
            api_host: None,
        }
    }
}

impl CmsConfig {
    /// Whether enough is configured to reach a store
    pub fn is_configured(&self) -> bool {
        !self.project_id.trim().is_empty() && !self.dataset.trim().is_empty()
    }
}

/// Transactional mail configuration for the contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub from: String,
    pub to: String,
    pub subject: String,
    /// How long the success banner stays visible
    pub banner_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from: "Portfolio <onboarding@resend.dev>".to_string(),
            to: String::new(),
            subject: "New enquiry from your portfolio".to_string(),
            banner_seconds: 5,
        }
    }
}

/// Page rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Upper bound on how long a page waits for its sections
    pub render_deadline_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            render_deadline_ms: 8000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Portfolio");
        assert_eq!(config.home_posts, 3);
        assert_eq!(config.cms.api_version, "2024-02-02");
        assert!(!config.cms.is_configured());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Jane's Work
author: Jane
cms:
  project_id: abc123
  use_cdn: true
mail:
  to: jane@example.com
server:
  render_deadline_ms: 2500
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Jane's Work");
        assert_eq!(config.cms.project_id, "abc123");
        assert_eq!(config.cms.dataset, "production");
        assert!(config.cms.use_cdn);
        assert!(config.cms.is_configured());
        assert_eq!(config.mail.to, "jane@example.com");
        assert_eq!(config.mail.banner_seconds, 5);
        assert_eq!(config.server.render_deadline_ms, 2500);
    }

    #[test]
    fn test_env_overrides_follow_lookup_order() {
        let vars: HashMap<&str, &str> = [
            ("VITE_SANITY_PROJECT_ID", "from-vite"),
            ("NEXT_PUBLIC_SANITY_PROJECT_ID", "from-next"),
            ("SANITY_DATASET", "staging"),
            ("SANITY_API_VERSION", "   "),
            ("RESEND_API_KEY", "re_123"),
        ]
        .into_iter()
        .collect();

        let mut config = SiteConfig::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.cms.project_id, "from-vite");
        assert_eq!(config.cms.dataset, "staging");
        assert_eq!(config.cms.api_version, "2024-02-02");
        assert_eq!(config.mail.api_key.as_deref(), Some("re_123"));
    }
}
