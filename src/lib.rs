//! folio: a portfolio site rendered from a headless content store
//!
//! Pages are rendered on request (or ahead of time by `generate`) from
//! content fetched over HTTP. Each section of a page loads independently
//! and renders as loading, failed, empty or ready.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod fetch;
pub mod generator;
pub mod helpers;
pub mod mail;
pub mod server;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cms::{CmsClient, ContentSource};
use crate::generator::PageBuilder;
use crate::mail::{Mailer, ResendMailer};

/// The main folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Local static assets, served under `/assets`
    pub assets_dir: PathBuf,
}

impl Folio {
    /// Create a folio instance from a directory's `_config.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Like [`Folio::new`], then apply environment overrides
    pub fn load<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let mut folio = Self::new(base_dir)?;
        folio.config.apply_env();
        Ok(folio)
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let assets_dir = base_dir.join(&config.assets_dir);

        Self {
            config,
            base_dir,
            public_dir,
            assets_dir,
        }
    }

    /// Client for the configured content store
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        Ok(Arc::new(CmsClient::new(&self.config.cms)?))
    }

    /// Page builder reading from the configured content store
    pub fn page_builder(&self) -> Result<PageBuilder> {
        PageBuilder::new(&self.config, self.content_source()?)
    }

    /// Mailer for contact form submissions
    pub fn mailer(&self) -> Result<Arc<dyn Mailer>> {
        Ok(Arc::new(ResendMailer::new(&self.config.mail)?))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Serve the site
    pub async fn serve(&self, ip: &str, port: u16) -> Result<()> {
        let state = server::AppState {
            pages: self.page_builder()?,
            mailer: self.mailer()?,
            assets_dir: self.assets_dir.clone(),
            banner_seconds: self.config.mail.banner_seconds,
        };
        server::start(state, ip, port).await
    }
}
