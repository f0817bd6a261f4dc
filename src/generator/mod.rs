//! Generator module - renders the site into static HTML files

mod pages;

pub use pages::{PageBuilder, RenderedPage};

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::fetch::{wrappers, SectionView};
use crate::templates::{FormData, STYLESHEET};
use crate::Folio;

/// Summary of a generation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub pages: usize,
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    public_dir: PathBuf,
    assets_dir: PathBuf,
    pages: PageBuilder,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio, pages: PageBuilder) -> Self {
        Self {
            public_dir: folio.public_dir.clone(),
            assets_dir: folio.assets_dir.clone(),
            pages,
        }
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateReport> {
        let mut report = GenerateReport::default();

        fs::create_dir_all(&self.public_dir)?;

        self.write_page("index.html", &self.pages.home().await?)?;
        self.write_page("about/index.html", &self.pages.about().await?)?;
        self.write_page("projects/index.html", &self.pages.projects().await?)?;
        self.write_page("blog/index.html", &self.pages.blog().await?)?;
        self.write_page(
            "contact/index.html",
            &self.pages.contact(&FormData::default(), None).await?,
        )?;
        self.write_page("404.html", &self.pages.not_found()?)?;
        report.pages = 6;

        report.posts = self.generate_post_pages().await?;

        self.write_page("folio.css", STYLESHEET)?;
        report.assets = self.copy_assets()?;

        Ok(report)
    }

    /// Generate one page per published post
    async fn generate_post_pages(&self) -> Result<usize> {
        let load = wrappers::load_posts(self.pages.source());
        let slugs: Vec<String> = match SectionView::from(load.settled().await) {
            SectionView::Ready(posts) => posts
                .iter()
                .filter_map(|p| p.slug().map(str::to_string))
                .collect(),
            SectionView::Failed(message) => {
                tracing::warn!("Skipping post pages: {}", message);
                return Ok(0);
            }
            _ => return Ok(0),
        };

        let mut written = 0;
        for slug in slugs.iter().filter(|s| is_safe_dir_name(s)) {
            let page = self.pages.post(slug).await?;
            if page.not_found {
                tracing::warn!("Post {:?} disappeared while generating", slug);
                continue;
            }
            let relative = Path::new("blog").join(slug).join("index.html");
            self.write_page(&relative, &page.html)?;
            written += 1;
        }

        Ok(written)
    }

    fn write_page<P: AsRef<Path>>(&self, relative: P, contents: &str) -> Result<()> {
        let output_path = self.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, contents)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the local assets directory (favicons, downloads) to public/assets
    fn copy_assets(&self) -> Result<usize> {
        if !self.assets_dir.is_dir() {
            return Ok(0);
        }

        let target_dir = self.public_dir.join("assets");
        let mut copied = 0;

        for entry in WalkDir::new(&self.assets_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.assets_dir)?;
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            {
                continue;
            }

            let dest = target_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// A slug usable as a single directory name under `blog/`
fn is_safe_dir_name(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}
