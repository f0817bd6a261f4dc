//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Folio;

/// Render every page into the public directory
pub async fn run(folio: &Folio) -> Result<()> {
    let start = std::time::Instant::now();

    if !folio.config.cms.is_configured() {
        tracing::warn!("No content store configured; sections will render empty");
    }

    let generator = Generator::new(folio, folio.page_builder()?);
    let report = generator.generate().await?;

    tracing::info!(
        "Generated {} pages, {} posts and {} assets in {:.2}s",
        report.pages,
        report.posts,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
