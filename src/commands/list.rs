//! List content from the store

use anyhow::Result;

use crate::cms::{queries, ContentSource};
use crate::content::arrange::{dedupe_testimonials, displayed_interactions, order_projects};
use crate::Folio;

/// List content by type
pub async fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let source = folio.content_source()?;
    for line in lines(source.as_ref(), content_type).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Listing for `content_type`, header line first
pub async fn lines(source: &dyn ContentSource, content_type: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();

    match content_type {
        "project" | "projects" => {
            let projects = order_projects(queries::get_projects(source).await?);
            out.push(format!("Projects ({}):", projects.len()));
            for project in projects {
                out.push(format!("  {} [{}]", project.title, project.tags.join(", ")));
            }
        }
        "post" | "posts" => {
            let posts = queries::get_posts(source).await?;
            out.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = post
                    .published()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "unpublished".to_string());
                out.push(format!(
                    "  {} - {} [{}]",
                    date,
                    post.title,
                    post.slug().unwrap_or("no slug")
                ));
            }
        }
        "experience" | "experiences" => {
            let experiences = queries::get_experiences(source).await?;
            out.push(format!("Experience ({}):", experiences.len()));
            for job in experiences {
                out.push(format!("  {} at {} ({})", job.role, job.company, job.duration));
            }
        }
        "testimonial" | "testimonials" => {
            let testimonials = dedupe_testimonials(queries::get_testimonials(source).await?);
            out.push(format!("Testimonials ({}):", testimonials.len()));
            for t in testimonials {
                out.push(format!("  {}", t.name));
            }
        }
        "timeline" => {
            let entries = queries::get_timeline(source).await?;
            out.push(format!("Timeline ({}):", entries.len()));
            for entry in entries {
                out.push(format!("  {} - {}", entry.year, entry.title));
            }
        }
        "interaction" | "interactions" => {
            let items = displayed_interactions(queries::get_mobile_interactions(source).await?);
            out.push(format!("Interactions ({}):", items.len()));
            for item in items {
                out.push(format!("  {} ({})", item.name, item.year));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: projects, posts, experience, testimonials, timeline, interactions",
                content_type
            );
        }
    }

    Ok(out)
}
