//! Built-in folio templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Each content section
//! arrives as a serialized `SectionView` (`{status, data}`) and the
//! `section_state` macro renders the three non-ready states uniformly.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers;

/// Site stylesheet, served at `/folio.css`
pub const STYLESHEET: &str = include_str!("folio/site.css");

/// Template renderer with the embedded folio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all folio templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Content comes from an editor-controlled store, so escape `.html`
        // output; pre-rendered fragments are marked `| safe` in templates.
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("macros.html", include_str!("folio/macros.html")),
            ("home.html", include_str!("folio/home.html")),
            ("about.html", include_str!("folio/about.html")),
            ("projects.html", include_str!("folio/projects.html")),
            ("blog.html", include_str!("folio/blog.html")),
            ("post.html", include_str!("folio/post.html")),
            ("contact.html", include_str!("folio/contact.html")),
            ("not_found.html", include_str!("folio/not_found.html")),
            ("error.html", include_str!("folio/error.html")),
            // Partials
            ("partials/nav.html", include_str!("folio/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/contact_form.html",
                include_str!("folio/partials/contact_form.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: reformat a stored timestamp; unparsable input passes through
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "LL".to_string(),
    };

    match helpers::parse_date(&s) {
        Some(date) => Ok(tera::Value::String(helpers::format_date(&date, &format))),
        None => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub stylesheet: String,
    pub year: String,
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroData {
    pub name: String,
    pub roles: Vec<String>,
    pub bio: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub image_alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceData {
    pub id: String,
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    /// Absent for posts without a slug
    pub path: Option<String>,
    /// RFC 3339, for `<time datetime>` and the `date_format` filter
    pub date: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub date: Option<String>,
    pub overview: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestimonialData {
    pub id: String,
    pub name: String,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionData {
    pub id: String,
    pub name: String,
    pub year: String,
    pub video: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutData {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub photos: Vec<PhotoData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoData {
    pub location: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactData {
    pub heading: String,
    pub description: String,
    pub social: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// Contact form contents echoed back into the inputs
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Outcome notice shown above the contact form
#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    /// `success` or `error`
    pub kind: String,
    pub message: String,
    /// Seconds before a success banner fades; 0 keeps it
    pub seconds: u64,
}
