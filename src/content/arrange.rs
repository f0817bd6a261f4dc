//! Display arrangement of fetched lists
//!
//! Pure functions applied between a settled fetch and the template. None of
//! them fetch or fail.

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::{MobileInteraction, Post, Project, Testimonial, TimelineEntry};

/// Most mobile interactions shown at once
pub const MAX_INTERACTIONS: usize = 15;

/// Timeline entries sharing a year
#[derive(Debug, Clone, Serialize)]
pub struct TimelineYear {
    pub year: String,
    pub entries: Vec<TimelineEntry>,
}

/// Keep the first testimonial for each id, in first-seen order
pub fn dedupe_testimonials(testimonials: Vec<Testimonial>) -> Vec<Testimonial> {
    let mut seen = HashSet::new();
    testimonials
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Group entries by year, newest year first.
///
/// Entries keep their incoming relative order inside a group. Years compare
/// numerically when both parse, otherwise as strings.
pub fn group_timeline(entries: Vec<TimelineEntry>) -> Vec<TimelineYear> {
    let mut groups: IndexMap<String, Vec<TimelineEntry>> = IndexMap::new();
    for entry in entries {
        groups.entry(entry.year.trim().to_string()).or_default().push(entry);
    }

    let mut years: Vec<TimelineYear> = groups
        .into_iter()
        .map(|(year, entries)| TimelineYear { year, entries })
        .collect();
    years.sort_by(|a, b| compare_years(&b.year, &a.year));
    years
}

fn compare_years(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Cap to [`MAX_INTERACTIONS`] in input order, then drop incomplete records
pub fn displayed_interactions(items: Vec<MobileInteraction>) -> Vec<MobileInteraction> {
    items
        .into_iter()
        .take(MAX_INTERACTIONS)
        .filter(|item| !item.name.trim().is_empty() && !item.year.trim().is_empty())
        .map(|mut item| {
            if item.id.is_empty() {
                item.id = format!("interaction-{}", slug::slugify(&item.name));
            }
            item
        })
        .collect()
}

/// Explicitly ordered projects first (ascending), then the rest as fetched
pub fn order_projects(mut projects: Vec<Project>) -> Vec<Project> {
    // sort_by is stable, so unordered projects keep the store's order
    projects.sort_by(|a, b| match (a.order, b.order) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    projects
}

/// The newest `n` posts, newest first
pub fn recent_posts(posts: &[Post], n: usize) -> Vec<Post> {
    posts.iter().take(n).cloned().collect()
}
