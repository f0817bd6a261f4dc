//! Content module - records fetched from the content store
//!
//! Every type here is read-only: records are created and edited in the
//! store's studio and only ever decoded by this crate.

pub mod arrange;
mod portable;
mod portfolio;
mod post;
mod profile;

use serde::{Deserialize, Deserializer};

pub use portable::{BodyNode, CodeBlock, ImageBlock, MarkDef, PortableTextRenderer, Span, TextBlock};
pub use portfolio::{Experience, MobileInteraction, Project, Testimonial, TimelineEntry};
pub use post::{Post, Slug};
pub use profile::{AboutContent, ContactContent, HeroContent, SocialLinks, TravelPhoto};

/// Decode `null` as the type's default.
///
/// Projections yield `null` for fields an editor never filled in, which
/// `#[serde(default)]` alone does not cover.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
