//! Headless content store access
//!
//! Everything the site shows comes from a document store queried with GROQ
//! over HTTP. [`ContentSource`] is the seam between the typed queries in
//! [`queries`] and the transport: [`CmsClient`] in production, scripted
//! sources in tests.

mod client;
mod error;
pub mod image;
pub mod queries;

use async_trait::async_trait;
use indexmap::IndexMap;

pub use client::CmsClient;
pub use error::CmsError;
pub use image::{ImageSource, ImageUrlBuilder};

/// Named parameters bound into a GROQ query (`$slug` and friends)
pub type QueryParams = IndexMap<String, serde_json::Value>;

/// A read-only document store
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a GROQ query and return the raw `result` value
    async fn query(&self, groq: &str, params: &QueryParams)
        -> Result<serde_json::Value, CmsError>;
}
