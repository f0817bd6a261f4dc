//! Test doubles shared across module tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::cms::queries::{POSTS_QUERY, POST_BY_SLUG_QUERY};
use crate::cms::{CmsError, ContentSource, QueryParams};
use crate::mail::{Enquiry, MailError, Mailer};

enum Canned {
    Value(serde_json::Value),
    Fail(u16, String),
    /// First record whose `slug.current` equals the `$slug` param
    BySlug(Vec<serde_json::Value>),
}

/// Content source answering from a fixed table keyed by query text.
///
/// Unknown queries answer `null`, like an empty dataset.
pub struct StaticSource {
    responses: HashMap<String, Canned>,
    unreachable: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            unreachable: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every query fails as if the store were down
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    pub fn with(mut self, groq: &str, value: serde_json::Value) -> Self {
        self.responses.insert(groq.to_string(), Canned::Value(value));
        self
    }

    /// Serve `posts` as the post list and look single posts up by slug
    pub fn with_posts(mut self, posts: Vec<serde_json::Value>) -> Self {
        self.responses.insert(
            POSTS_QUERY.to_string(),
            Canned::Value(serde_json::Value::Array(posts.clone())),
        );
        self.responses
            .insert(POST_BY_SLUG_QUERY.to_string(), Canned::BySlug(posts));
        self
    }

    pub fn failing(mut self, groq: &str, status: u16, message: &str) -> Self {
        self.responses
            .insert(groq.to_string(), Canned::Fail(status, message.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn query(
        &self,
        groq: &str,
        params: &QueryParams,
    ) -> Result<serde_json::Value, CmsError> {
        self.calls
            .lock()
            .unwrap()
            .push((groq.to_string(), params.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable {
            return Err(CmsError::Status {
                status: 503,
                message: "store unreachable".to_string(),
            });
        }

        match self.responses.get(groq) {
            Some(Canned::Value(value)) => Ok(value.clone()),
            Some(Canned::Fail(status, message)) => Err(CmsError::Status {
                status: *status,
                message: message.clone(),
            }),
            Some(Canned::BySlug(records)) => Ok(records
                .iter()
                .find(|record| {
                    record.pointer("/slug/current").is_some()
                        && record.pointer("/slug/current") == params.get("slug")
                })
                .cloned()
                .unwrap_or(serde_json::Value::Null)),
            None => Ok(serde_json::Value::Null),
        }
    }
}

/// Mailer that records deliveries, optionally rejecting every one
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Enquiry>>,
    reject: Option<(u16, String)>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            reject: Some((status, message.to_string())),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Enquiry> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, enquiry: &Enquiry) -> Result<(), MailError> {
        if let Some((status, message)) = &self.reject {
            return Err(MailError::Rejected {
                status: *status,
                message: message.clone(),
            });
        }
        self.sent.lock().unwrap().push(enquiry.clone());
        Ok(())
    }
}
