//! Contact form delivery through a transactional mail API

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MailConfig;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 120;
const MAX_MESSAGE_LEN: usize = 5000;

/// What a visitor submitted through the contact form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0}")]
    Invalid(String),

    #[error("The contact form is not configured yet.")]
    NotConfigured,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Could not reach the mail service: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Enquiry {
    /// Trim fields and check them; blank optional fields become `None`
    pub fn validate(self) -> Result<Enquiry, MailError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(MailError::Invalid("Please enter your email.".to_string()));
        }
        if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(&email) {
            return Err(MailError::Invalid(
                "Please enter a valid email address.".to_string(),
            ));
        }

        let name = clean_optional(self.name);
        if name.as_ref().is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
            return Err(MailError::Invalid("That name is too long.".to_string()));
        }

        let message = clean_optional(self.message);
        if message
            .as_ref()
            .is_some_and(|m| m.chars().count() > MAX_MESSAGE_LEN)
        {
            return Err(MailError::Invalid(format!(
                "Please keep the message under {} characters.",
                MAX_MESSAGE_LEN
            )));
        }

        Ok(Enquiry {
            name,
            email,
            message,
        })
    }

    fn body_text(&self) -> String {
        let mut text = String::new();
        if let Some(name) = &self.name {
            text.push_str(&format!("Name: {}\n", name));
        }
        text.push_str(&format!("Email: {}\n\n", self.email));
        text.push_str(self.message.as_deref().unwrap_or("(no message)"));
        text
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Something that can deliver an enquiry to the site owner
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, enquiry: &Enquiry) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    reply_to: &'a str,
    subject: &'a str,
    text: String,
}

/// Mailer for a Resend-compatible `POST /emails` API
pub struct ResendMailer {
    http: Client,
    config: MailConfig,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let http = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && !self.config.to.trim().is_empty()
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, enquiry: &Enquiry) -> Result<(), MailError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if self.is_configured() => key,
            _ => return Err(MailError::NotConfigured),
        };

        let email = OutgoingEmail {
            from: &self.config.from,
            to: vec![self.config.to.trim()],
            reply_to: &enquiry.email,
            subject: &self.config.subject,
            text: enquiry.body_text(),
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Delivered enquiry from {}", enquiry.email);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(|r| r.to_string())
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
        tracing::warn!("Mail service rejected enquiry: {} {}", status, message);

        Err(MailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Best available diagnostic from an error payload
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.pointer("/error/message"),
        value.get("error"),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(|s| s.to_string());
    found
}
