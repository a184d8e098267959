//! Response draft generation behind a pluggable interface.
//!
//! The HTTP handler only knows the `ResponseGenerator` trait, so the shipped
//! template-based implementation can be swapped for a real inference backend
//! without touching the endpoint.

use async_trait::async_trait;
use thiserror::Error;

pub mod template;

pub use template::TemplateResponder;

/// Requested tone for the drafted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Professional,
    Friendly,
    Formal,
    Casual,
}

impl Tone {
    pub fn parse(s: &str) -> Option<Tone> {
        match s {
            "professional" => Some(Tone::Professional),
            "friendly" => Some(Tone::Friendly),
            "formal" => Some(Tone::Formal),
            "casual" => Some(Tone::Casual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Casual => "casual",
        }
    }
}

/// Everything a backend needs to draft a reply to one review.
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub review_text: String,
    pub rating: i64,
    pub platform: String,
    pub tone: Tone,
    pub business_name: String,
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Usage quota exceeded")]
    QuotaExceeded,

    #[error("Upstream generation failed: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, request: &DraftRequest) -> Result<String, GeneratorError>;
}
