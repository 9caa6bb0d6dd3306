use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location recorded when the caller cannot say where a visitor came from
pub const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub clicks: Vec<ClickEvent>,
}

impl ShortLink {
    /// A link stops resolving at the instant it reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
}

/// Input to a create operation
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub original_url: String,
    /// Lifetime in minutes; `None`, zero or negative falls back to the store default
    pub ttl_minutes: Option<f64>,
    pub requested_code: Option<String>,
    /// Overrides the store's generated-code length for this call
    pub code_length: Option<usize>,
}

impl NewLink {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Default::default()
        }
    }

    pub fn ttl_minutes(mut self, ttl_minutes: f64) -> Self {
        self.ttl_minutes = Some(ttl_minutes);
        self
    }

    pub fn requested_code(mut self, code: impl Into<String>) -> Self {
        self.requested_code = Some(code.into());
        self
    }

    pub fn code_length(mut self, length: usize) -> Self {
        self.code_length = Some(length);
        self
    }
}

/// Who resolved a link
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub source: Option<String>,
    pub location: Option<String>,
}

impl Visitor {
    pub(crate) fn into_click(self, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent {
            timestamp,
            source: self.source.unwrap_or_default(),
            location: self
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub original_url: String,
    /// TTL in minutes
    #[serde(default)]
    pub expiry: Option<f64>,
    #[serde(default)]
    pub custom_code: Option<String>,
}

impl From<CreateUrlRequest> for NewLink {
    fn from(request: CreateUrlRequest) -> Self {
        NewLink {
            original_url: request.original_url,
            ttl_minutes: request.expiry,
            requested_code: request.custom_code.filter(|c| !c.is_empty()),
            code_length: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub original_url: String,
}
