use serde::{Deserialize, Serialize};

/// JSON body of `POST /resolve`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub url: String,
}

/// Best-effort page metadata. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Success envelope for a resolved link.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub original_url: String,
    pub final_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
    /// Non-fatal anomalies observed during navigation, in arrival order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// RFC 3339 timestamp of when resolution completed.
    pub resolved_at: String,
}

/// Failure envelope shared by every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
