use serde::{Deserialize, Serialize};

/// One extracted job listing
///
/// Records are created by a listing parser and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,

    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Absolute URL of the job detail page
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    /// Base URL of the site the job was listed on
    pub source_site: String,
}
