//! Serde models for the slices of the GitHub REST/Search API this tool reads.
//!
//! Deliberately tolerant: any field a degraded or partial payload may omit is
//! `Option` or defaulted, so one odd repository never poisons a batch.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_branch_name")]
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Size in KB, as reported by the API.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

fn default_branch_name() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Minimal search-count payload (`per_page=1` probes).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCount {
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// A closed PR as returned by the issues Search API.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueItem {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub merged_at: Option<String>,
}

/// A PR as returned by the pulls listing API (search fallback path).
#[derive(Debug, Clone, Deserialize)]
pub struct Pull {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
}

/// Per-PR detail payload: comment and churn counters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullDetails {
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub review_comments: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    pub sha: String,
    #[serde(default)]
    pub commit: CommitMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitMeta {
    #[serde(default)]
    pub committer: Option<CommitSignature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitSignature {
    #[serde(default)]
    pub date: Option<String>,
}

/// One row of `/stats/contributors`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorStat {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: Option<String>,
}

/// Entry of a contents listing; only files with extensions matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub name: String,
}
