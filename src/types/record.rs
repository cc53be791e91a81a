use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One flat record per analyzed repository.
///
/// Produced by the collector, annotated by the scoring engine, consumed by the
/// report writers. Every facet field survives a cache round-trip unchanged;
/// only `quality_score` and `quality_justification` are rewritten on re-scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    // Identity
    pub name: String,
    pub org: String,
    pub full_name: String,

    // Repository metadata
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub size_kb: u64,
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
    #[serde(default)]
    pub code_types: Vec<String>,
    #[serde(default)]
    pub primary_code_type: Option<String>,

    // PR totals from the search API
    #[serde(default)]
    pub open_prs: u64,
    #[serde(default)]
    pub closed_prs: u64,
    #[serde(default)]
    pub total_prs: u64,

    // Closed-PR review analysis (last <=100 closed PRs)
    #[serde(default)]
    pub total_analyzed_prs: u64,
    #[serde(default)]
    pub self_approved_prs: u64,
    #[serde(default)]
    pub prs_reviewed_by_others: u64,
    #[serde(default)]
    pub prs_with_description: u64,
    #[serde(default)]
    pub merged_prs: u64,
    #[serde(default)]
    pub closed_without_merge: u64,
    #[serde(default)]
    pub prs_with_multiple_reviewers: u64,
    #[serde(default)]
    pub large_prs_count: u64,
    #[serde(default)]
    pub slow_reviews_count: u64,
    #[serde(default)]
    pub hotfix_prs: u64,
    #[serde(default)]
    pub feature_prs: u64,
    #[serde(default)]
    pub bugfix_prs: u64,
    #[serde(default)]
    pub avg_time_to_merge_hours: f64,
    #[serde(default)]
    pub avg_comments_per_pr: f64,
    #[serde(default)]
    pub avg_files_changed: f64,
    #[serde(default)]
    pub avg_lines_added: f64,
    #[serde(default)]
    pub avg_lines_deleted: f64,

    // Commit aggregates
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub direct_pushes_to_default: u64,
    #[serde(default)]
    pub last_commit_date: Option<String>,
    #[serde(default)]
    pub last_commit_date_formatted: Option<String>,

    // Collaboration
    #[serde(default)]
    pub contributors_count: u64,

    // Derived by the scoring engine
    #[serde(default)]
    pub quality_score: Option<i64>,
    #[serde(default)]
    pub quality_justification: Option<String>,
}

/// A persisted collection run: the flat records plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBatch {
    pub organization: String,
    pub fetched_at: DateTime<Utc>,
    pub repository_count: usize,
    pub repositories: Vec<RepositoryRecord>,
}

impl RunBatch {
    pub fn new(organization: impl Into<String>, repositories: Vec<RepositoryRecord>) -> Self {
        Self {
            organization: organization.into(),
            fetched_at: Utc::now(),
            repository_count: repositories.len(),
            repositories,
        }
    }

    pub fn empty(organization: impl Into<String>) -> Self {
        Self::new(organization, Vec::new())
    }
}
