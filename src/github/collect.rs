//! Per-repository facet collection.
//!
//! Each facet (contents, PR counts, contributors, commits, reviews) is fetched
//! independently and degrades independently: a missing or rate-limited facet
//! becomes its zero/empty value with a logged warning. Only transport failures
//! (network gone) abort a repository, and the batch loop skips it and moves on.

use crate::error::{AnalyzerError, Result};
use crate::github::api::{
    CommitEntry, ContentEntry, Contributor, ContributorStat, IssueItem, Pull, PullDetails, Repo,
    Review, SearchResults,
};
use crate::github::client::{GitHubClient, PER_PAGE};
use crate::languages;
use crate::types::config::ScoringConfig;
use crate::types::record::RepositoryRecord;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// PR body must exceed this many characters (trimmed) to count as described.
const DESCRIPTION_MIN_CHARS: usize = 10;
/// The Search API stops serving results past this total.
const SEARCH_RESULT_CAP: usize = 1000;
/// Pulls-API fallback reads at most this many pages of closed PRs.
const MAX_PULLS_FALLBACK_PAGES: u32 = 5;
/// Branches probed when the advertised default branch yields nothing.
const FALLBACK_BRANCHES: &[&str] = &["master", "main", "develop"];

/// Thresholds the collector needs while classifying PRs; sourced from the
/// same scoring config the engine uses so collection and scoring agree.
#[derive(Debug, Clone, Copy)]
pub struct CollectorLimits {
    pub large_pr_files: u64,
    pub slow_review_days: i64,
}

impl CollectorLimits {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            large_pr_files: config.large_prs().files_threshold,
            slow_review_days: config.slow_review_response().days_threshold,
        }
    }
}

pub struct Collector<'a> {
    client: &'a GitHubClient,
    org: String,
    languages: HashMap<&'static str, &'static str>,
    limits: CollectorLimits,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a GitHubClient, org: impl Into<String>, limits: CollectorLimits) -> Self {
        Self {
            client,
            org: org.into(),
            languages: languages::language_map(),
            limits,
        }
    }

    /// List the organization's repositories, optionally narrowed to a set of
    /// languages via the Search API.
    pub fn list_repositories(&self, language_filter: &[String]) -> Result<Vec<Repo>> {
        if language_filter.is_empty() {
            self.client.get_paged::<Repo>(
                &format!("/orgs/{}/repos", self.org),
                &[("type", "all".to_string())],
            )
        } else {
            self.search_repositories(language_filter)
        }
    }

    fn search_repositories(&self, language_filter: &[String]) -> Result<Vec<Repo>> {
        let clauses: Vec<String> = language_filter
            .iter()
            .map(|language| format!("lang:{language}"))
            .collect();
        let q = format!("org:{} {}", self.org, clauses.join(" OR "));

        let mut repos: Vec<Repo> = Vec::new();
        for page in 1..=(SEARCH_RESULT_CAP as u32 / PER_PAGE) {
            let query = [
                ("q", q.clone()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("sort", "updated".to_string()),
                ("order", "desc".to_string()),
            ];
            let Some(results) = self
                .client
                .get_json::<SearchResults<Repo>>("/search/repositories", &query)?
            else {
                break;
            };
            let fetched = results.items.len();
            repos.extend(results.items);
            if fetched < PER_PAGE as usize {
                break;
            }
            if repos.len() >= SEARCH_RESULT_CAP {
                warn!("language search hit the {SEARCH_RESULT_CAP}-result Search API limit");
                break;
            }
        }
        Ok(repos)
    }

    /// Build the full record for one repository.
    pub fn collect(&self, repo: &Repo) -> Result<RepositoryRecord> {
        let name = repo.name.as_str();
        debug!("collecting {}", repo.full_name);

        let code_types = facet_or_default("contents listing", name, self.detect_code_types(name))?;
        let (open_prs, closed_prs) =
            facet_or_default("PR counts", name, self.pull_request_counts(name))?;
        let contributors_count =
            facet_or_default("contributors", name, self.contributors_count(name))?;
        let commits = self.commit_stats(name, &repo.default_branch)?;
        let analysis = facet_or_default("PR review analysis", name, self.review_analysis(name))?;

        Ok(RepositoryRecord {
            name: repo.name.clone(),
            org: self.org.clone(),
            full_name: repo.full_name.clone(),
            description: repo.description.clone().unwrap_or_default(),
            created_at: repo.created_at.clone(),
            created_date: repo.created_at.as_deref().and_then(iso_date_only),
            default_branch: repo.default_branch.clone(),
            private: repo.private,
            archived: repo.archived,
            disabled: repo.disabled,
            size_kb: repo.size,
            stargazers_count: repo.stargazers_count,
            watchers_count: repo.watchers_count,
            forks_count: repo.forks_count,
            open_issues_count: repo.open_issues_count,
            language: repo.language.clone(),
            primary_code_type: code_types.first().cloned(),
            code_types,
            open_prs,
            closed_prs,
            total_prs: open_prs + closed_prs,
            total_analyzed_prs: analysis.total_analyzed_prs,
            self_approved_prs: analysis.self_approved_prs,
            prs_reviewed_by_others: analysis.prs_reviewed_by_others,
            prs_with_description: analysis.prs_with_description,
            merged_prs: analysis.merged_prs,
            closed_without_merge: analysis.closed_without_merge,
            prs_with_multiple_reviewers: analysis.prs_with_multiple_reviewers,
            large_prs_count: analysis.large_prs_count,
            slow_reviews_count: analysis.slow_reviews_count,
            hotfix_prs: analysis.hotfix_prs,
            feature_prs: analysis.feature_prs,
            bugfix_prs: analysis.bugfix_prs,
            avg_time_to_merge_hours: analysis.avg_time_to_merge_hours,
            avg_comments_per_pr: analysis.avg_comments_per_pr,
            avg_files_changed: analysis.avg_files_changed,
            avg_lines_added: analysis.avg_lines_added,
            avg_lines_deleted: analysis.avg_lines_deleted,
            total_commits: commits.total_commits,
            direct_pushes_to_default: commits.direct_pushes,
            last_commit_date_formatted: commits
                .last_commit_date
                .as_deref()
                .and_then(iso_date_only),
            last_commit_date: commits.last_commit_date,
            contributors_count,
            quality_score: None,
            quality_justification: None,
        })
    }

    /// Code types present in the repository root, via the contents API and the
    /// injected extension table.
    fn detect_code_types(&self, name: &str) -> Result<Vec<String>> {
        let path = format!("/repos/{}/{name}/contents", self.org);
        let Some(entries) = self.client.get_json::<Vec<ContentEntry>>(&path, &[])? else {
            return Ok(Vec::new());
        };

        let mut detected: HashSet<&'static str> = HashSet::new();
        for entry in entries.iter().filter(|entry| entry.entry_type == "file") {
            let Some((_, extension)) = entry.name.rsplit_once('.') else {
                continue;
            };
            let key = format!(".{}", extension.to_lowercase());
            if let Some(language) = self.languages.get(key.as_str()).copied() {
                detected.insert(language);
            }
        }

        let mut code_types: Vec<String> = detected.into_iter().map(String::from).collect();
        code_types.sort_unstable();
        Ok(code_types)
    }

    /// Open and closed PR totals from the Search API.
    fn pull_request_counts(&self, name: &str) -> Result<(u64, u64)> {
        let open = self
            .client
            .search_issue_count(&format!("repo:{}/{name} type:pr state:open", self.org))?;
        let closed = self
            .client
            .search_issue_count(&format!("repo:{}/{name} type:pr state:closed", self.org))?;
        Ok((open, closed))
    }

    fn contributors_count(&self, name: &str) -> Result<u64> {
        let contributors = self
            .client
            .get_paged::<Contributor>(&format!("/repos/{}/{name}/contributors", self.org), &[])?;
        Ok(contributors.len() as u64)
    }

    fn commit_stats(&self, name: &str, default_branch: &str) -> Result<CommitStats> {
        let mut total_commits = facet_or_default(
            "contributor statistics",
            name,
            self.stats_contributor_total(name),
        )?;
        let mut last_commit_date = None;

        if total_commits == 0 {
            let (count, date) = facet_or_default(
                "commit listing",
                name,
                self.commits_via_pagination(name, default_branch),
            )?;
            total_commits = count;
            last_commit_date = date;
        }

        if last_commit_date.is_none() {
            last_commit_date = facet_or_default(
                "last commit probe",
                name,
                self.last_commit_probe(name, default_branch),
            )?;
        }

        let direct_pushes = facet_or_default(
            "direct push probe",
            name,
            self.direct_pushes(name, default_branch),
        )?;

        Ok(CommitStats {
            total_commits,
            last_commit_date,
            direct_pushes,
        })
    }

    /// Commit total from `/stats/contributors`; 0 when the stats are still
    /// being computed (202) or missing.
    fn stats_contributor_total(&self, name: &str) -> Result<u64> {
        let path = format!("/repos/{}/{name}/stats/contributors", self.org);
        Ok(self
            .client
            .get_json::<Vec<ContributorStat>>(&path, &[])?
            .map(|stats| stats.iter().map(|stat| stat.total).sum())
            .unwrap_or(0))
    }

    /// Count commits by walking the commit listing, trying fallback branches
    /// when the advertised default branch yields nothing.
    fn commits_via_pagination(
        &self,
        name: &str,
        default_branch: &str,
    ) -> Result<(u64, Option<String>)> {
        let path = format!("/repos/{}/{name}/commits", self.org);
        for branch in branch_candidates(default_branch) {
            let first_page = self.client.get_json::<Vec<CommitEntry>>(
                &path,
                &[
                    ("sha", branch.clone()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", "1".to_string()),
                ],
            )?;
            let Some(first_page) = first_page else {
                continue;
            };
            if first_page.is_empty() {
                continue;
            }

            let last_commit_date = first_page
                .first()
                .and_then(|entry| entry.commit.committer.as_ref())
                .and_then(|committer| committer.date.clone());
            let mut total = first_page.len() as u64;
            if first_page.len() < PER_PAGE as usize {
                return Ok((total, last_commit_date));
            }

            for page in 2..=100u32 {
                let Some(batch) = self.client.get_json::<Vec<CommitEntry>>(
                    &path,
                    &[
                        ("sha", branch.clone()),
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )?
                else {
                    break;
                };
                if batch.is_empty() {
                    break;
                }
                total += batch.len() as u64;
                if batch.len() < PER_PAGE as usize {
                    break;
                }
            }
            return Ok((total, last_commit_date));
        }
        Ok((0, None))
    }

    fn last_commit_probe(&self, name: &str, default_branch: &str) -> Result<Option<String>> {
        let path = format!("/repos/{}/{name}/commits", self.org);
        for branch in branch_candidates(default_branch) {
            let Some(commits) = self.client.get_json::<Vec<CommitEntry>>(
                &path,
                &[("sha", branch), ("per_page", "1".to_string())],
            )?
            else {
                continue;
            };
            if let Some(date) = commits
                .first()
                .and_then(|entry| entry.commit.committer.as_ref())
                .and_then(|committer| committer.date.clone())
            {
                return Ok(Some(date));
            }
        }
        Ok(None)
    }

    /// Direct-push heuristic: for each of the last <=100 default-branch
    /// commits, probe the Search API for an associated PR; no hit counts as a
    /// direct push. A best-effort sample, not an exact count.
    fn direct_pushes(&self, name: &str, default_branch: &str) -> Result<u64> {
        let path = format!("/repos/{}/{name}/commits", self.org);
        let Some(commits) = self.client.get_json::<Vec<CommitEntry>>(
            &path,
            &[
                ("sha", default_branch.to_string()),
                ("per_page", PER_PAGE.to_string()),
            ],
        )?
        else {
            return Ok(0);
        };

        let mut direct_pushes = 0;
        for commit in &commits {
            let q = format!("repo:{}/{name} type:pr {}", self.org, commit.sha);
            match self.client.search_issue_count(&q) {
                Ok(0) => direct_pushes += 1,
                Ok(_) => {}
                Err(err) => {
                    // Partial sample beats hammering a failing endpoint.
                    warn!("{name}: direct push probe stopped early ({err})");
                    break;
                }
            }
        }
        Ok(direct_pushes)
    }

    /// Detailed analysis of the last <=100 closed PRs.
    fn review_analysis(&self, name: &str) -> Result<ReviewAnalysis> {
        let prs = self.closed_prs(name)?;
        if prs.is_empty() {
            debug!("{name}: no closed PRs to analyze");
            return Ok(ReviewAnalysis::default());
        }
        self.analyze_closed_prs(name, &prs)
    }

    /// Closed PRs via the Search API, falling back to the pulls listing.
    fn closed_prs(&self, name: &str) -> Result<Vec<ClosedPr>> {
        let query = [
            ("q", format!("repo:{}/{name} is:pr is:closed", self.org)),
            ("per_page", PER_PAGE.to_string()),
            ("sort", "updated".to_string()),
            ("order", "desc".to_string()),
        ];
        match self
            .client
            .get_json::<SearchResults<IssueItem>>("/search/issues", &query)
        {
            Ok(Some(results)) if !results.items.is_empty() => {
                return Ok(results.items.into_iter().map(ClosedPr::from).collect());
            }
            Ok(_) => {}
            Err(err) => warn!("{name}: PR search failed ({err}); falling back to pulls API"),
        }

        let path = format!("/repos/{}/{name}/pulls", self.org);
        let mut pulls: Vec<Pull> = Vec::new();
        for page in 1..=MAX_PULLS_FALLBACK_PAGES {
            let query = [
                ("state", "closed".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("page", page.to_string()),
            ];
            let Some(batch) = self.client.get_json::<Vec<Pull>>(&path, &query)? else {
                break;
            };
            let fetched = batch.len();
            pulls.extend(batch);
            if fetched < PER_PAGE as usize {
                break;
            }
        }
        Ok(pulls.into_iter().map(ClosedPr::from).collect())
    }

    fn analyze_closed_prs(&self, name: &str, prs: &[ClosedPr]) -> Result<ReviewAnalysis> {
        let mut analysis = ReviewAnalysis {
            total_analyzed_prs: prs.len() as u64,
            ..Default::default()
        };

        let mut merge_hours = 0.0;
        let mut merged_with_timestamps = 0u64;
        let mut total_comments = 0u64;
        let mut total_files = 0u64;
        let mut total_added = 0u64;
        let mut total_deleted = 0u64;

        for pr in prs {
            if has_description(pr.body.as_deref()) {
                analysis.prs_with_description += 1;
            }

            match classify_title(&pr.title) {
                PrKind::Hotfix => analysis.hotfix_prs += 1,
                PrKind::Feature => analysis.feature_prs += 1,
                PrKind::Bugfix => analysis.bugfix_prs += 1,
                PrKind::Other => {}
            }

            if let Some(merged_at) = pr.merged_at.as_deref() {
                analysis.merged_prs += 1;
                if let Some(hours) = pr
                    .created_at
                    .as_deref()
                    .and_then(|created| hours_between(created, merged_at))
                {
                    merge_hours += hours;
                    merged_with_timestamps += 1;
                }
            } else {
                analysis.closed_without_merge += 1;
            }

            let details = facet_or_default(
                "PR details",
                name,
                self.pull_details(name, pr.number),
            )?;
            total_comments += details.comments + details.review_comments;
            total_files += details.changed_files;
            total_added += details.additions;
            total_deleted += details.deletions;
            if details.changed_files > self.limits.large_pr_files {
                analysis.large_prs_count += 1;
            }

            let reviews =
                facet_or_default("PR reviews", name, self.pull_reviews(name, pr.number))?;
            let flags = review_flags(&reviews, pr.author.as_deref());
            if flags.approved_by_author {
                analysis.self_approved_prs += 1;
            }
            if flags.approved_by_others {
                analysis.prs_reviewed_by_others += 1;
            }
            if flags.reviewer_count > 1 {
                analysis.prs_with_multiple_reviewers += 1;
            }
            if is_slow_review(
                pr.created_at.as_deref(),
                pr.merged_at.as_deref(),
                &reviews,
                self.limits.slow_review_days,
            ) {
                analysis.slow_reviews_count += 1;
            }
        }

        let total = analysis.total_analyzed_prs as f64;
        analysis.avg_comments_per_pr = round1(total_comments as f64 / total);
        analysis.avg_files_changed = round1(total_files as f64 / total);
        analysis.avg_lines_added = round1(total_added as f64 / total);
        analysis.avg_lines_deleted = round1(total_deleted as f64 / total);
        if merged_with_timestamps > 0 {
            analysis.avg_time_to_merge_hours = round1(merge_hours / merged_with_timestamps as f64);
        }

        Ok(analysis)
    }

    fn pull_details(&self, name: &str, number: u64) -> Result<PullDetails> {
        let path = format!("/repos/{}/{name}/pulls/{number}", self.org);
        Ok(self
            .client
            .get_json::<PullDetails>(&path, &[])?
            .unwrap_or_default())
    }

    fn pull_reviews(&self, name: &str, number: u64) -> Result<Vec<Review>> {
        let path = format!("/repos/{}/{name}/pulls/{number}/reviews", self.org);
        Ok(self.client.get_json::<Vec<Review>>(&path, &[])?.unwrap_or_default())
    }
}

/// Apply the `--repos` allow-list (case-insensitive) and `--limit` cap.
pub fn filter_repositories(
    mut repos: Vec<Repo>,
    allow_list: &[String],
    limit: Option<usize>,
) -> Vec<Repo> {
    if !allow_list.is_empty() {
        let wanted: HashSet<String> = allow_list.iter().map(|name| name.to_lowercase()).collect();
        repos.retain(|repo| wanted.contains(&repo.name.to_lowercase()));

        let found: HashSet<String> = repos.iter().map(|repo| repo.name.to_lowercase()).collect();
        let missing: Vec<&str> = allow_list
            .iter()
            .filter(|name| !found.contains(&name.to_lowercase()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            warn!("repository names not found: {}", missing.join(", "));
        }
    }

    if let Some(limit) = limit {
        repos.truncate(limit);
    }
    repos
}

#[derive(Debug, Default)]
struct CommitStats {
    total_commits: u64,
    last_commit_date: Option<String>,
    direct_pushes: u64,
}

#[derive(Debug, Default)]
pub struct ReviewAnalysis {
    pub total_analyzed_prs: u64,
    pub self_approved_prs: u64,
    pub prs_reviewed_by_others: u64,
    pub prs_with_description: u64,
    pub merged_prs: u64,
    pub closed_without_merge: u64,
    pub prs_with_multiple_reviewers: u64,
    pub large_prs_count: u64,
    pub slow_reviews_count: u64,
    pub hotfix_prs: u64,
    pub feature_prs: u64,
    pub bugfix_prs: u64,
    pub avg_time_to_merge_hours: f64,
    pub avg_comments_per_pr: f64,
    pub avg_files_changed: f64,
    pub avg_lines_added: f64,
    pub avg_lines_deleted: f64,
}

/// Closed-PR shape common to the search and pulls payloads.
#[derive(Debug, Clone)]
struct ClosedPr {
    number: u64,
    title: String,
    body: Option<String>,
    author: Option<String>,
    created_at: Option<String>,
    merged_at: Option<String>,
}

impl From<IssueItem> for ClosedPr {
    fn from(item: IssueItem) -> Self {
        Self {
            number: item.number,
            title: item.title.unwrap_or_default(),
            body: item.body,
            author: item.user.map(|user| user.login),
            created_at: item.created_at,
            merged_at: item.pull_request.and_then(|pr| pr.merged_at),
        }
    }
}

impl From<Pull> for ClosedPr {
    fn from(pull: Pull) -> Self {
        Self {
            number: pull.number,
            title: pull.title.unwrap_or_default(),
            body: pull.body,
            author: pull.user.map(|user| user.login),
            created_at: pull.created_at,
            merged_at: pull.merged_at,
        }
    }
}

/// Degrade a non-transport facet failure to its empty value; keep transport
/// failures fatal for the repository so the batch loop can skip it.
fn facet_or_default<T: Default>(facet: &str, repo: &str, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err @ AnalyzerError::Transport { .. }) => Err(err),
        Err(err) => {
            warn!("{repo}: {facet} unavailable ({err}); treating as empty");
            Ok(T::default())
        }
    }
}

fn branch_candidates(default_branch: &str) -> Vec<String> {
    let mut candidates = vec![default_branch.to_string()];
    for fallback in FALLBACK_BRANCHES {
        if *fallback != default_branch {
            candidates.push((*fallback).to_string());
        }
    }
    candidates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrKind {
    Hotfix,
    Feature,
    Bugfix,
    Other,
}

fn classify_title(title: &str) -> PrKind {
    let title = title.to_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|keyword| title.contains(keyword));

    // Checked in priority order; "hotfix" must win over plain "fix".
    if matches_any(&["hotfix", "urgent", "critical"]) {
        PrKind::Hotfix
    } else if matches_any(&["feature", "feat", "add"]) {
        PrKind::Feature
    } else if matches_any(&["fix", "bug", "issue"]) {
        PrKind::Bugfix
    } else {
        PrKind::Other
    }
}

fn has_description(body: Option<&str>) -> bool {
    body.map(|body| body.trim().len() > DESCRIPTION_MIN_CHARS)
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ReviewFlags {
    approved_by_author: bool,
    approved_by_others: bool,
    reviewer_count: usize,
}

fn review_flags(reviews: &[Review], author: Option<&str>) -> ReviewFlags {
    let mut flags = ReviewFlags::default();
    let mut approvers: HashSet<&str> = HashSet::new();

    for review in reviews {
        if review.state != "APPROVED" {
            continue;
        }
        let Some(login) = review.user.as_ref().map(|user| user.login.as_str()) else {
            continue;
        };
        approvers.insert(login);
        if author == Some(login) {
            flags.approved_by_author = true;
        } else {
            flags.approved_by_others = true;
        }
    }

    flags.reviewer_count = approvers.len();
    flags
}

/// A PR counts as slow when its first review landed more than
/// `days_threshold` days after it was opened, or it was merged after that
/// long with no review at all.
fn is_slow_review(
    created_at: Option<&str>,
    merged_at: Option<&str>,
    reviews: &[Review],
    days_threshold: i64,
) -> bool {
    let Some(created_at) = created_at else {
        return false;
    };

    let first_review = reviews
        .iter()
        .filter_map(|review| review.submitted_at.as_deref())
        .filter_map(|submitted| hours_between(created_at, submitted))
        .fold(None::<f64>, |fastest, hours| {
            Some(fastest.map_or(hours, |fastest| fastest.min(hours)))
        });

    let threshold_hours = days_threshold as f64 * 24.0;
    match first_review {
        Some(hours) => hours > threshold_hours,
        None => merged_at
            .and_then(|merged| hours_between(created_at, merged))
            .map(|hours| hours > threshold_hours)
            .unwrap_or(false),
    }
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn hours_between(start: &str, end: &str) -> Option<f64> {
    let start = parse_iso(start)?;
    let end = parse_iso(end)?;
    Some((end - start).num_seconds() as f64 / 3600.0)
}

fn iso_date_only(value: &str) -> Option<String> {
    parse_iso(value).map(|parsed| parsed.format("%Y-%m-%d").to_string())
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
