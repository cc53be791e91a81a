pub mod csv;
pub mod html;
pub mod json;
pub mod xlsx;

use crate::error::Result;
use crate::types::config::ScoringConfig;
use crate::types::record::RepositoryRecord;
use std::path::{Path, PathBuf};

/// Column order shared by the CSV and XLSX writers.
pub(crate) const COLUMNS: &[&str] = &[
    "name",
    "org",
    "full_name",
    "description",
    "language",
    "code_types",
    "primary_code_type",
    "private",
    "archived",
    "disabled",
    "size_kb",
    "stargazers_count",
    "watchers_count",
    "forks_count",
    "open_issues_count",
    "created_date",
    "default_branch",
    "open_prs",
    "closed_prs",
    "total_prs",
    "total_analyzed_prs",
    "prs_with_description",
    "self_approved_prs",
    "prs_reviewed_by_others",
    "prs_with_multiple_reviewers",
    "merged_prs",
    "closed_without_merge",
    "large_prs_count",
    "slow_reviews_count",
    "hotfix_prs",
    "feature_prs",
    "bugfix_prs",
    "avg_time_to_merge_hours",
    "avg_comments_per_pr",
    "avg_files_changed",
    "avg_lines_added",
    "avg_lines_deleted",
    "total_commits",
    "direct_pushes_to_default",
    "last_commit_date",
    "last_commit_date_formatted",
    "contributors_count",
    "quality_score",
    "quality_justification",
];

/// One tabular cell, typed so the XLSX writer can keep numbers numeric while
/// the CSV writer flattens everything to text.
pub(crate) enum Cell {
    Text(String),
    Int(u64),
    Float(f64),
    Bool(bool),
    Score(Option<i64>),
}

/// A record as a row, index-aligned with [`COLUMNS`]. List-valued fields are
/// joined with `", "`.
pub(crate) fn row_cells(record: &RepositoryRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.name.clone()),
        Cell::Text(record.org.clone()),
        Cell::Text(record.full_name.clone()),
        Cell::Text(record.description.clone()),
        Cell::Text(record.language.clone().unwrap_or_else(|| "Unknown".to_string())),
        Cell::Text(record.code_types.join(", ")),
        Cell::Text(
            record
                .primary_code_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        Cell::Bool(record.private),
        Cell::Bool(record.archived),
        Cell::Bool(record.disabled),
        Cell::Int(record.size_kb),
        Cell::Int(record.stargazers_count),
        Cell::Int(record.watchers_count),
        Cell::Int(record.forks_count),
        Cell::Int(record.open_issues_count),
        Cell::Text(record.created_date.clone().unwrap_or_default()),
        Cell::Text(record.default_branch.clone()),
        Cell::Int(record.open_prs),
        Cell::Int(record.closed_prs),
        Cell::Int(record.total_prs),
        Cell::Int(record.total_analyzed_prs),
        Cell::Int(record.prs_with_description),
        Cell::Int(record.self_approved_prs),
        Cell::Int(record.prs_reviewed_by_others),
        Cell::Int(record.prs_with_multiple_reviewers),
        Cell::Int(record.merged_prs),
        Cell::Int(record.closed_without_merge),
        Cell::Int(record.large_prs_count),
        Cell::Int(record.slow_reviews_count),
        Cell::Int(record.hotfix_prs),
        Cell::Int(record.feature_prs),
        Cell::Int(record.bugfix_prs),
        Cell::Float(record.avg_time_to_merge_hours),
        Cell::Float(record.avg_comments_per_pr),
        Cell::Float(record.avg_files_changed),
        Cell::Float(record.avg_lines_added),
        Cell::Float(record.avg_lines_deleted),
        Cell::Int(record.total_commits),
        Cell::Int(record.direct_pushes_to_default),
        Cell::Text(record.last_commit_date.clone().unwrap_or_default()),
        Cell::Text(
            record
                .last_commit_date_formatted
                .clone()
                .unwrap_or_else(|| "Never".to_string()),
        ),
        Cell::Int(record.contributors_count),
        Cell::Score(record.quality_score),
        Cell::Text(record.quality_justification.clone().unwrap_or_default()),
    ]
}

/// Paths produced by a full report run.
#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub xlsx: PathBuf,
    pub html: PathBuf,
}

/// Write every report format next to each other under `out_dir`.
pub fn write_all(
    records: &[RepositoryRecord],
    config: &ScoringConfig,
    out_dir: &Path,
    base_name: &str,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(out_dir)?;

    let paths = ReportPaths {
        json: out_dir.join(format!("{base_name}.json")),
        csv: out_dir.join(format!("{base_name}.csv")),
        xlsx: out_dir.join(format!("{base_name}.xlsx")),
        html: out_dir.join(format!("{base_name}.html")),
    };

    json::write_json(records, &paths.json)?;
    csv::write_csv(records, &paths.csv)?;
    xlsx::write_xlsx(records, &paths.xlsx)?;
    html::write_html(records, config, &paths.html)?;
    Ok(paths)
}
