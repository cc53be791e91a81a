//! Static interactive HTML dashboard.
//!
//! Embeds the full dataset plus a client-side copy of the scoring rules so
//! thresholds can be tuned live without re-running the tool. The template
//! uses plain placeholder markers instead of `format!` to keep the embedded
//! CSS/JS braces out of Rust's way.

use crate::error::Result;
use crate::types::config::ScoringConfig;
use crate::types::record::RepositoryRecord;
use serde_json::json;
use std::path::Path;

pub fn write_html(
    records: &[RepositoryRecord],
    config: &ScoringConfig,
    path: &Path,
) -> Result<()> {
    std::fs::write(path, render_html(records, config)?)?;
    Ok(())
}

pub fn render_html(records: &[RepositoryRecord], config: &ScoringConfig) -> Result<String> {
    let data = serde_json::to_string(records)?;
    let defaults = serde_json::to_string(&dashboard_defaults(config))?;
    Ok(TEMPLATE
        .replace("__REPO_DATA__", &data)
        .replace("__DEFAULT_CONFIG__", &defaults))
}

/// Flattened rule parameters for the dashboard sliders. Mirrors the engine
/// defaults, including any overrides from the loaded config.
fn dashboard_defaults(config: &ScoringConfig) -> serde_json::Value {
    json!({
        "base_score": config.base_score(),
        "no_prs_penalty": config.no_prs().penalty,
        "self_approval_penalty": config.high_self_approval().penalty,
        "self_approval_threshold": config.high_self_approval().threshold,
        "external_review_penalty": config.low_external_review().penalty,
        "external_review_threshold": config.low_external_review().threshold,
        "no_descriptions_penalty": config.no_pr_descriptions().penalty,
        "descriptions_threshold": config.no_pr_descriptions().threshold,
        "direct_pushes_penalty": config.high_direct_pushes().penalty,
        "direct_pushes_threshold": config.high_direct_pushes().threshold,
        "single_contributor_penalty": config.single_contributor().penalty,
        "no_commits_penalty": config.no_commits().penalty,
        "inactive_penalty": config.inactive_repository().penalty,
        "inactivity_days_threshold": config.inactive_repository().days_threshold,
        "large_prs_penalty": config.large_prs().penalty,
        "large_prs_threshold": config.large_prs().threshold,
        "slow_review_penalty": config.slow_review_response().penalty,
        "slow_review_threshold": config.slow_review_response().threshold,
    })
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Repository Quality Dashboard</title>
<style>
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
  .container { max-width: 1400px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); overflow: hidden; }
  .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; }
  .controls { padding: 20px; background: #f8f9fa; border-bottom: 1px solid #e9ecef; }
  .control-section { flex: 1; min-width: 300px; }
  .control-section h4 { margin-bottom: 15px; color: #495057; border-bottom: 2px solid #007bff; padding-bottom: 5px; }
  .control-group { display: block; margin: 10px 0; }
  .control-group label { display: block; font-weight: 600; margin-bottom: 5px; color: #495057; }
  .slider-container { display: flex; align-items: center; gap: 10px; }
  .slider { width: 150px; }
  .slider-value { min-width: 40px; font-weight: bold; color: #007bff; }
  .filters { display: flex; flex-wrap: wrap; gap: 15px; margin-bottom: 20px; }
  .filter-group { display: flex; flex-direction: column; gap: 5px; }
  .filter-group input, .filter-group select { padding: 8px; border: 1px solid #ddd; border-radius: 4px; }
  .table-container { overflow-x: auto; padding: 20px; }
  table { width: 100%; border-collapse: collapse; margin-top: 10px; }
  th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
  th { background-color: #f8f9fa; font-weight: 600; position: sticky; top: 0; z-index: 10; }
  tr:hover { background-color: #f5f5f5; }
  .quality-score { font-weight: bold; padding: 4px 8px; border-radius: 4px; color: white; }
  .score-high { background-color: #28a745; }
  .score-medium { background-color: #ffc107; color: #212529; }
  .score-low { background-color: #dc3545; }
  .stats { display: flex; justify-content: space-around; padding: 20px; background: #f8f9fa; border-top: 1px solid #e9ecef; }
  .stat-item { text-align: center; }
  .stat-value { font-size: 2em; font-weight: bold; color: #007bff; }
  .stat-label { color: #6c757d; margin-top: 5px; }
  .reset-btn { background: #6c757d; color: white; border: none; padding: 8px 16px; border-radius: 4px; cursor: pointer; }
  .reset-btn:hover { background: #5a6268; }
</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>Repository Quality Dashboard</h1>
    <p>Interactive quality scoring with live threshold tuning</p>
  </div>

  <div class="controls">
    <h3>Scoring Configuration</h3>
    <div style="display: flex; flex-wrap: wrap; gap: 20px;">
      <div class="control-section">
        <h4>Penalties (points)</h4>
        <div id="penaltySliders"></div>
      </div>
      <div class="control-section">
        <h4>Thresholds</h4>
        <div id="thresholdSliders"></div>
      </div>
    </div>
    <button class="reset-btn" onclick="resetSliders()">Reset to Defaults</button>
  </div>

  <div class="controls">
    <h3>Filters</h3>
    <div class="filters">
      <div class="filter-group">
        <label>Repository Name</label>
        <input type="text" id="nameFilter" placeholder="Filter by name...">
      </div>
      <div class="filter-group">
        <label>Language</label>
        <select id="languageFilter"><option value="">All Languages</option></select>
      </div>
      <div class="filter-group">
        <label>Min Quality Score</label>
        <input type="number" id="minScoreFilter" min="0" max="100" placeholder="0">
      </div>
      <div class="filter-group">
        <label>Max Quality Score</label>
        <input type="number" id="maxScoreFilter" min="0" max="100" placeholder="100">
      </div>
    </div>
  </div>

  <div class="stats">
    <div class="stat-item"><div class="stat-value" id="totalRepos">0</div><div class="stat-label">Total Repositories</div></div>
    <div class="stat-item"><div class="stat-value" id="avgScore">0</div><div class="stat-label">Average Score</div></div>
    <div class="stat-item"><div class="stat-value" id="highQuality">0</div><div class="stat-label">High Quality (&ge;80)</div></div>
    <div class="stat-item"><div class="stat-value" id="lowQuality">0</div><div class="stat-label">Low Quality (&lt;50)</div></div>
  </div>

  <div class="table-container">
    <table id="repoTable">
      <thead>
        <tr>
          <th>Repository</th><th>Language</th><th>Quality Score</th><th>PRs</th>
          <th>Contributors</th><th>Last Commit</th><th>Quality Justification</th>
        </tr>
      </thead>
      <tbody id="tableBody"></tbody>
    </table>
  </div>
</div>

<script>
const originalData = __REPO_DATA__;
const defaultConfig = __DEFAULT_CONFIG__;
let filteredData = [...originalData];

const SLIDERS = [
  { key: 'no_prs_penalty', label: 'No PRs', kind: 'penalty', min: 0, max: 100, step: 1 },
  { key: 'self_approval_penalty', label: 'High Self-Approval', kind: 'penalty', min: 0, max: 50, step: 1 },
  { key: 'external_review_penalty', label: 'Low External Review', kind: 'penalty', min: 0, max: 30, step: 1 },
  { key: 'no_descriptions_penalty', label: 'Poor PR Descriptions', kind: 'penalty', min: 0, max: 30, step: 1 },
  { key: 'direct_pushes_penalty', label: 'High Direct Pushes', kind: 'penalty', min: 0, max: 40, step: 1 },
  { key: 'single_contributor_penalty', label: 'Single Contributor', kind: 'penalty', min: 0, max: 30, step: 1 },
  { key: 'no_commits_penalty', label: 'No Commits', kind: 'penalty', min: 0, max: 30, step: 1 },
  { key: 'inactive_penalty', label: 'Inactive Repository', kind: 'penalty', min: 0, max: 20, step: 1 },
  { key: 'large_prs_penalty', label: 'Large PRs', kind: 'penalty', min: 0, max: 15, step: 1 },
  { key: 'slow_review_penalty', label: 'Slow Review Response', kind: 'penalty', min: 0, max: 15, step: 1 },
  { key: 'self_approval_threshold', label: 'Self-Approval Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'external_review_threshold', label: 'External Review Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'descriptions_threshold', label: 'PR Descriptions Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'direct_pushes_threshold', label: 'Direct Pushes Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'large_prs_threshold', label: 'Large PRs Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'slow_review_threshold', label: 'Slow Reviews Ratio', kind: 'threshold', min: 0, max: 1, step: 0.05 },
  { key: 'inactivity_days_threshold', label: 'Inactivity Days', kind: 'threshold', min: 30, max: 730, step: 5 },
];

document.addEventListener('DOMContentLoaded', function() {
  buildSliders();
  populateLanguageFilter();
  setupFilterListeners();
  recalculateScores();
});

function buildSliders() {
  for (const slider of SLIDERS) {
    const host = document.getElementById(slider.kind === 'penalty' ? 'penaltySliders' : 'thresholdSliders');
    const group = document.createElement('div');
    group.className = 'control-group';
    group.innerHTML = `
      <label>${slider.label}</label>
      <div class="slider-container">
        <input type="range" class="slider" id="${slider.key}" min="${slider.min}" max="${slider.max}" step="${slider.step}" value="${defaultConfig[slider.key]}">
        <span class="slider-value" id="${slider.key}_value">${defaultConfig[slider.key]}</span>
      </div>`;
    host.appendChild(group);
    group.querySelector('input').addEventListener('input', function() {
      document.getElementById(`${slider.key}_value`).textContent = this.value;
      recalculateScores();
    });
  }
}

function currentConfig() {
  const config = { base_score: defaultConfig.base_score };
  for (const slider of SLIDERS) {
    config[slider.key] = parseFloat(document.getElementById(slider.key).value);
  }
  return config;
}

function calculateQualityScore(repo, config) {
  let score = config.base_score;
  const totalPrs = repo.total_analyzed_prs || 0;

  if (totalPrs === 0) {
    score -= config.no_prs_penalty;
  } else {
    const selfRatio = (repo.self_approved_prs || 0) / totalPrs;
    if (selfRatio > config.self_approval_threshold) {
      score -= Math.min(config.self_approval_penalty, Math.round(selfRatio * 30));
    }
    const externalRatio = (repo.prs_reviewed_by_others || 0) / totalPrs;
    if (externalRatio < config.external_review_threshold) {
      score -= Math.min(config.external_review_penalty, Math.round((config.external_review_threshold - externalRatio) * 50));
    }
    const descRatio = (repo.prs_with_description || 0) / totalPrs;
    if (descRatio < config.descriptions_threshold) {
      score -= Math.min(config.no_descriptions_penalty, Math.round((config.descriptions_threshold - descRatio) * 30));
    }
    const largeRatio = (repo.large_prs_count || 0) / totalPrs;
    if (largeRatio > config.large_prs_threshold) {
      score -= Math.min(config.large_prs_penalty, Math.round(largeRatio * 10));
    }
    const slowRatio = (repo.slow_reviews_count || 0) / totalPrs;
    if (slowRatio > config.slow_review_threshold) {
      score -= Math.min(config.slow_review_penalty, Math.round(slowRatio * 8));
    }
  }

  const totalCommits = repo.total_commits || 0;
  if (totalCommits > 0) {
    const pushRatio = (repo.direct_pushes_to_default || 0) / totalCommits;
    if (pushRatio > config.direct_pushes_threshold) {
      score -= Math.min(config.direct_pushes_penalty, Math.round(pushRatio * 25));
    }
  }

  if ((repo.contributors_count || 0) === 1) {
    score -= config.single_contributor_penalty;
  }

  if (totalCommits === 0) {
    score -= config.no_commits_penalty;
  } else if (repo.last_commit_date) {
    const parsed = Date.parse(repo.last_commit_date);
    if (!Number.isNaN(parsed)) {
      const days = (Date.now() - parsed) / 86400000;
      if (days > config.inactivity_days_threshold) {
        score -= config.inactive_penalty;
      }
    }
  }

  return Math.max(0, Math.min(100, Math.round(score)));
}

function recalculateScores() {
  const config = currentConfig();
  for (const repo of originalData) {
    repo.quality_score = calculateQualityScore(repo, config);
  }
  applyFilters();
}

function populateLanguageFilter() {
  const languages = [...new Set(originalData.map(repo => repo.language || 'Unknown'))].sort();
  const select = document.getElementById('languageFilter');
  for (const language of languages) {
    const option = document.createElement('option');
    option.value = language;
    option.textContent = language;
    select.appendChild(option);
  }
}

function setupFilterListeners() {
  document.getElementById('nameFilter').addEventListener('input', applyFilters);
  document.getElementById('languageFilter').addEventListener('change', applyFilters);
  document.getElementById('minScoreFilter').addEventListener('input', applyFilters);
  document.getElementById('maxScoreFilter').addEventListener('input', applyFilters);
}

function applyFilters() {
  const nameFilter = document.getElementById('nameFilter').value.toLowerCase();
  const languageFilter = document.getElementById('languageFilter').value;
  const minScore = parseInt(document.getElementById('minScoreFilter').value, 10) || 0;
  const maxScore = parseInt(document.getElementById('maxScoreFilter').value, 10) || 100;

  filteredData = originalData.filter(repo => {
    const matchesName = !nameFilter || repo.name.toLowerCase().includes(nameFilter);
    const matchesLanguage = !languageFilter || (repo.language || 'Unknown') === languageFilter;
    const matchesScore = repo.quality_score >= minScore && repo.quality_score <= maxScore;
    return matchesName && matchesLanguage && matchesScore;
  });

  updateTable();
  updateStats();
}

function updateTable() {
  const tbody = document.getElementById('tableBody');
  tbody.innerHTML = '';
  for (const repo of filteredData) {
    const scoreClass = repo.quality_score >= 80 ? 'score-high' : repo.quality_score >= 50 ? 'score-medium' : 'score-low';
    const justification = repo.quality_justification || '';
    const row = document.createElement('tr');
    row.innerHTML = `
      <td><strong>${repo.name}</strong></td>
      <td>${repo.language || 'Unknown'}</td>
      <td><span class="quality-score ${scoreClass}">${repo.quality_score}</span></td>
      <td>${repo.total_analyzed_prs || 0}</td>
      <td>${repo.contributors_count || 0}</td>
      <td>${repo.last_commit_date_formatted || 'Never'}</td>
      <td style="max-width: 300px; overflow: hidden; text-overflow: ellipsis;" title="${justification}">${justification.substring(0, 100)}</td>`;
    tbody.appendChild(row);
  }
}

function updateStats() {
  const total = filteredData.length;
  const avgScore = total > 0 ? Math.round(filteredData.reduce((sum, repo) => sum + repo.quality_score, 0) / total) : 0;
  document.getElementById('totalRepos').textContent = total;
  document.getElementById('avgScore').textContent = avgScore;
  document.getElementById('highQuality').textContent = filteredData.filter(repo => repo.quality_score >= 80).length;
  document.getElementById('lowQuality').textContent = filteredData.filter(repo => repo.quality_score < 50).length;
}

function resetSliders() {
  for (const slider of SLIDERS) {
    document.getElementById(slider.key).value = defaultConfig[slider.key];
    document.getElementById(`${slider.key}_value`).textContent = defaultConfig[slider.key];
  }
  recalculateScores();
}
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<RepositoryRecord> {
        vec![RepositoryRecord {
            name: "tool".to_string(),
            org: "acme".to_string(),
            full_name: "acme/tool".to_string(),
            language: Some("Rust".to_string()),
            total_analyzed_prs: 3,
            quality_score: Some(77),
            ..Default::default()
        }]
    }

    #[test]
    fn html_embeds_dataset_and_defaults() {
        let rendered = render_html(&sample_records(), &ScoringConfig::default())
            .expect("html should render");
        assert!(rendered.contains("\"full_name\":\"acme/tool\""));
        assert!(rendered.contains("\"no_prs_penalty\":50"));
        assert!(!rendered.contains("__REPO_DATA__"));
        assert!(!rendered.contains("__DEFAULT_CONFIG__"));
    }

    #[test]
    fn html_defaults_follow_config_overrides() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.no_prs]
penalty_percent = 35
"#,
        )
        .expect("config should parse");
        let rendered = render_html(&sample_records(), &cfg).expect("html should render");
        assert!(rendered.contains("\"no_prs_penalty\":35"));
    }

    #[test]
    fn html_contains_scoring_function() {
        let rendered =
            render_html(&[], &ScoringConfig::default()).expect("html should render");
        assert!(rendered.contains("function calculateQualityScore"));
        assert!(rendered.contains("Math.max(0, Math.min(100"));
    }
}
