//! Rule-based quality scoring.
//!
//! `evaluate` is pure and total: it never fails for a well-formed record, all
//! ratios are guarded against zero denominators, and date parsing failures are
//! ignored. Re-running it on the same record and config always yields the same
//! result, which is what makes `rescore` work on cached data.

use crate::types::config::{RuleParams, ScoringConfig};
use crate::types::record::RepositoryRecord;
use chrono::{DateTime, Utc};

/// External-review ratio above which a positive note is recorded.
const GOOD_EXTERNAL_REVIEW_RATIO: f64 = 0.7;
/// Direct-push ratio below which branch discipline is praised.
const GOOD_DIRECT_PUSH_RATIO: f64 = 0.2;
/// Days since the last commit under which the repo counts as active.
const RECENT_ACTIVITY_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: i64,
    pub justification: String,
}

/// Score a record and write the result back into its derived fields.
/// Facet fields are never touched.
pub fn apply(record: &mut RepositoryRecord, config: &ScoringConfig) {
    let evaluation = evaluate(record, config);
    record.quality_score = Some(evaluation.score);
    record.quality_justification = Some(evaluation.justification);
}

pub fn evaluate(record: &RepositoryRecord, config: &ScoringConfig) -> Evaluation {
    let mut score = config.base_score();
    let mut sentences: Vec<String> = Vec::new();

    let total_prs = record.total_analyzed_prs;

    // PR review quality
    if total_prs == 0 {
        let rule = config.no_prs();
        score -= rule.penalty;
        sentences.push(sentence(
            &rule,
            format!(
                "No pull requests to analyze for review quality, reducing score by {} points",
                rule.penalty
            ),
        ));
    } else {
        let rule = config.high_self_approval();
        let ratio = record.self_approved_prs as f64 / total_prs as f64;
        if ratio > rule.threshold {
            let penalty = capped(rule.penalty, ratio * 30.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "High self-approval rate ({}) reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        }

        let rule = config.low_external_review();
        let ratio = record.prs_reviewed_by_others as f64 / total_prs as f64;
        if ratio < rule.threshold {
            let penalty = capped(rule.penalty, (rule.threshold - ratio) * 50.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "Low external review rate ({}) reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        } else if ratio > GOOD_EXTERNAL_REVIEW_RATIO {
            sentences.push(format!(
                "Good external review rate ({}) maintains high score",
                percent(ratio)
            ));
        }

        let rule = config.no_pr_descriptions();
        let ratio = record.prs_with_description as f64 / total_prs as f64;
        if ratio < rule.threshold {
            let penalty = capped(rule.penalty, (rule.threshold - ratio) * 30.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "Low PR description rate ({}) reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        } else {
            sentences.push(format!(
                "Good documentation with {} of PRs having descriptions",
                percent(ratio)
            ));
        }
    }

    // Branch discipline. The ratio is deliberately not clamped: the direct-push
    // count is a heuristic over the last 100 commits and can exceed a
    // total_commits that came from a different endpoint.
    if record.total_commits > 0 {
        let rule = config.high_direct_pushes();
        let ratio = record.direct_pushes_to_default as f64 / record.total_commits as f64;
        if ratio > rule.threshold {
            let penalty = capped(rule.penalty, ratio * 25.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "High direct push ratio ({}) reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        } else if ratio < GOOD_DIRECT_PUSH_RATIO {
            sentences.push(format!(
                "Good branch discipline with low direct push ratio ({})",
                percent(ratio)
            ));
        }
    }

    // Collaboration. Two or four contributors draw neither penalty nor praise.
    match record.contributors_count {
        1 => {
            let rule = config.single_contributor();
            score -= rule.penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "Single contributor reduces collaboration score by {} points",
                    rule.penalty
                ),
            ));
        }
        n if n >= 5 => sentences.push(format!("Good collaboration with {n} contributors")),
        n if n >= 3 => sentences.push(format!("Moderate collaboration with {n} contributors")),
        _ => {}
    }

    // Activity
    if record.total_commits == 0 {
        let rule = config.no_commits();
        score -= rule.penalty;
        sentences.push(sentence(
            &rule,
            format!("No commits found reduces score by {} points", rule.penalty),
        ));
    } else if let Some(date) = record.last_commit_date.as_deref() {
        if let Some(days) = days_since(date) {
            let rule = config.inactive_repository();
            if days > rule.days_threshold {
                score -= rule.penalty;
                sentences.push(sentence(
                    &rule,
                    format!(
                        "Last commit was {days} days ago, reducing score by {} points",
                        rule.penalty
                    ),
                ));
            } else if days <= RECENT_ACTIVITY_DAYS {
                sentences.push("Recent activity maintains score".to_string());
            }
        }
    }

    // PR size and review latency
    if total_prs > 0 {
        let rule = config.large_prs();
        let ratio = record.large_prs_count as f64 / total_prs as f64;
        if ratio > rule.threshold {
            let penalty = capped(rule.penalty, ratio * 10.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "High share of large PRs ({}) reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        }

        let rule = config.slow_review_response();
        let ratio = record.slow_reviews_count as f64 / total_prs as f64;
        if ratio > rule.threshold {
            let penalty = capped(rule.penalty, ratio * 8.0);
            score -= penalty;
            sentences.push(sentence(
                &rule,
                format!(
                    "Slow review turnaround on {} of PRs reduces score by {penalty} points",
                    percent(ratio)
                ),
            ));
        }
    }

    let justification = if sentences.is_empty() {
        "Repository meets basic quality standards.".to_string()
    } else {
        format!("{}.", sentences.join(". "))
    };

    Evaluation {
        score: score.clamp(0, 100),
        justification,
    }
}

fn capped(cap: i64, raw: f64) -> i64 {
    cap.min(raw.round() as i64)
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn sentence(rule: &RuleParams, default: String) -> String {
    rule.message.clone().unwrap_or(default)
}

/// Whole days elapsed since an ISO-8601 timestamp; `None` when it fails to
/// parse. A parse failure must never fail the evaluation.
fn days_since(date: &str) -> Option<i64> {
    let parsed = DateTime::parse_from_rfc3339(date).ok()?;
    Some((Utc::now() - parsed.with_timezone(&Utc)).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn iso_days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days)).to_rfc3339()
    }

    fn healthy_record() -> RepositoryRecord {
        RepositoryRecord {
            name: "healthy".to_string(),
            org: "acme".to_string(),
            full_name: "acme/healthy".to_string(),
            total_analyzed_prs: 10,
            self_approved_prs: 1,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            direct_pushes_to_default: 5,
            contributors_count: 5,
            last_commit_date: Some(iso_days_ago(10)),
            ..Default::default()
        }
    }

    #[test]
    fn healthy_record_keeps_the_base_score() {
        let evaluation = evaluate(&healthy_record(), &ScoringConfig::default());
        assert_eq!(evaluation.score, 100);
        assert!(evaluation.justification.contains("Good external review rate"));
        assert!(evaluation.justification.contains("Good documentation"));
        assert!(evaluation.justification.contains("Good branch discipline"));
        assert!(evaluation.justification.contains("Good collaboration"));
        assert!(evaluation.justification.contains("Recent activity"));
        assert!(!evaluation.justification.contains("reduces score"));
    }

    #[test]
    fn empty_repository_stacks_independent_penalties() {
        let record = RepositoryRecord {
            contributors_count: 1,
            ..Default::default()
        };
        let evaluation = evaluate(&record, &ScoringConfig::default());
        // 100 - 50 (no PRs) - 10 (single contributor) - 10 (no commits)
        assert_eq!(evaluation.score, 30);
        assert!(evaluation.justification.contains("No pull requests"));
        assert!(evaluation.justification.contains("Single contributor"));
        assert!(evaluation.justification.contains("No commits found"));
    }

    #[test]
    fn score_never_drops_below_zero() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.no_prs]
penalty_percent = 90

[penalties.single_contributor]
penalty_percent = 90
"#,
        )
        .expect("config should parse");
        let record = RepositoryRecord {
            contributors_count: 1,
            ..Default::default()
        };
        assert_eq!(evaluate(&record, &cfg).score, 0);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let record = healthy_record();
        let cfg = ScoringConfig::default();
        assert_eq!(evaluate(&record, &cfg), evaluate(&record, &cfg));
    }

    #[test]
    fn apply_only_writes_derived_fields() {
        let mut record = healthy_record();
        let before = record.clone();
        apply(&mut record, &ScoringConfig::default());

        assert_eq!(record.quality_score, Some(100));
        assert!(record.quality_justification.is_some());

        record.quality_score = before.quality_score.clone();
        record.quality_justification = before.quality_justification.clone();
        assert_eq!(record, before);
    }

    #[test]
    fn self_approval_penalty_is_monotonic() {
        let cfg = ScoringConfig::default();
        let mut previous = i64::MAX;
        for self_approved in 6..=10 {
            let record = RepositoryRecord {
                total_analyzed_prs: 10,
                self_approved_prs: self_approved,
                prs_reviewed_by_others: 8,
                prs_with_description: 9,
                total_commits: 100,
                contributors_count: 5,
                ..Default::default()
            };
            let score = evaluate(&record, &cfg).score;
            assert!(score <= previous, "score rose as self-approvals grew");
            previous = score;
        }
    }

    #[test]
    fn external_review_improvement_never_lowers_score() {
        let cfg = ScoringConfig::default();
        let mut previous = i64::MIN;
        for reviewed in 0..=2 {
            let record = RepositoryRecord {
                total_analyzed_prs: 10,
                prs_reviewed_by_others: reviewed,
                prs_with_description: 9,
                total_commits: 100,
                contributors_count: 5,
                ..Default::default()
            };
            let score = evaluate(&record, &cfg).score;
            assert!(score >= previous, "score dropped as external reviews grew");
            previous = score;
        }
    }

    #[test]
    fn self_approval_penalty_matches_formula() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            self_approved_prs: 6,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        let evaluation = evaluate(&record, &ScoringConfig::default());
        // ratio 0.6 -> round(0.6 * 30) = 18, under the 25 cap
        assert_eq!(evaluation.score, 82);
        assert!(evaluation.justification.contains("High self-approval rate (60.0%)"));
    }

    #[test]
    fn self_approval_penalty_respects_cap() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            self_approved_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 1.0 -> round(30) capped at 25
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 75);
    }

    #[test]
    fn external_review_penalty_matches_formula() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 1,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 0.1 -> round((0.3 - 0.1) * 50) = 10
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 90);
    }

    #[test]
    fn description_penalty_matches_formula() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 2,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 0.2 -> round((0.5 - 0.2) * 30) = 9
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 91);
    }

    #[test]
    fn direct_push_ratio_above_one_is_not_clamped() {
        // Heuristic sample can exceed total_commits; penalty still bounded by cap.
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 40,
            direct_pushes_to_default: 60,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 1.5 -> round(1.5 * 25) = 38 capped at 20
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 80);
    }

    #[test]
    fn inactive_repository_is_penalized() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 5,
            last_commit_date: Some(iso_days_ago(400)),
            ..Default::default()
        };
        let evaluation = evaluate(&record, &ScoringConfig::default());
        assert_eq!(evaluation.score, 95);
        assert!(evaluation.justification.contains("days ago"));
    }

    #[test]
    fn unparseable_commit_date_is_ignored() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 5,
            last_commit_date: Some("not-a-date".to_string()),
            ..Default::default()
        };
        let evaluation = evaluate(&record, &ScoringConfig::default());
        assert_eq!(evaluation.score, 100);
        assert!(!evaluation.justification.contains("days ago"));
        assert!(!evaluation.justification.contains("Recent activity"));
    }

    #[test]
    fn large_pr_share_is_penalized() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            large_prs_count: 5,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 0.5 -> round(0.5 * 10) = 5, at the cap
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 95);
    }

    #[test]
    fn slow_review_share_is_penalized() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            slow_reviews_count: 5,
            total_commits: 100,
            contributors_count: 5,
            ..Default::default()
        };
        // ratio 0.5 -> round(0.5 * 8) = 4, under the 5 cap
        assert_eq!(evaluate(&record, &ScoringConfig::default()).score, 96);
    }

    #[test]
    fn two_and_four_contributors_draw_no_comment() {
        for n in [2u64, 4] {
            let record = RepositoryRecord {
                total_analyzed_prs: 10,
                prs_reviewed_by_others: 8,
                prs_with_description: 9,
                total_commits: 100,
                contributors_count: n,
                ..Default::default()
            };
            let evaluation = evaluate(&record, &ScoringConfig::default());
            assert_eq!(evaluation.score, 100);
            assert!(!evaluation.justification.contains("contributor"));
        }
    }

    #[test]
    fn configured_message_replaces_default_sentence() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.single_contributor]
message = "Bus factor of one"
"#,
        )
        .expect("config should parse");
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            prs_reviewed_by_others: 8,
            prs_with_description: 9,
            total_commits: 100,
            contributors_count: 1,
            ..Default::default()
        };
        let evaluation = evaluate(&record, &cfg);
        assert_eq!(evaluation.score, 90);
        assert!(evaluation.justification.contains("Bus factor of one"));
    }

    #[test]
    fn middling_record_keeps_base_score() {
        let record = RepositoryRecord {
            total_analyzed_prs: 10,
            self_approved_prs: 2,
            prs_reviewed_by_others: 5,
            prs_with_description: 6,
            total_commits: 100,
            direct_pushes_to_default: 30,
            contributors_count: 2,
            last_commit_date: Some(iso_days_ago(100)),
            ..Default::default()
        };
        let evaluation = evaluate(&record, &ScoringConfig::default());
        assert_eq!(evaluation.score, 100);
        // Description ratio 0.6 >= 0.5 still records the positive note.
        assert!(evaluation.justification.contains("Good documentation"));
    }

    #[test]
    fn justification_terminates_with_a_period() {
        let evaluation = evaluate(&RepositoryRecord::default(), &ScoringConfig::default());
        assert!(evaluation.justification.ends_with('.'));
        assert!(!evaluation.justification.ends_with(".."));
    }

    #[test]
    fn custom_base_score_is_respected() {
        let cfg: ScoringConfig = toml::from_str("base_score = 70").expect("config should parse");
        let evaluation = evaluate(&healthy_record(), &cfg);
        assert_eq!(evaluation.score, 70);
    }
}
