use crate::error::AnalyzerError;
use serde::Deserialize;

/// Scoring configuration, loaded from a TOML document.
///
/// Every field is optional: a config that overrides a single rule leaves all
/// other rules at their built-in defaults. Absent keys fall back to defaults,
/// never to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    pub base_score: Option<i64>,
    #[serde(default)]
    pub penalties: PenaltyTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PenaltyTable {
    pub no_prs: Option<RuleConfig>,
    pub high_self_approval: Option<RuleConfig>,
    pub low_external_review: Option<RuleConfig>,
    pub no_pr_descriptions: Option<RuleConfig>,
    pub high_direct_pushes: Option<RuleConfig>,
    pub single_contributor: Option<RuleConfig>,
    pub no_commits: Option<RuleConfig>,
    pub inactive_repository: Option<RuleConfig>,
    pub large_prs: Option<RuleConfig>,
    pub slow_review_response: Option<RuleConfig>,
}

/// One rule's overridable knobs as they appear in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    pub penalty_percent: Option<i64>,
    pub threshold: Option<f64>,
    pub days_threshold: Option<i64>,
    pub files_threshold: Option<u64>,
    pub message: Option<String>,
}

/// A rule's parameters after defaults have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleParams {
    pub penalty: i64,
    pub threshold: f64,
    pub days_threshold: i64,
    pub files_threshold: u64,
    pub message: Option<String>,
}

fn resolve(
    rule: Option<&RuleConfig>,
    penalty: i64,
    threshold: f64,
    days_threshold: i64,
    files_threshold: u64,
) -> RuleParams {
    RuleParams {
        penalty: rule.and_then(|r| r.penalty_percent).unwrap_or(penalty),
        threshold: rule.and_then(|r| r.threshold).unwrap_or(threshold),
        days_threshold: rule.and_then(|r| r.days_threshold).unwrap_or(days_threshold),
        files_threshold: rule.and_then(|r| r.files_threshold).unwrap_or(files_threshold),
        message: rule.and_then(|r| r.message.clone()),
    }
}

impl ScoringConfig {
    pub fn base_score(&self) -> i64 {
        self.base_score.unwrap_or(100)
    }

    pub fn no_prs(&self) -> RuleParams {
        resolve(self.penalties.no_prs.as_ref(), 50, 0.0, 0, 0)
    }

    pub fn high_self_approval(&self) -> RuleParams {
        resolve(self.penalties.high_self_approval.as_ref(), 25, 0.5, 0, 0)
    }

    pub fn low_external_review(&self) -> RuleParams {
        resolve(self.penalties.low_external_review.as_ref(), 15, 0.3, 0, 0)
    }

    pub fn no_pr_descriptions(&self) -> RuleParams {
        resolve(self.penalties.no_pr_descriptions.as_ref(), 15, 0.5, 0, 0)
    }

    pub fn high_direct_pushes(&self) -> RuleParams {
        resolve(self.penalties.high_direct_pushes.as_ref(), 20, 0.5, 0, 0)
    }

    pub fn single_contributor(&self) -> RuleParams {
        resolve(self.penalties.single_contributor.as_ref(), 10, 0.0, 0, 0)
    }

    pub fn no_commits(&self) -> RuleParams {
        resolve(self.penalties.no_commits.as_ref(), 10, 0.0, 0, 0)
    }

    pub fn inactive_repository(&self) -> RuleParams {
        resolve(self.penalties.inactive_repository.as_ref(), 5, 0.0, 365, 0)
    }

    pub fn large_prs(&self) -> RuleParams {
        resolve(self.penalties.large_prs.as_ref(), 5, 0.3, 0, 15)
    }

    pub fn slow_review_response(&self) -> RuleParams {
        resolve(self.penalties.slow_review_response.as_ref(), 5, 0.4, 7, 0)
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if let Some(base) = self.base_score {
            if !(0..=100).contains(&base) {
                return Err(AnalyzerError::ConfigParse(format!(
                    "base_score must be between 0 and 100 (found {base})"
                )));
            }
        }

        for (name, rule) in [
            ("no_prs", &self.penalties.no_prs),
            ("high_self_approval", &self.penalties.high_self_approval),
            ("low_external_review", &self.penalties.low_external_review),
            ("no_pr_descriptions", &self.penalties.no_pr_descriptions),
            ("high_direct_pushes", &self.penalties.high_direct_pushes),
            ("single_contributor", &self.penalties.single_contributor),
            ("no_commits", &self.penalties.no_commits),
            ("inactive_repository", &self.penalties.inactive_repository),
            ("large_prs", &self.penalties.large_prs),
            ("slow_review_response", &self.penalties.slow_review_response),
        ] {
            let Some(rule) = rule else { continue };
            if let Some(penalty) = rule.penalty_percent {
                if !(0..=100).contains(&penalty) {
                    return Err(AnalyzerError::ConfigParse(format!(
                        "penalties.{name}.penalty_percent must be between 0 and 100"
                    )));
                }
            }
            if let Some(threshold) = rule.threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(AnalyzerError::ConfigParse(format!(
                        "penalties.{name}.threshold must be between 0.0 and 1.0"
                    )));
                }
            }
            if let Some(days) = rule.days_threshold {
                if days < 0 {
                    return Err(AnalyzerError::ConfigParse(format!(
                        "penalties.{name}.days_threshold must not be negative"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_document_is_empty() {
        let cfg: ScoringConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(cfg.base_score(), 100);
        assert_eq!(cfg.no_prs().penalty, 50);
        assert_eq!(cfg.high_self_approval().penalty, 25);
        assert_eq!(cfg.high_self_approval().threshold, 0.5);
        assert_eq!(cfg.low_external_review().threshold, 0.3);
        assert_eq!(cfg.inactive_repository().days_threshold, 365);
        assert_eq!(cfg.large_prs().files_threshold, 15);
        assert_eq!(cfg.slow_review_response().days_threshold, 7);
    }

    #[test]
    fn partial_override_keeps_other_rules_at_defaults() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
base_score = 90

[penalties.high_self_approval]
penalty_percent = 40
threshold = 0.25
"#,
        )
        .expect("config should parse");

        assert_eq!(cfg.base_score(), 90);
        assert_eq!(cfg.high_self_approval().penalty, 40);
        assert_eq!(cfg.high_self_approval().threshold, 0.25);
        // Untouched rules keep the built-in values.
        assert_eq!(cfg.no_prs().penalty, 50);
        assert_eq!(cfg.no_pr_descriptions().threshold, 0.5);
    }

    #[test]
    fn partial_rule_table_fills_missing_keys() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.inactive_repository]
days_threshold = 180
"#,
        )
        .expect("config should parse");

        let rule = cfg.inactive_repository();
        assert_eq!(rule.days_threshold, 180);
        assert_eq!(rule.penalty, 5);
    }

    #[test]
    fn message_override_is_carried_through() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.single_contributor]
message = "Bus factor of one"
"#,
        )
        .expect("config should parse");
        assert_eq!(
            cfg.single_contributor().message.as_deref(),
            Some("Bus factor of one")
        );
    }

    #[test]
    fn validate_rejects_out_of_range_base_score() {
        let cfg: ScoringConfig =
            toml::from_str("base_score = 150").expect("config should parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
[penalties.high_self_approval]
threshold = 1.5
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("high_self_approval.threshold"));
    }

    #[test]
    fn validate_accepts_boundaries() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
base_score = 100

[penalties.low_external_review]
penalty_percent = 0
threshold = 1.0
"#,
        )
        .expect("config should parse");
        assert!(cfg.validate().is_ok());
    }
}
