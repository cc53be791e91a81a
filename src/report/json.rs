use crate::error::Result;
use crate::types::record::RepositoryRecord;
use std::path::Path;

pub fn render_json(records: &[RepositoryRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn write_json(records: &[RepositoryRecord], path: &Path) -> Result<()> {
    std::fs::write(path, render_json(records)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_an_array_of_records() {
        let records = vec![RepositoryRecord {
            name: "tool".to_string(),
            org: "acme".to_string(),
            full_name: "acme/tool".to_string(),
            quality_score: Some(73),
            ..Default::default()
        }];

        let rendered = render_json(&records).expect("json should render");
        assert!(rendered.trim_start().starts_with('['));
        assert!(rendered.contains("\"full_name\": \"acme/tool\""));
        assert!(rendered.contains("\"quality_score\": 73"));
    }

    #[test]
    fn empty_input_renders_empty_array() {
        let rendered = render_json(&[]).expect("json should render");
        assert_eq!(rendered, "[]");
    }
}
