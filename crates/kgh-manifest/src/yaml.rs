//! Structured manifest reader
//!
//! Uses serde_yaml to walk the document for the entry sequence. Accepts
//! either a top-level sequence of records or a mapping holding the sequence
//! under one of `ENTRY_CONTAINERS`.

use crate::record::RawRecord;
use serde_yaml::Value;

/// Mapping keys that may hold the entry sequence
pub const ENTRY_CONTAINERS: &[&str] = &["manifest", "resources", "entries"];

/// Parse YAML text into records
///
/// Returns the parser message when the text is not valid YAML.
pub(crate) fn read_records(text: &str) -> Result<Vec<RawRecord>, String> {
    let blank = text.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    });
    if blank {
        return Ok(Vec::new());
    }

    let doc: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;

    let items = match &doc {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items.as_slice(),
        Value::Mapping(map) => {
            let container = ENTRY_CONTAINERS
                .iter()
                .find_map(|key| map.get(*key).map(|value| (*key, value)));
            match container {
                Some((_, Value::Sequence(items))) => items.as_slice(),
                Some((_, Value::Null)) => return Ok(Vec::new()),
                Some((key, _)) => return Err(format!("'{key}' does not hold a sequence of records")),
                // a lone record
                None => std::slice::from_ref(&doc),
            }
        }
        _ => return Err("document is neither a sequence nor a mapping".to_string()),
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| to_record(index, item))
        .collect())
}

fn to_record(index: usize, item: &Value) -> RawRecord {
    let Value::Mapping(map) = item else {
        return RawRecord::not_a_mapping(index);
    };

    let mut record = RawRecord::new(index, None);
    for (label, value) in map {
        if let (Some(label), Some(value)) = (label.as_str(), scalar(value)) {
            record.push(label, value);
        }
    }
    record
}

/// Render scalar values as text; nested structures are not fields
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_manifest_container() {
        let text = r"
manifest:
  - id: https://kg-hub.berkeleybop.io/kg-covid-19/current/kg-covid-19.tar.gz
    version: 20220301
    compression: tar.gz
    download_url: https://kg-hub.berkeleybop.io/kg-covid-19/20220301/kg-covid-19.tar.gz
  - id: https://kg-hub.berkeleybop.io/kg-covid-19/current/nodes.tsv
";
        let records = read_records(text).unwrap();
        assert_eq!(records.len(), 2);
        let fields = records[0].fields.as_ref().unwrap();
        assert!(fields.contains(&("version".to_string(), "20220301".to_string())));
        assert_eq!(records[1].fields.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn reads_top_level_sequence() {
        let text = "- object_key: k1\n  download_url: /a/old.tsv\n- plain string\n";
        let records = read_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].fields.is_none());
    }

    #[test]
    fn nested_values_are_ignored() {
        let text = "- id: k\n  publisher:\n    id: nested\n  download_url: /x\n";
        let records = read_records(text).unwrap();
        let fields = records[0].fields.as_ref().unwrap();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn empty_container_has_no_records() {
        assert!(read_records("# Manifest for KG-Hub graphs\nmanifest:\n").unwrap().is_empty());
        assert!(read_records("manifest: []\n").unwrap().is_empty());
    }

    #[test]
    fn container_holding_a_scalar_is_rejected() {
        assert!(read_records("manifest: pending\n").is_err());
    }

    #[test]
    fn empty_document_has_no_records() {
        assert!(read_records("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn invalid_yaml_reports_message() {
        assert!(read_records("- id: [unterminated\n").is_err());
    }
}
