//! Line scanner for manifest text
//!
//! Tolerates documents that are not valid YAML (truncated or partially
//! written manifests). Records start at a sequence item (`- `) or after a
//! blank line; fields are located by label, not by position.

use crate::record::RawRecord;

/// Split text into label-addressed records
pub(crate) fn scan_records(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut current: Option<RawRecord> = None;
    // Indentation of the sequence items that delimit records
    let mut item_indent: Option<usize> = None;
    // Indentation of the current record's own fields
    let mut field_indent: Option<usize> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            flush(&mut current, &mut records);
            field_indent = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed == "---" || trimmed == "..." {
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start().len();
        let body = match sequence_item(trimmed) {
            Some(rest) => {
                if item_indent.is_some_and(|i| indent > i) {
                    // nested list value inside a record
                    continue;
                }
                item_indent = Some(indent);
                flush(&mut current, &mut records);
                current = Some(RawRecord::new(records.len(), Some(line_no)));
                field_indent = (!rest.is_empty()).then(|| indent + trimmed.len() - rest.len());
                rest
            }
            None => {
                if field_indent.is_some_and(|i| indent > i) {
                    // field of a nested mapping
                    continue;
                }
                trimmed
            }
        };

        let Some((label, value)) = split_field(body) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if current.is_none() || field_indent.is_none() {
            field_indent = Some(indent);
        }
        current
            .get_or_insert_with(|| RawRecord::new(records.len(), Some(line_no)))
            .push(label, value);
    }

    flush(&mut current, &mut records);
    records
}

fn flush(current: &mut Option<RawRecord>, records: &mut Vec<RawRecord>) {
    if let Some(record) = current.take() {
        if !record.is_empty() {
            records.push(record);
        }
    }
}

/// Body of a `- ` sequence item line
fn sequence_item(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix('-')?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Split `label: value`; the separator is a colon followed by whitespace or
/// end of line, so URL schemes stay inside values.
fn split_field(body: &str) -> Option<(&str, &str)> {
    let (pos, _) = body.char_indices().find(|&(i, c)| {
        c == ':'
            && body[i + 1..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace)
    })?;

    let label = unquote(body[..pos].trim());
    if label.is_empty() {
        return None;
    }
    Some((label, unquote(body[pos + 1..].trim())))
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
