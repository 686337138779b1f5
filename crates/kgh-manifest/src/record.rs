//! Label-addressed records shared by both manifest readers
//!
//! Readers only split the source into records of top-level `label: value`
//! pairs; values of nested mappings and lists are not fields. Turning a
//! record into a `ManifestEntry` happens here, so both readers apply the
//! same validation.

use crate::entry::{Manifest, ManifestEntry};
use crate::error::{EntryDefect, LoadWarning};
use crate::loader::LoaderConfig;

/// One manifest record before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    pub(crate) index: usize,
    pub(crate) line: Option<usize>,
    /// `None` when the source element was not a mapping
    pub(crate) fields: Option<Vec<(String, String)>>,
}

impl RawRecord {
    pub(crate) fn new(index: usize, line: Option<usize>) -> Self {
        Self {
            index,
            line,
            fields: Some(Vec::new()),
        }
    }

    pub(crate) fn not_a_mapping(index: usize) -> Self {
        Self {
            index,
            line: None,
            fields: None,
        }
    }

    pub(crate) fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        if let Some(fields) = self.fields.as_mut() {
            fields.push((label.into(), value.into()));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.as_ref().is_some_and(Vec::is_empty)
    }

    /// First non-empty value for a label
    fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .as_ref()?
            .iter()
            .find(|(l, v)| l == label && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    fn into_entry(self, config: &LoaderConfig) -> Result<ManifestEntry, EntryDefect> {
        if self.fields.is_none() {
            return Err(EntryDefect::NotAMapping);
        }

        let identifier = config
            .identifier_fields
            .iter()
            .find_map(|label| self.field(label))
            .ok_or(EntryDefect::MissingIdentifier)?;

        let download_url = self
            .field(&config.url_field)
            .and_then(|v| v.split_whitespace().next())
            .ok_or(EntryDefect::MissingDownloadUrl)?;

        let object_key = config.object_key_for(identifier);
        if object_key.is_empty() {
            return Err(EntryDefect::EmptyObjectKey(identifier.to_string()));
        }

        let mut entry = ManifestEntry::new(object_key, download_url);
        entry.version = self.field(&config.version_field).map(str::to_string);
        entry.title = self.field(&config.title_field).map(str::to_string);
        Ok(entry)
    }
}

/// Outcome of turning records into a manifest
#[derive(Debug, Default)]
pub(crate) struct Assembled {
    pub(crate) manifest: Manifest,
    pub(crate) warnings: Vec<LoadWarning>,
    pub(crate) records_seen: usize,
}

/// Validate records, skipping and recording the bad ones
pub(crate) fn assemble<I>(records: I, config: &LoaderConfig) -> Assembled
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut out = Assembled::default();

    for record in records {
        out.records_seen += 1;
        let (index, line) = (record.index, record.line);

        let defect = match record.into_entry(config) {
            Ok(entry) => {
                tracing::debug!(key = %entry.object_key, url = %entry.download_url, "manifest entry");
                match out.manifest.insert(entry) {
                    Ok(()) => continue,
                    Err(dup) => EntryDefect::DuplicateKey(dup.object_key),
                }
            }
            Err(defect) => defect,
        };

        let warning = LoadWarning::MalformedEntry {
            record: index,
            line,
            defect,
        };
        tracing::warn!("{warning}");
        out.warnings.push(warning);
    }

    out
}
