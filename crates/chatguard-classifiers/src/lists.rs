//! Keyword list maintenance: dataset import, cross-language dedup, summaries
//!
//! These operate on the on-disk list directory consumed by
//! [`KeywordStore::load_dir`](crate::keywords::KeywordStore::load_dir).

use crate::keywords::{KeywordList, KeywordStore, ListStatus, MEANINGS_FILE};
use chatguard_core::{Error, LanguageCode, Result, Severity};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// All lists of a directory, keyed by language
pub type ListSet = BTreeMap<LanguageCode, KeywordList>;

/// On-disk gloss table: language code -> lowercase word -> meaning
pub type MeaningTable = BTreeMap<String, BTreeMap<String, String>>;

/// Read every supported language's list; missing or malformed files read as empty
pub fn read_lists(dir: impl AsRef<Path>) -> ListSet {
    let dir = dir.as_ref();
    LanguageCode::SUPPORTED
        .into_iter()
        .map(|language| {
            let path = dir.join(format!("{}.json", language.code()));
            let list = std::fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|content| KeywordList::from_json(&content))
                .unwrap_or_else(|e| {
                    if path.exists() {
                        warn!(path = %path.display(), error = %e, "Treating malformed list as empty");
                    }
                    KeywordList::default()
                });
            (language, list)
        })
        .collect()
}

/// Write lists as pretty JSON, one file per language
pub fn write_lists(dir: impl AsRef<Path>, lists: &ListSet) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    for (language, list) in lists {
        let path = dir.join(format!("{}.json", language.code()));
        std::fs::write(&path, serde_json::to_string_pretty(list)?)?;
    }
    Ok(())
}

/// Read the gloss table next to the lists; absent or malformed reads as empty
pub fn read_meanings(dir: impl AsRef<Path>) -> MeaningTable {
    let path = dir.as_ref().join(MEANINGS_FILE);
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn write_meanings(dir: impl AsRef<Path>, meanings: &MeaningTable) -> Result<()> {
    let path = dir.as_ref().join(MEANINGS_FILE);
    std::fs::write(path, serde_json::to_string_pretty(meanings)?)?;
    Ok(())
}

/// One row of a keyword dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub language: LanguageCode,
    pub word: String,
    pub meaning: String,
    pub severity: Severity,
}

/// Parse `language,word,meaning,severity` rows (comma or tab separated).
///
/// The first line is a header. Rows with fewer than four fields or an
/// unrecognized language are skipped.
pub fn parse_dataset(content: &str) -> Result<Vec<DatasetRow>> {
    let separator =
        Regex::new(r"\t|,").map_err(|e| Error::internal(format!("Failed to compile separator: {}", e)))?;

    let rows = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = separator
                .split(line)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if parts.len() < 4 {
                debug!(line, "Skipping short dataset row");
                return None;
            }
            let Some(language) = LanguageCode::from_name(parts[0]) else {
                debug!(language = parts[0], "Skipping row with unknown language");
                return None;
            };
            Some(DatasetRow {
                language,
                word: parts[1].to_string(),
                meaning: parts[2].to_string(),
                severity: Severity::from_label(parts[3]),
            })
        })
        .collect();

    Ok(rows)
}

/// Counts from an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Words newly added to a tier
    pub added: usize,

    /// Words moved from another tier of the same language
    pub moved: usize,

    /// Words already present in the right tier
    pub unchanged: usize,
}

/// Merge dataset rows into lists and the gloss table.
///
/// A word already listed in another tier of its language moves to the
/// dataset's tier. Tiers end up deduplicated and sorted.
pub fn import_rows(lists: &mut ListSet, meanings: &mut MeaningTable, rows: &[DatasetRow]) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        let list = lists.entry(row.language).or_default();

        let mut was_elsewhere = false;
        for severity in Severity::DESCENDING {
            if severity != row.severity {
                let tier = list.tier_mut(severity);
                let before = tier.len();
                tier.retain(|w| w != &row.word);
                was_elsewhere |= tier.len() != before;
            }
        }

        let tier = list.tier_mut(row.severity);
        if tier.contains(&row.word) {
            report.unchanged += 1;
        } else {
            tier.push(row.word.clone());
            if was_elsewhere {
                report.moved += 1;
            } else {
                report.added += 1;
            }
        }

        meanings
            .entry(row.language.code().to_string())
            .or_default()
            .insert(row.word.to_lowercase(), row.meaning.clone());
    }

    for list in lists.values_mut() {
        for severity in Severity::DESCENDING {
            let tier = list.tier_mut(severity);
            tier.sort();
            tier.dedup();
        }
    }

    report
}

/// Import a dataset file into a list directory
pub fn import_dataset(csv_path: impl AsRef<Path>, lists_dir: impl AsRef<Path>) -> Result<ImportReport> {
    let lists_dir = lists_dir.as_ref();
    let content = std::fs::read_to_string(csv_path.as_ref())?;
    let rows = parse_dataset(&content)?;

    let mut lists = read_lists(lists_dir);
    let mut meanings = read_meanings(lists_dir);
    let report = import_rows(&mut lists, &mut meanings, &rows);

    write_lists(lists_dir, &lists)?;
    write_meanings(lists_dir, &meanings)?;

    info!(
        rows = rows.len(),
        added = report.added,
        moved = report.moved,
        "Dataset imported"
    );
    Ok(report)
}

/// Remove each keyword from every language except its primary one.
///
/// `primary` maps a lowercase keyword to the language that owns it; keywords
/// not in the map are left alone. Returns the number of entries removed.
pub fn dedup_primary(lists: &mut ListSet, primary: &HashMap<String, LanguageCode>) -> usize {
    let mut removed = 0;

    for (language, list) in lists.iter_mut() {
        for severity in Severity::DESCENDING {
            list.tier_mut(severity).retain(|word| {
                let keep = primary
                    .get(&word.to_lowercase())
                    .map_or(true, |owner| owner == language);
                if !keep {
                    debug!(language = %language, word = %word, "Removing non-primary keyword");
                    removed += 1;
                }
                keep
            });
        }
    }

    removed
}

/// Parse a primary-language map from JSON (`{"word": "hin", ...}`)
pub fn parse_primary_map(json: &str) -> Result<HashMap<String, LanguageCode>> {
    let raw: HashMap<String, String> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(word, code)| {
            let language = code.parse::<LanguageCode>().map_err(Error::config)?;
            Ok((word.to_lowercase(), language))
        })
        .collect()
}

/// Per-language tier counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub language: LanguageCode,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub status: ListStatus,
}

impl ListSummary {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Summarize every supported language in a store
pub fn summarize(store: &KeywordStore) -> Vec<ListSummary> {
    store
        .statuses()
        .map(|(language, status)| {
            let list = store.load_list(language);
            ListSummary {
                language,
                high: list.high.len(),
                medium: list.medium.len(),
                low: list.low.len(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATASET: &str = "Language,Word,Meaning,Severity
Hindi,pagal,crazy,Medium
English\tdrop dead\tdie\tHigh
Klingon,petaQ,insult,high
Tamil,loosu
Hinglish,marob,will hit,unknown
";

    #[test]
    fn test_parse_dataset() {
        let rows = parse_dataset(DATASET).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].language, LanguageCode::Hindi);
        assert_eq!(rows[1].word, "drop dead");
        assert_eq!(rows[1].severity, Severity::High);
        assert_eq!(rows[2].language, LanguageCode::Hinglish);
        assert_eq!(rows[2].severity, Severity::Medium);
    }

    #[test]
    fn test_import_moves_between_tiers_and_sorts() {
        let mut lists = ListSet::new();
        lists.insert(
            LanguageCode::English,
            KeywordList {
                high: vec![],
                medium: vec!["zealot".into(), "drop dead".into()],
                low: vec![],
            },
        );
        let mut meanings = MeaningTable::new();
        let rows = parse_dataset(DATASET).unwrap();

        let report = import_rows(&mut lists, &mut meanings, &rows);

        assert_eq!(report, ImportReport { added: 2, moved: 1, unchanged: 0 });
        let eng = &lists[&LanguageCode::English];
        assert_eq!(eng.high, vec!["drop dead"]);
        assert_eq!(eng.medium, vec!["zealot"]);
        assert_eq!(meanings["hin"]["pagal"], "crazy");

        let again = import_rows(&mut lists, &mut meanings, &rows);
        assert_eq!(again.unchanged, 3);
    }

    #[test]
    fn test_import_dataset_round_trip_through_store() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("dataset.csv");
        std::fs::write(&csv, DATASET).unwrap();
        let lists_dir = dir.path().join("lists");

        let report = import_dataset(&csv, &lists_dir).unwrap();
        assert_eq!(report.added, 3);

        let store = KeywordStore::load_dir(&lists_dir);
        assert_eq!(store.load_list(LanguageCode::Hindi).medium, vec!["pagal"]);
        assert_eq!(store.meaning(LanguageCode::Hindi, "pagal"), Some("crazy"));
        assert_eq!(store.status(LanguageCode::Tamil), ListStatus::Empty);
    }

    #[test]
    fn test_dedup_primary() {
        let mut lists = ListSet::new();
        lists.insert(
            LanguageCode::Hindi,
            KeywordList {
                medium: vec!["murkh".into(), "pagal".into()],
                ..Default::default()
            },
        );
        lists.insert(
            LanguageCode::Gujarati,
            KeywordList {
                medium: vec!["Murkh".into(), "gadho".into()],
                ..Default::default()
            },
        );
        let primary = parse_primary_map(r#"{"murkh": "hin", "gadho": "guj"}"#).unwrap();

        let removed = dedup_primary(&mut lists, &primary);

        assert_eq!(removed, 1);
        assert_eq!(lists[&LanguageCode::Hindi].medium, vec!["murkh", "pagal"]);
        assert_eq!(lists[&LanguageCode::Gujarati].medium, vec!["gadho"]);
    }

    #[test]
    fn test_parse_primary_map_rejects_unknown_code() {
        assert!(parse_primary_map(r#"{"word": "xx"}"#).is_err());
    }

    #[test]
    fn test_summarize() {
        let store = KeywordStore::builder()
            .keywords(LanguageCode::English, Severity::High, ["a", "b"])
            .keywords(LanguageCode::English, Severity::Low, ["c"])
            .build();

        let summary = summarize(&store);

        assert_eq!(summary.len(), LanguageCode::SUPPORTED.len());
        assert_eq!(summary[0].language, LanguageCode::English);
        assert_eq!(summary[0].total(), 3);
        assert_eq!(summary[1].status, ListStatus::Missing);
    }
}
