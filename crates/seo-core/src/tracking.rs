//! Flat JSON tracking files.
//!
//! Each file is read fully, mutated in memory, and rewritten whole through
//! [`io::atomic_write`]. A missing file is an empty tracker; an unparseable
//! one is an error rather than a silent reset, so a bad edit never causes
//! every URL or topic to be processed again.

use crate::error::{Result, SeoError};
use crate::{io, paths};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Internal file I/O
// ---------------------------------------------------------------------------

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let Some(content) = io::read_optional(path)? else {
        return Ok(T::default());
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content).map_err(|source| SeoError::TrackingCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_string_pretty(value)?;
    data.push('\n');
    io::atomic_write(path, data.as_bytes())
}

// ---------------------------------------------------------------------------
// IndexedUrls
// ---------------------------------------------------------------------------

/// URLs already submitted to search engines (`agents/.indexed_urls.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedUrls {
    #[serde(default)]
    pub urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl IndexedUrls {
    pub fn load(root: &Path) -> Result<Self> {
        load_json(&paths::indexed_urls_path(root))
    }

    pub fn save(&mut self, root: &Path) -> Result<()> {
        self.last_updated = Some(Utc::now());
        save_json(&paths::indexed_urls_path(root), self)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// URLs from `candidates` not yet tracked, in first-seen order, without
    /// duplicates.
    pub fn unseen<'a>(&self, candidates: &'a [String]) -> Vec<&'a str> {
        let mut seen = BTreeSet::new();
        candidates
            .iter()
            .map(String::as_str)
            .filter(|u| !self.contains(u) && seen.insert(*u))
            .collect()
    }

    /// Add URLs; returns how many were new.
    pub fn merge<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            if self.urls.insert(url.into()) {
                added += 1;
            }
        }
        added
    }
}

// ---------------------------------------------------------------------------
// ContentTracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Keyword,
    Landing,
    Evergreen,
}

/// Topics the content engine has already written (`agents/.content_tracking.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentTracking {
    #[serde(default)]
    pub created_keywords: Vec<String>,
    #[serde(default)]
    pub created_landing: Vec<String>,
    #[serde(default)]
    pub created_evergreen: Vec<String>,
}

impl ContentTracking {
    pub fn load(root: &Path) -> Result<Self> {
        load_json(&paths::content_tracking_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        save_json(&paths::content_tracking_path(root), self)
    }

    fn list(&self, kind: ContentKind) -> &Vec<String> {
        match kind {
            ContentKind::Keyword => &self.created_keywords,
            ContentKind::Landing => &self.created_landing,
            ContentKind::Evergreen => &self.created_evergreen,
        }
    }

    fn list_mut(&mut self, kind: ContentKind) -> &mut Vec<String> {
        match kind {
            ContentKind::Keyword => &mut self.created_keywords,
            ContentKind::Landing => &mut self.created_landing,
            ContentKind::Evergreen => &mut self.created_evergreen,
        }
    }

    pub fn is_created(&self, kind: ContentKind, key: &str) -> bool {
        self.list(kind).iter().any(|k| k == key)
    }

    /// Record `key`; returns `false` if it was already recorded.
    pub fn mark(&mut self, kind: ContentKind, key: &str) -> bool {
        if self.is_created(kind, key) {
            return false;
        }
        self.list_mut(kind).push(key.to_string());
        true
    }

    pub fn reset(&mut self, kind: ContentKind) {
        self.list_mut(kind).clear();
    }
}

// ---------------------------------------------------------------------------
// AnsweredQuestions
// ---------------------------------------------------------------------------

/// Stable fingerprint for a question title: the first 16 hex chars of the
/// SHA-256 of the trimmed, lowercased title.
pub fn question_fingerprint(title: &str) -> String {
    let digest = Sha256::digest(title.trim().to_lowercase().as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Questions already turned into articles (`blog/.answered_questions.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AnsweredQuestions {
    fingerprints: BTreeSet<String>,
}

impl AnsweredQuestions {
    pub fn load(root: &Path) -> Result<Self> {
        load_json(&paths::answered_questions_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        save_json(&paths::answered_questions_path(root), self)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.fingerprints.contains(&question_fingerprint(title))
    }

    pub fn insert_title(&mut self, title: &str) -> bool {
        self.fingerprints.insert(question_fingerprint(title))
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DirectoryTracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = SeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "submitted" => Ok(SubmissionStatus::Submitted),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(SeoError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_date: Option<NaiveDate>,
    #[serde(default)]
    pub approved_date: Option<NaiveDate>,
    #[serde(default)]
    pub backlink_url: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Per-directory submission status (`agents/directory_tracking.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectoryTracking {
    #[serde(default)]
    pub submissions: BTreeMap<String, Submission>,
}

impl DirectoryTracking {
    pub fn load(root: &Path) -> Result<Self> {
        load_json(&paths::directory_tracking_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        save_json(&paths::directory_tracking_path(root), self)
    }

    /// Add a pending entry for every name not yet tracked. Existing entries
    /// are left untouched. Returns how many were added.
    pub fn init<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for name in names {
            if !self.submissions.contains_key(name) {
                self.submissions
                    .insert(name.to_string(), Submission::default());
                added += 1;
            }
        }
        added
    }

    /// Update one entry. `submitted_date` is stamped the first time an entry
    /// leaves `pending`; `approved_date` when it becomes `approved`.
    pub fn mark(
        &mut self,
        name: &str,
        status: SubmissionStatus,
        backlink_url: Option<String>,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<&Submission> {
        let entry = self
            .submissions
            .get_mut(name)
            .ok_or_else(|| SeoError::UnknownDirectory(name.to_string()))?;

        entry.status = status;
        if status != SubmissionStatus::Pending && entry.submitted_date.is_none() {
            entry.submitted_date = Some(today);
        }
        if status == SubmissionStatus::Approved {
            entry.approved_date = Some(today);
        }
        if backlink_url.is_some() {
            entry.backlink_url = backlink_url;
        }
        if let Some(n) = notes {
            entry.notes = n;
        }
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn indexed_urls_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let tracked = IndexedUrls::load(dir.path()).unwrap();
        assert!(tracked.urls.is_empty());
        assert!(tracked.last_updated.is_none());
    }

    #[test]
    fn indexed_urls_merge_deduplicates() {
        let mut tracked = IndexedUrls::default();
        assert_eq!(tracked.merge(["https://a", "https://b", "https://a"]), 2);
        assert_eq!(tracked.merge(["https://b"]), 0);
        assert_eq!(tracked.urls.len(), 2);
    }

    #[test]
    fn indexed_urls_unseen_keeps_order_and_drops_repeats() {
        let mut tracked = IndexedUrls::default();
        tracked.merge(["https://s/old"]);
        let sitemap: Vec<String> = ["https://s/z", "https://s/old", "https://s/a", "https://s/z"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tracked.unseen(&sitemap), vec!["https://s/z", "https://s/a"]);
    }

    #[test]
    fn indexed_urls_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut tracked = IndexedUrls::default();
        tracked.merge(["https://s/b", "https://s/a"]);
        tracked.save(dir.path()).unwrap();

        let raw = std::fs::read_to_string(paths::indexed_urls_path(dir.path())).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["urls"], serde_json::json!(["https://s/a", "https://s/b"]));
        assert!(json["last_updated"].is_string());

        let reloaded = IndexedUrls::load(dir.path()).unwrap();
        assert!(reloaded.contains("https://s/a"));
    }

    #[test]
    fn indexed_urls_reads_file_without_timestamp() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("agents")).unwrap();
        std::fs::write(
            paths::indexed_urls_path(dir.path()),
            r#"{"urls": ["https://s/x"]}"#,
        )
        .unwrap();
        assert!(IndexedUrls::load(dir.path()).unwrap().contains("https://s/x"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("agents")).unwrap();
        std::fs::write(paths::content_tracking_path(dir.path()), "{not json").unwrap();
        let err = ContentTracking::load(dir.path()).unwrap_err();
        assert!(matches!(err, SeoError::TrackingCorrupt { .. }));
    }

    #[test]
    fn content_tracking_mark_is_idempotent() {
        let mut t = ContentTracking::default();
        assert!(t.mark(ContentKind::Keyword, "proforma invoice"));
        assert!(!t.mark(ContentKind::Keyword, "proforma invoice"));
        assert!(t.is_created(ContentKind::Keyword, "proforma invoice"));
        assert!(!t.is_created(ContentKind::Evergreen, "proforma invoice"));
        assert_eq!(t.created_keywords.len(), 1);
    }

    #[test]
    fn content_tracking_reset_clears_one_kind() {
        let mut t = ContentTracking::default();
        t.mark(ContentKind::Keyword, "a");
        t.mark(ContentKind::Landing, "b");
        t.reset(ContentKind::Keyword);
        assert!(t.created_keywords.is_empty());
        assert_eq!(t.created_landing, vec!["b".to_string()]);
    }

    #[test]
    fn content_tracking_roundtrip_uses_original_keys() {
        let dir = TempDir::new().unwrap();
        let mut t = ContentTracking::default();
        t.mark(ContentKind::Evergreen, "How to Handle Clients Who Won't Pay");
        t.save(dir.path()).unwrap();
        let raw = std::fs::read_to_string(paths::content_tracking_path(dir.path())).unwrap();
        assert!(raw.contains("created_evergreen"));
        assert_eq!(ContentTracking::load(dir.path()).unwrap(), t);
    }

    #[test]
    fn fingerprint_is_stable_and_case_insensitive() {
        let a = question_fingerprint("How do I invoice a client?");
        let b = question_fingerprint("  HOW DO I INVOICE A CLIENT?  ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, question_fingerprint("How do I bill a client?"));
    }

    #[test]
    fn answered_questions_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut answered = AnsweredQuestions::load(dir.path()).unwrap();
        assert!(answered.is_empty());
        assert!(answered.insert_title("Should I charge late fees?"));
        assert!(!answered.insert_title("should i charge late fees?"));
        answered.save(dir.path()).unwrap();

        let reloaded = AnsweredQuestions::load(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains_title("Should I charge late fees?"));

        let raw = std::fs::read_to_string(paths::answered_questions_path(dir.path())).unwrap();
        assert!(serde_json::from_str::<Vec<String>>(&raw).is_ok());
    }

    #[test]
    fn directory_init_preserves_existing_entries() {
        let mut t = DirectoryTracking::default();
        t.init(["G2"]);
        t.mark("G2", SubmissionStatus::Submitted, None, None, date("2026-01-02"))
            .unwrap();
        assert_eq!(t.init(["G2", "Capterra"]), 1);
        assert_eq!(t.submissions["G2"].status, SubmissionStatus::Submitted);
        assert_eq!(t.submissions["Capterra"].status, SubmissionStatus::Pending);
    }

    #[test]
    fn directory_mark_stamps_dates() {
        let mut t = DirectoryTracking::default();
        t.init(["Slant"]);
        t.mark("Slant", SubmissionStatus::Submitted, None, None, date("2026-03-01"))
            .unwrap();
        let s = t
            .mark(
                "Slant",
                SubmissionStatus::Approved,
                Some("https://www.slant.co/x".into()),
                Some("listed".into()),
                date("2026-03-09"),
            )
            .unwrap();
        assert_eq!(s.submitted_date, Some(date("2026-03-01")));
        assert_eq!(s.approved_date, Some(date("2026-03-09")));
        assert_eq!(s.backlink_url.as_deref(), Some("https://www.slant.co/x"));
        assert_eq!(s.notes, "listed");
    }

    #[test]
    fn directory_mark_unknown_name_errors() {
        let mut t = DirectoryTracking::default();
        let err = t
            .mark("Nowhere", SubmissionStatus::Approved, None, None, date("2026-01-01"))
            .unwrap_err();
        assert!(matches!(err, SeoError::UnknownDirectory(_)));
    }

    #[test]
    fn submission_status_parses() {
        assert_eq!(
            "Approved".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Approved
        );
        assert!("done".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn directory_tracking_reads_null_dates() {
        let json = r#"{"submissions": {"G2": {"status": "pending", "submitted_date": null,
            "approved_date": null, "backlink_url": null, "notes": ""}}}"#;
        let t: DirectoryTracking = serde_json::from_str(json).unwrap();
        assert_eq!(t.submissions["G2"], Submission::default());
    }
}
