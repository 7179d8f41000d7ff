//! One update run: fetch, normalize, render, patch, record, alert, commit.
//!
//! All new file contents are computed in memory by [`plan_update`] before
//! anything touches the disk; [`commit`] then replaces each file through a
//! sibling temporary file so a failed run leaves the old contents in place.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::alert::{evaluate_alerts, Alert};
use crate::error::PriceError;
use crate::history::PriceHistory;
use crate::normalizer::{normalize, DisplayRecord};
use crate::patcher::DocumentPatcher;
use crate::render::render_table;
use crate::result::Result;
use crate::settings::Settings;
use crate::source::PriceSource;

/// New contents for one file, not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    /// File to replace.
    pub path: PathBuf,
    /// Full replacement text.
    pub contents: String,
}

/// Everything a run decided, ready to be committed or printed.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    /// One record per configured coin, in configured order.
    pub records: Vec<DisplayRecord>,
    /// Thresholds crossed by this run's quotes.
    pub alerts: Vec<Alert>,
    /// Patched document.
    pub document: PendingWrite,
    /// Whether the patched document differs from the current one.
    pub document_changed: bool,
    /// Updated history file, when history is enabled.
    pub history: Option<PendingWrite>,
    /// Entries appended to the history this run.
    pub history_recorded: usize,
}

impl UpdatePlan {
    /// Number of coins the source had no price for.
    pub fn unavailable_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_available()).count()
    }
}

/// Computes the outcome of a run without writing anything.
pub fn plan_update<S: PriceSource + ?Sized>(
    settings: &Settings,
    source: &S,
    now: DateTime<Utc>,
) -> Result<UpdatePlan> {
    let quotes = source.fetch_quotes(&settings.coins)?;
    info!("Fetched {} quotes for {} coins", quotes.len(), settings.coins.len());

    let records = normalize(&settings.coins, &quotes);
    for record in records.iter().filter(|r| !r.is_available()) {
        warn!("No price returned for {}", record.coin_id);
    }

    let block = render_table(&records, &now);
    let current = read_document(&settings.document_path)?;
    let patcher = DocumentPatcher::new(
        settings.markers.clone(),
        settings.missing_markers,
        &settings.section_heading,
    );
    let patched = patcher.patch(&current, &block)?;
    let document_changed = patched != current;

    let (history, history_recorded) = match &settings.history_path {
        Some(path) => {
            let mut history = PriceHistory::load(path)?;
            let recorded = history.record_all(&records, now, settings.history_limit);
            debug!("Recorded {} history entries into {}", recorded, path.display());
            let pending = PendingWrite {
                path: path.clone(),
                contents: history.to_json()?,
            };
            (Some(pending), recorded)
        }
        None => (None, 0),
    };

    let alerts = evaluate_alerts(&records, &settings.alerts);
    for alert in &alerts {
        warn!("ALERT: {}", alert);
    }

    Ok(UpdatePlan {
        records,
        alerts,
        document: PendingWrite {
            path: settings.document_path.clone(),
            contents: patched,
        },
        document_changed,
        history,
        history_recorded,
    })
}

/// Writes the planned files.
///
/// Every file is first written to a temporary sibling; only when all of them
/// are on disk are they renamed over their targets, document first, then
/// history. A failed temporary write leaves every target untouched.
pub fn commit(plan: &UpdatePlan) -> Result<()> {
    let writes: Vec<&PendingWrite> = std::iter::once(&plan.document)
        .chain(plan.history.iter())
        .collect();

    let mut staged: Vec<(&Path, PathBuf)> = Vec::with_capacity(writes.len());
    for write in writes {
        let tmp = temp_sibling(&write.path);
        if let Err(e) = fs::write(&tmp, &write.contents) {
            discard(&tmp);
            for (_, written) in &staged {
                discard(written);
            }
            return Err(PriceError::file(&tmp, e));
        }
        staged.push((write.path.as_path(), tmp));
    }

    for (i, (path, tmp)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            for (_, leftover) in &staged[i..] {
                discard(leftover);
            }
            return Err(PriceError::file(path, e));
        }
        info!("Updated {}", path.display());
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PriceError::file(path, e))
}

/// Removes a temporary file left behind by a failed commit.
fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", tmp.display(), e);
        }
    }
}

/// Hidden, per-process sibling of `path`: `docs/README.md` becomes
/// `docs/.README.md.<pid>.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::alert::AlertRule;
    use crate::coins::{CoinId, CoinParser};
    use crate::patcher::{DocumentMarkers, MissingMarkerPolicy};
    use crate::quote::{QuoteMap, RawQuote};

    struct StubSource {
        quotes: QuoteMap,
        calls: Cell<usize>,
    }

    impl StubSource {
        fn bitcoin_only() -> Self {
            let mut quotes = QuoteMap::new();
            quotes.insert(
                "bitcoin".to_string(),
                RawQuote {
                    usd: Some(dec!(65000.4)),
                    usd_24h_change: Some(dec!(3.2)),
                },
            );
            StubSource {
                quotes,
                calls: Cell::new(0),
            }
        }
    }

    impl PriceSource for StubSource {
        fn fetch_quotes(&self, _coins: &[CoinId]) -> Result<QuoteMap> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.quotes.clone())
        }
    }

    struct FailingSource;

    impl PriceSource for FailingSource {
        fn fetch_quotes(&self, _coins: &[CoinId]) -> Result<QuoteMap> {
            Err(PriceError::Network("timed out".to_string()))
        }
    }

    struct Workspace {
        dir: PathBuf,
    }

    impl Workspace {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "price_updater_run_{}_{}",
                name,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Workspace { dir }
        }

        fn settings(&self) -> Settings {
            Settings {
                coins: CoinId::parse_list("bitcoin,litecoin").unwrap(),
                document_path: self.dir.join("README.md"),
                history_path: Some(self.dir.join("history.json")),
                ..Settings::default()
            }
        }
    }

    impl Drop for Workspace {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn readme_with_markers() -> String {
        let markers = DocumentMarkers::default();
        format!("# Project\n\n{}\nstale\n{}\n\nMore docs.\n", markers.start, markers.end)
    }

    #[test]
    fn run_patches_document_and_records_history() {
        let ws = Workspace::new("happy");
        let settings = ws.settings();
        fs::write(&settings.document_path, readme_with_markers()).unwrap();

        let plan = run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap();

        let doc = fs::read_to_string(&settings.document_path).unwrap();
        assert!(doc.starts_with("# Project\n\n<!-- CRYPTO-PRICES:START -->\n| Coin |"));
        assert!(doc.contains("| Bitcoin | $65,000.40 | +3.20% | 📈 up |"));
        assert!(doc.contains("| Litecoin | unavailable | n/a | n/a |"));
        assert!(doc.contains("**Last Updated:** 2026-10-16 12:00 UTC\n<!-- CRYPTO-PRICES:END -->"));
        assert!(doc.ends_with("\n\nMore docs.\n"));
        assert!(!doc.contains("stale"));

        assert!(plan.document_changed);
        assert_eq!(plan.unavailable_count(), 1);
        assert_eq!(plan.history_recorded, 1);

        let history_path = settings.history_path.as_ref().unwrap();
        let history = PriceHistory::load(history_path).unwrap();
        assert_eq!(history.entries(&"bitcoin".parse().unwrap()).len(), 1);
        assert!(!temp_sibling(&settings.document_path).exists());
    }

    #[test]
    fn second_identical_run_leaves_document_unchanged() {
        let ws = Workspace::new("idempotent");
        let settings = ws.settings();
        fs::write(&settings.document_path, readme_with_markers()).unwrap();
        let source = StubSource::bitcoin_only();

        run_update(&settings, &source, noon()).unwrap();
        let first = fs::read_to_string(&settings.document_path).unwrap();
        let plan = run_update(&settings, &source, noon()).unwrap();
        let second = fs::read_to_string(&settings.document_path).unwrap();

        assert_eq!(first, second);
        assert!(!plan.document_changed);
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn network_failure_writes_nothing() {
        let ws = Workspace::new("network");
        let settings = ws.settings();
        let original = readme_with_markers();
        fs::write(&settings.document_path, &original).unwrap();

        let err = run_update(&settings, &FailingSource, noon()).unwrap_err();

        assert!(matches!(err, PriceError::Network(_)));
        assert_eq!(fs::read_to_string(&settings.document_path).unwrap(), original);
        assert!(!settings.history_path.as_ref().unwrap().exists());
    }

    #[test]
    fn reject_policy_failure_writes_nothing() {
        let ws = Workspace::new("reject");
        let settings = Settings {
            missing_markers: MissingMarkerPolicy::Reject,
            ..ws.settings()
        };
        let original = "# Project\n\nNo markers here.\n";
        fs::write(&settings.document_path, original).unwrap();

        let err = run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap_err();

        assert!(matches!(err, PriceError::MarkersNotFound { .. }));
        assert_eq!(fs::read_to_string(&settings.document_path).unwrap(), original);
        assert!(!settings.history_path.as_ref().unwrap().exists());
    }

    #[test]
    fn append_policy_adds_section() {
        let ws = Workspace::new("append");
        let settings = ws.settings();
        fs::write(&settings.document_path, "# Project\n").unwrap();

        run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap();

        let doc = fs::read_to_string(&settings.document_path).unwrap();
        assert!(doc.starts_with("# Project\n\n## Crypto Prices\n<!-- CRYPTO-PRICES:START -->\n"));
        assert!(doc.ends_with("<!-- CRYPTO-PRICES:END -->\n"));
    }

    #[test]
    fn missing_document_is_a_file_error() {
        let ws = Workspace::new("missing_doc");
        let settings = ws.settings();
        let err = plan_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap_err();
        assert!(matches!(err, PriceError::File { .. }));
    }

    #[test]
    fn corrupt_history_aborts_before_writing() {
        let ws = Workspace::new("corrupt_history");
        let settings = ws.settings();
        let original = readme_with_markers();
        fs::write(&settings.document_path, &original).unwrap();
        fs::write(settings.history_path.as_ref().unwrap(), "{ not json").unwrap();

        let err = run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap_err();

        assert!(matches!(err, PriceError::Parse(_)));
        assert_eq!(fs::read_to_string(&settings.document_path).unwrap(), original);
    }

    #[test]
    fn unwritable_history_leaves_document_untouched() {
        let ws = Workspace::new("history_dir_missing");
        let settings = Settings {
            history_path: Some(ws.dir.join("no_such_dir").join("h.json")),
            ..ws.settings()
        };
        let original = readme_with_markers();
        fs::write(&settings.document_path, &original).unwrap();

        let err = run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap_err();

        assert!(matches!(err, PriceError::File { .. }));
        assert_eq!(fs::read_to_string(&settings.document_path).unwrap(), original);
        let leftovers: Vec<_> = fs::read_dir(&ws.dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("README.md")]);
    }

    #[test]
    fn commit_keeps_unrelated_tmp_files() {
        let ws = Workspace::new("user_tmp");
        let settings = ws.settings();
        fs::write(&settings.document_path, readme_with_markers()).unwrap();
        let user_file = ws.dir.join("README.md.tmp");
        fs::write(&user_file, "my notes").unwrap();

        run_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap();

        assert_eq!(fs::read_to_string(&user_file).unwrap(), "my notes");
    }

    #[test]
    fn history_disabled_and_alerts_reported() {
        let ws = Workspace::new("alerts");
        let mut alerts = HashMap::new();
        alerts.insert(
            "bitcoin".parse().unwrap(),
            AlertRule {
                price_above: Some(dec!(60000)),
                ..Default::default()
            },
        );
        let settings = Settings {
            history_path: None,
            alerts,
            ..ws.settings()
        };
        fs::write(&settings.document_path, readme_with_markers()).unwrap();

        let plan = plan_update(&settings, &StubSource::bitcoin_only(), noon()).unwrap();

        assert!(plan.history.is_none());
        assert_eq!(plan.alerts.len(), 1);
        assert_eq!(plan.document.path, settings.document_path);
        // planning alone never touches the document
        assert_eq!(
            fs::read_to_string(&settings.document_path).unwrap(),
            readme_with_markers()
        );
    }

    #[test]
    fn temp_sibling_keeps_directory() {
        let tmp = temp_sibling(Path::new("docs/README.md"));
        assert_eq!(
            tmp,
            PathBuf::from(format!("docs/.README.md.{}.tmp", std::process::id()))
        );
        assert_ne!(tmp, PathBuf::from("docs/README.md.tmp"));
    }
}
