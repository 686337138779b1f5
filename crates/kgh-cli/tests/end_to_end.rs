//! Full runs against manifest files on disk and in-memory storage.

use kgh_cli::{run, Exit, Invocation, Settings};
use kgh_test_utils::{manifest_text, RecordingStorage, StorageCall};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn manifest(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        self.write(name, &manifest_text(entries))
    }
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

async fn invoke(args: &[String], storage: &Arc<RecordingStorage>) -> (Exit, String) {
    let argv = std::iter::once("kgh-redirect".to_string()).chain(args.iter().cloned());
    let invocation = Invocation::try_parse_from(argv).unwrap();
    let settings = Settings::resolve(&invocation).unwrap();
    let mut out = Vec::new();
    let exit = run(&invocation, &settings, storage.clone(), &mut out)
        .await
        .unwrap();
    (exit, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn dry_run_prints_instruction_without_storage_calls() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/old.tsv")]);
    let new = ws.manifest("new.yaml", &[("k1", "/a/new.tsv")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(&[arg(&new), "--previous".into(), arg(&old)], &storage).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(storage.call_count(), 0);
    assert!(stdout.contains("/a/old.tsv -> /a/new.tsv [skipped]"));
    assert!(stdout.contains("redirects computed: 1"));
    assert!(stdout.contains("mode: dry run, bucket: kg-hub-public-data"));
}

#[tokio::test]
async fn apply_writes_redirect_then_invalidates() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/old.tsv"), ("k2", "/b/same.tsv")]);
    let new = ws.manifest("new.yaml", &[("k1", "/a/new.tsv"), ("k2", "/b/same.tsv")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(
        &[arg(&new), "--previous".into(), arg(&old), "--apply".into()],
        &storage,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(
        storage.calls(),
        vec![
            StorageCall::PutRedirect {
                source: "/a/old.tsv".into(),
                target: "/a/new.tsv".into(),
            },
            StorageCall::Invalidate {
                path: "/a/old.tsv".into(),
            },
        ]
    );
    assert!(stdout.contains("redirects applied: 1, failed: 0, skipped: 0"));
}

#[tokio::test]
async fn swapped_urls_are_refused_before_any_write() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("a", "/url1"), ("b", "/url2")]);
    let new = ws.manifest("new.yaml", &[("a", "/url2"), ("b", "/url1")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(
        &[arg(&new), "--previous".into(), arg(&old), "--apply".into()],
        &storage,
    )
    .await;

    assert_eq!(exit, Exit::Refused);
    assert_eq!(exit.code(), 3);
    assert_eq!(storage.call_count(), 0);
    assert!(stdout.contains("redirects refused"));
}

#[tokio::test]
async fn missing_manifest_exits_unreadable() {
    let ws = Workspace::new();
    let storage = Arc::new(RecordingStorage::new());
    let missing = ws.dir.path().join("absent.yaml");

    let (exit, stdout) = invoke(&[arg(&missing)], &storage).await;

    assert_eq!(exit.code(), 1);
    assert!(stdout.contains("load failed: "));
    assert!(stdout.contains("redirects applied: 0, failed: 0, skipped: 0"));
}

#[tokio::test]
async fn missing_previous_manifest_exits_unreadable() {
    let ws = Workspace::new();
    let new = ws.manifest("new.yaml", &[("k1", "/a/new.tsv")]);
    let storage = Arc::new(RecordingStorage::new());
    let missing = ws.dir.path().join("absent.yaml");

    let (exit, stdout) =
        invoke(&[arg(&new), "--previous".into(), arg(&missing)], &storage).await;

    assert_eq!(exit, Exit::Unreadable);
    assert_eq!(storage.call_count(), 0);
    assert!(stdout.contains("1 entries loaded, 0 warnings"));
    assert!(stdout.contains("load failed: "));
    assert!(!stdout.contains("download URLs listed"));
    assert!(stdout.contains("redirects applied: 0, failed: 0, skipped: 0"));
}

#[tokio::test]
async fn chained_redirect_onto_live_url_is_refused() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/u1"), ("k2", "/u2")]);
    let new = ws.manifest("new.yaml", &[("k1", "/u2"), ("k2", "/u3")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(
        &[arg(&new), "--previous".into(), arg(&old), "--apply".into()],
        &storage,
    )
    .await;

    assert_eq!(exit.code(), 3);
    assert_eq!(storage.call_count(), 0);
    assert!(stdout.contains("redirects refused"));
    assert!(stdout.contains("live download of 'k1'"));
}

#[tokio::test]
async fn failed_write_is_reported_and_batch_continues() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("a", "/a/old.tsv"), ("b", "/b/old.tsv")]);
    let new = ws.manifest("new.yaml", &[("a", "/a/new.tsv"), ("b", "/b/new.tsv")]);
    let storage = Arc::new(RecordingStorage::new().always_fail_put("/a/old.tsv"));

    let (exit, stdout) = invoke(
        &[
            arg(&new),
            "--previous".into(),
            arg(&old),
            "--apply".into(),
            "--retries".into(),
            "0".into(),
        ],
        &storage,
    )
    .await;

    assert_eq!(exit, Exit::ApplyFailed);
    assert_eq!(
        storage.redirects(),
        vec![
            ("/a/old.tsv".to_string(), "/a/new.tsv".to_string()),
            ("/b/old.tsv".to_string(), "/b/new.tsv".to_string()),
        ]
    );
    assert!(stdout.contains("redirects applied: 1, failed: 1, skipped: 0"));
    assert!(stdout.contains("failed: put_redirect"));
}

#[tokio::test]
async fn without_previous_lists_download_urls() {
    let ws = Workspace::new();
    let new = ws.manifest(
        "MANIFEST.yaml",
        &[(
            "https://kg-hub.berkeleybop.io/kg-obo/go",
            "https://kg-hub.berkeleybop.io/kg-obo/go/graph.tar.gz",
        )],
    );
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(&[arg(&new), "--apply".into()], &storage).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(storage.call_count(), 0);
    assert!(stdout.contains("kg-obo/go\thttps://kg-hub.berkeleybop.io/kg-obo/go/graph.tar.gz"));
    assert!(stdout.contains("1 download URLs listed"));
}

#[tokio::test]
async fn malformed_entry_is_skipped_with_warning() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/old.tsv")]);
    let new = ws.write(
        "new.yaml",
        "- id: k1\n  download_url: /a/new.tsv\n- id: k2\n  title: no url here\n",
    );
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(&[arg(&new), "--previous".into(), arg(&old)], &storage).await;

    assert_eq!(exit, Exit::Success);
    assert!(stdout.contains("1 entries loaded, 1 warnings"));
    assert!(stdout.contains("/a/old.tsv -> /a/new.tsv"));
}

#[tokio::test]
async fn orphan_notice_redirects_removed_objects() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/x.tsv"), ("gone", "/b/gone.tsv")]);
    let new = ws.manifest("new.yaml", &[("k1", "/a/x.tsv")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, _) = invoke(
        &[
            arg(&new),
            "--previous".into(),
            arg(&old),
            "--orphan-notice".into(),
            "/removed.html".into(),
            "--apply".into(),
        ],
        &storage,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(
        storage.redirects(),
        vec![("/b/gone.tsv".to_string(), "/removed.html".to_string())]
    );
}

#[tokio::test]
async fn json_report_carries_instructions() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/old.tsv")]);
    let new = ws.manifest("new.yaml", &[("k1", "/a/new.tsv")]);
    let storage = Arc::new(RecordingStorage::new());

    let (exit, stdout) = invoke(
        &[arg(&new), "--previous".into(), arg(&old), "--json".into()],
        &storage,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let instruction = &report["resolution"]["instructions"][0];
    assert_eq!(instruction["source_path"], "/a/old.tsv");
    assert_eq!(instruction["target_path"], "/a/new.tsv");
    assert_eq!(report["apply"]["mode"], "dry_run");
    assert_eq!(report["apply"]["outcomes"][0]["status"], "skipped");
}

#[tokio::test]
async fn config_file_sets_bucket() {
    let ws = Workspace::new();
    let old = ws.manifest("old.yaml", &[("k1", "/a/old.tsv")]);
    let new = ws.manifest("new.yaml", &[("k1", "/a/new.tsv")]);
    let config = ws.write("kgh.toml", "[storage]\nbucket = \"kg-hub-staging\"\n");
    let storage = Arc::new(RecordingStorage::new());

    let (_, stdout) = invoke(
        &[
            arg(&new),
            "--previous".into(),
            arg(&old),
            "--config".into(),
            arg(&config),
        ],
        &storage,
    )
    .await;

    assert!(stdout.contains("bucket: kg-hub-staging"));
}
