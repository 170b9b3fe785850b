// Polling watcher: accumulate from a capture directory as it fills up
//
// New or modified capture files are ingested on every poll; the table is
// re-rendered only when the store's change notification fired since the
// last render. The dirty flag is the whole subscription payload -
// consumers re-pull through snapshot(), as everywhere else.

use crate::capture;
use crate::export;
use crate::harvester::Harvester;
use anyhow::Result;
use fxhash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::info;

pub async fn watch_dir(harvester: &mut Harvester, dir: &Path, interval_secs: u64) -> Result<()> {
    let dirty = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&dirty);
    let _subscription = harvester.subscribe(Box::new(move || {
        flag.store(true, Ordering::Relaxed);
    }));

    let mut seen: FxHashMap<PathBuf, SystemTime> = FxHashMap::default();
    info!(
        "watching {} every {}s (Ctrl-C to stop)",
        dir.display(),
        interval_secs
    );

    loop {
        let fresh = scan_fresh(&mut seen, dir);
        if !fresh.is_empty() {
            info!("{} new capture file(s)", fresh.len());
            capture::ingest_paths(harvester, &fresh, || {});
        }

        if dirty.swap(false, Ordering::Relaxed) {
            let records = harvester.snapshot();
            println!("{}", export::render_table(&records));
            export::print_summary(records.len());
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}

/// Capture files that are new or have a fresher mtime than last time.
fn scan_fresh(seen: &mut FxHashMap<PathBuf, SystemTime>, dir: &Path) -> Vec<PathBuf> {
    let mut fresh = Vec::new();
    for path in capture::collect_capture_paths(dir) {
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        match seen.get(&path) {
            Some(previous) if *previous >= modified => {}
            _ => {
                seen.insert(path.clone(), modified);
                fresh.push(path);
            }
        }
    }
    fresh
}
