// Capture-file ingestion sources
//
// Three shapes of input: raw response bodies (.json/.txt), HAR archives
// (.har) and gzip-compressed variants of either. Files are decoded in
// parallel; the store is only ever touched from the calling thread.

use crate::harvester::Harvester;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

const CAPTURE_EXTENSIONS: &[&str] = &["har", "json", "txt", "gz"];

/// One captured response body with its content-type hint
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub body: String,
    pub content_type: String,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed HAR: {0}")]
    Har(#[from] serde_json::Error),
    #[error("base64 body: {0}")]
    Base64(#[from] base64::DecodeError),
}

// The HAR subset we care about: log.entries[].response.content
#[derive(Debug, Deserialize)]
struct Har {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    response: HarResponse,
}

#[derive(Debug, Deserialize)]
struct HarResponse {
    content: HarContent,
}

#[derive(Debug, Deserialize)]
struct HarContent {
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Every capture file under `root`, sorted so ingestion order (and with it
/// the first-write-wins outcome) is deterministic.
pub fn collect_capture_paths(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_capture_extension(p))
        .collect();
    paths.sort();
    paths
}

/// Decode one capture file into its response records.
pub fn read_capture_file(path: &Path) -> Result<Vec<ResponseRecord>, CaptureError> {
    let text = read_text(path)?;
    if is_har(path) {
        har_records(&text)
    } else {
        // A raw body file is one response, assumed JSON
        Ok(vec![ResponseRecord {
            body: text,
            content_type: "application/json".to_string(),
        }])
    }
}

/// Decode `paths` in parallel and feed every record through the adapter,
/// in path order. `progress` fires once per file. Returns (ingested,
/// skipped) file counts; per-file failures are logged, never fatal.
pub fn ingest_paths(
    harvester: &mut Harvester,
    paths: &[PathBuf],
    mut progress: impl FnMut(),
) -> (usize, usize) {
    let loaded: Vec<(&PathBuf, Result<Vec<ResponseRecord>, CaptureError>)> = paths
        .par_iter()
        .map(|path| (path, read_capture_file(path)))
        .collect();

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    for (path, result) in loaded {
        match result {
            Ok(records) => {
                for record in &records {
                    harvester.on_response_body(&record.body, &record.content_type);
                }
                debug!("{}: {} response bodies", path.display(), records.len());
                ingested += 1;
            }
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                skipped += 1;
            }
        }
        progress();
    }
    (ingested, skipped)
}

fn has_capture_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CAPTURE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_har(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    name.ends_with(".har") || name.ends_with(".har.gz")
}

fn read_text(path: &Path) -> Result<String, CaptureError> {
    let mut raw = Vec::new();
    File::open(path)?.read_to_end(&mut raw)?;

    let gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    if gzipped {
        let mut decompressed = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut decompressed)?;
        raw = decompressed;
    }

    Ok(String::from_utf8(raw)?)
}

fn har_records(text: &str) -> Result<Vec<ResponseRecord>, CaptureError> {
    let har: Har = serde_json::from_str(text)?;

    let mut records = Vec::new();
    for entry in har.log.entries {
        let content = entry.response.content;
        let Some(raw) = content.text else {
            continue;
        };
        let body = if content.encoding.as_deref() == Some("base64") {
            String::from_utf8(BASE64.decode(raw.as_bytes())?)?
        } else {
            raw
        };
        records.push(ResponseRecord {
            body,
            content_type: content.mime_type,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarvestConfig;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;

    fn write_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_raw_body_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"legalHoldTemplateId": "T-1"}"#).unwrap();

        let records = read_capture_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_type, "application/json");
        assert!(records[0].body.contains("T-1"));
    }

    #[test]
    fn test_har_file_with_base64_entry() {
        let plain = r#"{"legalHoldTemplateId": "T-1", "templateName": "Plain"}"#;
        let encoded = BASE64.encode(r#"{"legalHoldTemplateId": "T-2", "templateName": "Encoded"}"#);
        let har = serde_json::json!({
            "log": {
                "version": "1.2",
                "entries": [
                    {"response": {"content": {"mimeType": "application/json", "text": plain}}},
                    {"response": {"content": {
                        "mimeType": "application/json",
                        "text": encoded,
                        "encoding": "base64"
                    }}},
                    {"response": {"content": {"mimeType": "text/html", "text": "<html/>"}}},
                    {"response": {"content": {"mimeType": "image/png"}}},
                ]
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.har");
        fs::write(&path, serde_json::to_string(&har).unwrap()).unwrap();

        let records = read_capture_file(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[1].body.contains("Encoded"));

        // End to end: the html entry is dropped by the content-type gate
        let mut harvester = Harvester::new(HarvestConfig::default());
        let (ingested, skipped) = ingest_paths(&mut harvester, &[path], || {});
        assert_eq!((ingested, skipped), (1, 0));
        assert_eq!(harvester.len(), 2);
    }

    #[test]
    fn test_gzipped_raw_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json.gz");
        write_gz(&path, r#"{"legalHoldTemplateId": "T-7", "templateName": "Zipped"}"#);

        let mut harvester = Harvester::new(HarvestConfig::default());
        ingest_paths(&mut harvester, &[path], || {});
        let records = harvester.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Zipped");
    }

    #[test]
    fn test_collect_paths_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.har"), "{}").unwrap();
        fs::write(dir.path().join("notes.md"), "skip me").unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), "{}").unwrap();

        let paths = collect_capture_paths(dir.path());
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.har", "b.json", "c.txt"]);
    }

    #[test]
    fn test_unreadable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        fs::write(&good, r#"{"legalHoldTemplateId": "T-1"}"#).unwrap();
        let bad = dir.path().join("bad.har");
        fs::write(&bad, "definitely not a har").unwrap();

        let mut harvester = Harvester::new(HarvestConfig::default());
        let paths = collect_capture_paths(dir.path());
        let (ingested, skipped) = ingest_paths(&mut harvester, &paths, || {});
        assert_eq!((ingested, skipped), (1, 1));
        assert_eq!(harvester.len(), 1);
    }

    #[test]
    fn test_non_utf8_is_a_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.json");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x01]).unwrap();
        assert!(matches!(
            read_capture_file(&path),
            Err(CaptureError::Utf8(_))
        ));
    }
}
