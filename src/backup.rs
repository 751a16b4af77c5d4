use anyhow::{anyhow, Context};
use rusqlite::Connection;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/drdp.sqlite3";
pub const BUNDLE_FORMAT_V1: &str = "drdp-workspace-v1";
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub db_sha256: String,
    pub db_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct RestoreSummary {
    pub bundle_format_detected: String,
    pub db_bytes: u64,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Snapshot the live database and write it as a zip bundle.
pub fn export_bundle(conn: &Connection, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    // VACUUM INTO gives a consistent copy without closing the connection.
    let snapshot = sibling_path(out_path, ".snapshot");
    if snapshot.exists() {
        std::fs::remove_file(&snapshot).with_context(|| {
            format!("failed to remove stale snapshot {}", snapshot.to_string_lossy())
        })?;
    }
    conn.execute("VACUUM INTO ?1", [snapshot.to_string_lossy().as_ref()])
        .context("failed to snapshot database")?;
    let db_bytes = std::fs::read(&snapshot);
    let _ = std::fs::remove_file(&snapshot);
    let db_bytes = db_bytes.context("failed to read database snapshot")?;
    let db_sha256 = sha256_hex(&db_bytes);

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "dbSha256": db_sha256,
        "dbBytes": db_bytes.len(),
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DB_ENTRY, opts)
        .context("failed to start database entry")?;
    zip.write_all(&db_bytes)
        .context("failed to write database entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        db_sha256,
        db_bytes: db_bytes.len() as u64,
    })
}

/// Replace `db_path` with the database carried by a bundle. A bare SQLite
/// file is accepted as well. Must not run while a connection is open.
pub fn restore_bundle(in_path: &Path, db_path: &Path) -> anyhow::Result<RestoreSummary> {
    let (format, bytes) = match sniff(in_path)? {
        Sniffed::Zip => (BUNDLE_FORMAT_V1.to_string(), read_bundle_db(in_path)?),
        Sniffed::Sqlite => {
            let bytes = std::fs::read(in_path)
                .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
            ("sqlite3".to_string(), bytes)
        }
        Sniffed::Unknown => {
            return Err(anyhow!(
                "not a backup bundle or SQLite database: {}",
                in_path.to_string_lossy()
            ))
        }
    };

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let tmp_dst = sibling_path(db_path, ".restoring");
    {
        let mut out = File::create(&tmp_dst).with_context(|| {
            format!("failed to create temp database {}", tmp_dst.to_string_lossy())
        })?;
        out.write_all(&bytes)
            .context("failed to write restored database")?;
        out.flush().context("failed to flush restored database")?;
    }
    std::fs::rename(&tmp_dst, db_path).with_context(|| {
        format!(
            "failed to move restored database to {}",
            db_path.to_string_lossy()
        )
    })?;

    Ok(RestoreSummary {
        bundle_format_detected: format,
        db_bytes: bytes.len() as u64,
    })
}

fn read_bundle_db(in_path: &Path) -> anyhow::Result<Vec<u8>> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let expected = manifest
        .get("dbSha256")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("manifest.json missing dbSha256"))?
        .to_string();

    let mut bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .context("bundle missing db/drdp.sqlite3")?
        .read_to_end(&mut bytes)
        .context("failed to extract database entry")?;
    let actual = sha256_hex(&bytes);
    if actual != expected {
        return Err(anyhow!(
            "database checksum mismatch (expected {}, got {})",
            expected,
            actual
        ));
    }
    Ok(bytes)
}

enum Sniffed {
    Zip,
    Sqlite,
    Unknown,
}

fn sniff(path: &Path) -> anyhow::Result<Sniffed> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 16];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read >= 4 && sig[..4] == [0x50, 0x4B, 0x03, 0x04] {
        return Ok(Sniffed::Zip);
    }
    if read == 16 && &sig == SQLITE_HEADER {
        return Ok(Sniffed::Sqlite);
    }
    Ok(Sniffed::Unknown)
}
