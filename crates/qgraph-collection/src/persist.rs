//! On-disk format for graph collections
//!
//! A collection file is a bincode header (magic + format version) followed by
//! a bincode body holding the save timestamp and the ordered graphs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use qgraph_core::QGraph;
use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};

/// Required extension for collection files.
pub const COLLECTION_EXTENSION: &str = "qgl";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: [u8; 8] = *b"QGRAPHL\0";

#[derive(Debug, Serialize, Deserialize)]
struct FileHeader {
    magic: [u8; 8],
    version: u32,
}

#[derive(Serialize)]
struct BodyRef<'a> {
    saved_at: String,
    graphs: Vec<&'a QGraph>,
}

#[derive(Deserialize)]
struct Body {
    saved_at: String,
    graphs: Vec<QGraph>,
}

/// Reject any path that does not end in `.qgl`.
pub fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(COLLECTION_EXTENSION) => Ok(()),
        _ => Err(CollectionError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("expected a .{COLLECTION_EXTENSION} file"),
        }),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    path.with_extension(format!("{COLLECTION_EXTENSION}.tmp"))
}

/// Write `graphs` to `path`, replacing the file only once the new content is
/// fully written.
pub fn write_collection<'a, I>(path: &Path, graphs: I) -> Result<()>
where
    I: IntoIterator<Item = &'a QGraph>,
{
    check_extension(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    let body = BodyRef {
        saved_at: chrono::Utc::now().to_rfc3339(),
        graphs: graphs.into_iter().collect(),
    };
    let written = write_staged(&staging, &body)
        .and_then(|()| std::fs::rename(&staging, path).map_err(CollectionError::from));
    if written.is_err() {
        // Never leave a half-written staging file next to the target.
        let _ = std::fs::remove_file(&staging);
    }
    written?;

    tracing::debug!("Saved {} graphs to {}", body.graphs.len(), path.display());
    Ok(())
}

fn write_staged(staging: &Path, body: &BodyRef<'_>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(staging)?);
    bincode::serialize_into(
        &mut writer,
        &FileHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
        },
    )?;
    bincode::serialize_into(&mut writer, body)?;
    writer.flush()?;
    Ok(())
}

/// Read the ordered graphs stored at `path`.
pub fn read_collection(path: &Path) -> Result<Vec<QGraph>> {
    check_extension(path)?;
    let mut reader = BufReader::new(File::open(path)?);

    let header: FileHeader =
        bincode::deserialize_from(&mut reader).map_err(|e| CollectionError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("unreadable header: {e}"),
        })?;
    if header.magic != MAGIC {
        return Err(CollectionError::TypeMismatch {
            expected: "a graph collection file",
            found: format!("payload tagged {:?}", String::from_utf8_lossy(&header.magic)),
        });
    }
    if header.version != FORMAT_VERSION {
        return Err(CollectionError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!(
                "format version {} is not supported (expected {FORMAT_VERSION})",
                header.version
            ),
        });
    }

    let body: Body = bincode::deserialize_from(&mut reader)?;
    tracing::debug!(
        "Loaded {} graphs saved at {} from {}",
        body.graphs.len(),
        body.saved_at,
        path.display()
    );
    Ok(body.graphs)
}
