use std::{
    collections::HashSet,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_dir},
    io::AsyncWriteExt,
};

use crate::error::PosseErr;

pub async fn get_files_by_ext_deep(path: &Path, ext: &str) -> Result<Vec<PathBuf>, PosseErr> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    dirs.push(path.to_path_buf());
    while let Some(dir) = dirs.pop() {
        let mut entries = read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                dirs.push(path);
            } else if Some(ext) == path.extension().and_then(|e| e.to_str()) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Slugs (file stems) of every markdown file under `path`. A missing directory has no slugs.
pub async fn collect_slugs(path: &Path) -> Result<HashSet<String>, PosseErr> {
    let files = match get_files_by_ext_deep(path, "md").await {
        Ok(files) => files,
        Err(PosseErr::Io(e)) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e),
    };
    Ok(files
        .iter()
        .filter_map(|f| f.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect())
}

/// Writes `content` to `path` through a temporary file in the same directory, so
/// readers observe either the old or the new file and never a partial one.
pub async fn write_file(path: &Path, content: &[u8]) -> Result<(), PosseErr> {
    let prefix = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    create_dir_all(&prefix).await?;
    let path = path.to_path_buf();
    let content = content.to_vec();
    tokio::task::spawn_blocking(move || -> Result<(), PosseErr> {
        let mut tmp = NamedTempFile::new_in(&prefix)?;
        tmp.write_all(&content)?;
        // The temp file is created private, the replaced file keeps its own mode.
        match std::fs::metadata(&path) {
            Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await?
}

/// Creates a new file at `path`, failing if one already exists.
pub async fn create_file(path: &Path, content: &[u8]) -> Result<(), PosseErr> {
    if let Some(prefix) = path.parent() {
        create_dir_all(prefix).await?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}
