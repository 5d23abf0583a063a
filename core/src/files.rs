//! Storage side of the serving path.
//!
//! Files live at `root/<owner>/<name>`. Writes and reads refresh the
//! modification time, which is what the retention sweeper ages files by.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::{
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tokio::fs;

/// Create the storage root if it does not exist yet.
pub async fn ensure_data_dir(root: &Path) -> Result<()> {
    fs::create_dir_all(root)
        .await
        .with_context(|| format!("creating data dir {}", root.display()))
}

fn component(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        anyhow::bail!("invalid path component {name:?}");
    }
    Ok(name)
}

/// Determine the on-disk path of an owner's file.
pub fn file_path(root: &Path, owner: &str, name: &str) -> Result<PathBuf> {
    Ok(root.join(component(owner)?).join(component(name)?))
}

/// Write a file into the owner's directory, creating the directory on demand.
pub async fn save_file(root: &Path, owner: &str, name: &str, data: Bytes) -> Result<PathBuf> {
    let path = file_path(root, owner, name)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    fs::write(&path, data)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Set a file's modification time to now.
pub async fn touch(path: &Path) -> Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let file = std::fs::File::options().write(true).open(&path)?;
        file.set_modified(SystemTime::now())
    })
    .await??;
    Ok(())
}

/// Open an owner's file for reading, marking it as freshly accessed.
pub async fn open_file(root: &Path, owner: &str, name: &str) -> Result<fs::File> {
    let path = file_path(root, owner, name)?;
    touch(&path).await?;
    let file = fs::File::open(&path).await?;
    Ok(file)
}

/// Delete one file. Returns false when it was already gone.
pub async fn delete_file(root: &Path, owner: &str, name: &str) -> Result<bool> {
    let path = file_path(root, owner, name)?;
    match fs::remove_file(&path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("deleting {}", path.display())),
    }
}

/// Delete an owner's whole collection. Returns false when it was already gone.
pub async fn delete_owner(root: &Path, owner: &str) -> Result<bool> {
    let dir = root.join(component(owner)?);
    match fs::remove_dir_all(&dir).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("deleting {}", dir.display())),
    }
}
