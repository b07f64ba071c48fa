#![allow(async_fn_in_trait)]
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::{debug, error, info};
use tokio::{
    fs::{self, DirBuilder, File},
    io::AsyncWriteExt,
};

use crate::error::{Error, Result};

/// Destination of the finished export. Nothing is written before
/// `write_all_and_close`, so an aborted run leaves no partial artifact.
/// `FileSink` stages the content next to the target and renames it into
/// place, so a failed write leaves any previous export untouched.
pub trait Sink: Send {
    async fn open(&mut self) -> Result<()>;
    async fn write_all_and_close(self, content: Bytes) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    opened: bool,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            opened: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the target that receives the content before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".part");
        self.path.with_file_name(name)
    }

    async fn write_staged(staging: &Path, content: &[u8]) -> Result<()> {
        let mut file = File::create(staging).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}

impl Sink for FileSink {
    async fn open(&mut self) -> Result<()> {
        if self.path.is_dir() {
            error!("Export path {} is a directory", self.path.display());
            return Err(std::io::Error::new(
                ErrorKind::AlreadyExists,
                "export path is an existing directory",
            )
            .into());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            debug!("Creating export directory at {parent:?}");
            DirBuilder::new().recursive(true).create(parent).await?;
        }
        self.opened = true;
        Ok(())
    }

    async fn write_all_and_close(self, content: Bytes) -> Result<()> {
        if !self.opened {
            return Err(Error::Other(format!(
                "sink {:?} written before open",
                self.path
            )));
        }
        let staging = self.staging_path();
        debug!("Writing {} bytes to {:?}", content.len(), staging);
        if let Err(e) = Self::write_staged(&staging, &content).await {
            error!("Failed to write export: {e}");
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        fs::rename(&staging, &self.path).await?;
        info!("Export written to {}", self.path.display());
        Ok(())
    }
}
