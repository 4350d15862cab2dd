use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::file_safe;
use crate::core::error::Result;

/// Synthesized alarm clips, one mp3 per unique name.
#[derive(Debug, Clone)]
pub struct AssetCache {
    dir: PathBuf,
}

impl AssetCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(name: &str) -> String {
        format!("{}.mp3", file_safe(name))
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(Self::file_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.path_for(name))?)
    }

    /// Write a clip. A partially written clip is never visible under its
    /// final name.
    pub fn store(&self, name: &str, audio: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let tmp_path = path.with_extension("mp3.tmp");
        fs::write(&tmp_path, audio)?;
        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }
}
