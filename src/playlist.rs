//! Playlist index regeneration.
//!
//! Every directory below the library root gets a `<name>/<name>.m3u` file
//! listing the bare file names of the audio files in its subtree. Files are
//! rewritten from scratch on each pass.

use crate::error::Result;
use crate::formats::AudioFormat;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

pub const INDEX_EXTENSION: &str = "m3u";

/// Writes playlist index files for a directory tree.
#[derive(Debug, Clone)]
pub struct Regenerator {
    extensions: Vec<String>,
}

impl Default for Regenerator {
    /// Matches the extensions of every supported [`AudioFormat`].
    fn default() -> Self {
        let mut extensions: Vec<String> = AudioFormat::ALL
            .iter()
            .map(|f| f.extension().to_string())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }
}

impl Regenerator {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True if `name` ends in one of the audio extensions (case-insensitive).
    pub fn is_audio(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }

    /// Regenerates the index file of every directory below `root`.
    ///
    /// Returns the number of index files written. A missing root, or one that
    /// is not a directory, is logged and yields `Ok(0)` without touching the
    /// file system.
    ///
    /// # Errors
    /// Returns error if the tree cannot be read or an index file cannot be
    /// written.
    #[instrument(skip(self))]
    pub fn regenerate(&self, root: &Path) -> Result<usize> {
        if !root.exists() {
            warn!("Root directory {} does not exist", root.display());
            return Ok(0);
        }
        if !root.is_dir() {
            warn!("Root path {} is not a directory", root.display());
            return Ok(0);
        }

        let directories: Vec<PathBuf> = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                // A symlinked directory gets its own index but is not descended into.
                Ok(entry) if entry.file_type().is_dir() || is_linked_dir(&entry) => {
                    Some(Ok(entry.into_path()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<std::result::Result<_, _>>()
            .map_err(std::io::Error::from)?;

        for directory in &directories {
            let path = self.write_index(directory)?;
            info!("Playlist '{}' was created", path.display());
        }

        Ok(directories.len())
    }

    /// Bare names of the audio files anywhere below `directory`, in
    /// traversal order.
    pub fn collect_tracks(&self, directory: &Path) -> Result<Vec<String>> {
        let mut tracks = Vec::new();
        for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.is_audio(&name) {
                tracks.push(name.into_owned());
            }
        }
        Ok(tracks)
    }

    /// Overwrites `<directory>/<name>.m3u` and returns its path.
    pub fn write_index(&self, directory: &Path) -> Result<PathBuf> {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = directory.join(format!("{name}.{INDEX_EXTENSION}"));

        let tracks = self.collect_tracks(directory)?;
        debug!("{} tracks for {}", tracks.len(), path.display());

        let mut writer = BufWriter::new(File::create(&path)?);
        for track in &tracks {
            writeln!(writer, "{track}")?;
        }
        writer.flush()?;

        Ok(path)
    }
}

fn is_linked_dir(entry: &DirEntry) -> bool {
    entry.path_is_symlink() && entry.path().is_dir()
}

/// Regenerates with the default audio extensions.
pub fn regenerate(root: &Path) -> Result<usize> {
    Regenerator::default().regenerate(root)
}
