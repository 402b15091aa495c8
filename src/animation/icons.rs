//! Icon Sequence
//!
//! Frames are read once at startup from the icon directory and never change.

use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::Path;

/// One animation frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub data: Vec<u8>,
}

/// Ordered, non-empty list of frames
#[derive(Debug)]
pub struct IconSequence {
    frames: Vec<Frame>,
}

impl IconSequence {
    /// Load every regular file in `dir` whose extension is `extension`,
    /// ordered by file name. No matching file is an error.
    pub fn load(dir: &Path, extension: &str) -> Result<Self> {
        info!("Reading icon directory {}", dir.display());

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Cannot read icon directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Cannot list {}", dir.display()))?;
            let path = entry.path();
            let matches = path.extension().is_some_and(|ext| ext == extension);
            if matches && entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let data = fs::read(&path)
                .with_context(|| format!("Failed to load icon {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Found icon: {}", name);
            frames.push(Frame { name, data });
        }

        Self::from_frames(frames)
            .with_context(|| format!("No .{} icons in {}", extension, dir.display()))
    }

    pub fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            bail!("Icon sequence is empty");
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Frame shown at startup
    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    /// Frame at `index`, wrapping around the sequence
    pub fn get(&self, index: usize) -> &Frame {
        &self.frames[index % self.frames.len()]
    }
}
