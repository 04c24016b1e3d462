//! Line-oriented file buffer

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tagbump_core::{Error, Result};

/// Lines of a text file, rewritten as a whole with a single trailing newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    path: Utf8PathBuf,
    lines: Vec<String>,
}

impl LineBuffer {
    /// Read `path` into lines. A missing file is reported as [`Error::MissingFile`].
    pub fn read(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing_file(path.as_str()));
        }
        let content = fs::read_to_string(path)?;
        Ok(Self::from_content(path, &content))
    }

    /// Build a buffer from already-loaded content
    pub fn from_content(path: impl Into<Utf8PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace the line at `index`; returns whether the line changed
    pub fn set(&mut self, index: usize, line: impl Into<String>) -> bool {
        let line = line.into();
        match self.lines.get_mut(index) {
            Some(existing) if *existing != line => {
                *existing = line;
                true
            }
            _ => false,
        }
    }

    /// Serialized content: lines joined by `\n` plus one trailing newline
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Overwrite the file in a single write
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, self.render())?;
        Ok(())
    }
}
