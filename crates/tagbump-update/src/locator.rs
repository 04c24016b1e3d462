//! Locators for the lines and entries that pin a base image

use crate::lines::LineBuffer;
use crate::BASE_IMAGE_ARG;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use std::fs;
use tagbump_core::{Error, Result};
use tagbump_registry::ImageTag;
use tracing::debug;

/// Parse a pinned reference found at `line` (0-based) of `path`
fn parse_line_reference(path: &Utf8Path, line: usize, value: &str) -> Result<ImageTag> {
    let tag = ImageTag::parse(value).map_err(|e| match e {
        Error::MalformedTag { reason, .. } => Error::malformed_line(path.as_str(), line + 1, reason),
        other => other,
    })?;
    if tag.digest.is_empty() {
        return Err(Error::malformed_line(path.as_str(), line + 1, "empty digest"));
    }
    Ok(tag)
}

/// The `ARG BASE_IMAGE=` line of a build file
#[derive(Debug, Clone)]
pub struct DockerfileLocation {
    /// Pinned reference on the marker line
    pub tag: ImageTag,
    /// 0-based index of the marker line
    pub index: usize,
    /// Full file content
    pub buffer: LineBuffer,
}

impl DockerfileLocation {
    /// Find the first line starting with `ARG BASE_IMAGE=<repository>`
    pub fn locate(path: &Utf8Path, repository: &str) -> Result<Self> {
        let buffer = LineBuffer::read(path)?;
        let marker = format!("{}{}", BASE_IMAGE_ARG, repository);

        let (index, line) = buffer
            .lines()
            .iter()
            .enumerate()
            .find(|(_, line)| line.starts_with(&marker))
            .ok_or_else(|| Error::marker_not_found(path.as_str(), &marker))?;

        let value = line[BASE_IMAGE_ARG.len()..].trim_end();
        let tag = parse_line_reference(path, index, value)?;
        debug!("Build file {} pins {} at line {}", path, tag, index + 1);

        Ok(Self { tag, index, buffer })
    }
}

/// JSON mapping of logical names to pinned references, in file order
#[derive(Debug, Clone)]
pub struct BaseImagesManifest {
    pub path: Utf8PathBuf,
    pub entries: Vec<(String, ImageTag)>,
}

impl BaseImagesManifest {
    /// Load and parse every value of the mapping
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing_file(path.as_str()));
        }
        let content = fs::read_to_string(path)?;
        let raw: Map<String, Value> = serde_json::from_str(&content)?;

        let entries = raw
            .into_iter()
            .map(|(name, value)| {
                let reference = value.as_str().ok_or_else(|| {
                    Error::malformed_tag(value.to_string(), format!("'{}' is not a string", name))
                })?;
                let tag = ImageTag::parse(reference)?;
                if tag.digest.is_empty() {
                    return Err(Error::malformed_tag(reference, "empty digest"));
                }
                Ok((name, tag))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} base images from {}", entries.len(), path);
        Ok(Self {
            path: path.to_owned(),
            entries,
        })
    }
}

/// One `- <reference>` item of the workflow list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowItem {
    /// 0-based line index
    pub index: usize,
    /// Indentation and `- ` preceding the value
    pub prefix: String,
    /// Quote character wrapping the value, if any
    pub quote: Option<char>,
    pub tag: ImageTag,
}

impl WorkflowItem {
    /// Render the item line for `tag`, keeping indentation and quoting
    pub fn render(&self, tag: &ImageTag) -> String {
        match self.quote {
            Some(q) => format!("{}{}{}{}", self.prefix, q, tag, q),
            None => format!("{}{}", self.prefix, tag),
        }
    }
}

/// The base-image list nested under a workflow matrix key
#[derive(Debug, Clone)]
pub struct WorkflowLocation {
    pub items: Vec<WorkflowItem>,
    pub buffer: LineBuffer,
}

impl WorkflowLocation {
    /// Find the `<key>:` line and collect the list items directly below it
    ///
    /// The list ends at the first line that is not a `- ` item.
    pub fn locate(path: &Utf8Path, key: &str) -> Result<Self> {
        let buffer = LineBuffer::read(path)?;
        let marker = format!("{}:", key);

        let marker_index = buffer
            .lines()
            .iter()
            .position(|line| line.contains(&marker))
            .ok_or_else(|| Error::marker_not_found(path.as_str(), &marker))?;

        let mut items = Vec::new();
        for (index, line) in buffer.lines().iter().enumerate().skip(marker_index + 1) {
            let body = line.trim_start();
            let Some(rest) = body.strip_prefix("- ") else {
                break;
            };

            let indent = line.len() - body.len();
            let value = rest.trim();
            let prefix_len = indent + 2 + (rest.len() - rest.trim_start().len());
            let (quote, unquoted) = strip_quotes(value);

            items.push(WorkflowItem {
                index,
                prefix: line[..prefix_len].to_string(),
                quote,
                tag: parse_line_reference(path, index, unquoted)?,
            });
        }

        if items.is_empty() {
            return Err(Error::malformed_line(
                path.as_str(),
                marker_index + 1,
                format!("no list items follow '{}'", marker),
            ));
        }

        debug!("Workflow {} lists {} base images", path, items.len());
        Ok(Self { items, buffer })
    }
}

fn strip_quotes(value: &str) -> (Option<char>, &str) {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return (Some(q), &value[1..value.len() - 1]);
        }
    }
    (None, value)
}
