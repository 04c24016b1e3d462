//! Rewriters for located base image references
//!
//! Every writer replaces only the located line(s) or mapping values and
//! overwrites the file in a single write. Nothing is written when the
//! rendered content equals what is already on disk.

use crate::locator::{DockerfileLocation, WorkflowLocation};
use crate::BASE_IMAGE_ARG;
use camino::Utf8Path;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use tagbump_core::Result;
use tagbump_registry::ImageTag;
use tracing::debug;

/// Point the `ARG BASE_IMAGE=` line at `tag`; returns whether the file was written
pub fn write_dockerfile(location: &mut DockerfileLocation, tag: &ImageTag) -> Result<bool> {
    let replacement = format!("{}{}", BASE_IMAGE_ARG, tag);
    if !location.buffer.set(location.index, replacement) {
        return Ok(false);
    }
    location.buffer.write()?;
    location.tag = tag.clone();
    debug!("Rewrote line {} of {}", location.index + 1, location.buffer.path());
    Ok(true)
}

/// Rewrite every workflow list item; `tags` is parallel to `location.items`
pub fn write_workflow(location: &mut WorkflowLocation, tags: &[ImageTag]) -> Result<bool> {
    let mut changed = false;
    for (item, tag) in location.items.iter_mut().zip(tags) {
        if location.buffer.set(item.index, item.render(tag)) {
            item.tag = tag.clone();
            changed = true;
        }
    }
    if changed {
        location.buffer.write()?;
        debug!("Rewrote workflow list in {}", location.buffer.path());
    }
    Ok(changed)
}

/// Render the base-images mapping: 4-space indentation, one trailing newline
pub fn render_base_images(entries: &[(String, ImageTag)]) -> Result<String> {
    let map: Map<String, Value> = entries
        .iter()
        .map(|(name, tag)| (name.clone(), Value::String(tag.format())))
        .collect();

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    map.serialize(&mut serializer)?;
    out.push(b'\n');

    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write the base-images mapping; returns whether the file was written
pub fn write_base_images(path: &Utf8Path, entries: &[(String, ImageTag)]) -> Result<bool> {
    let rendered = render_base_images(entries)?;
    if fs::read_to_string(path).ok().as_deref() == Some(rendered.as_str()) {
        return Ok(false);
    }
    fs::write(path, rendered)?;
    debug!("Rewrote {}", path);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn tag(s: &str) -> ImageTag {
        ImageTag::parse(s).unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_dockerfile_only_marker_line_changes() {
        let dir = TempDir::new().unwrap();
        let original = "\
# syntax=docker/dockerfile:1
ARG BASE_IMAGE=repo:git-abc-jammy@Dsha

FROM ${BASE_IMAGE}
USER root";
        let path = write(&dir, "Dockerfile", original);

        let mut location = DockerfileLocation::locate(&path, "repo").unwrap();
        let written = write_dockerfile(&mut location, &tag("repo:git-def-jammy@Dnew")).unwrap();
        assert!(written);

        let updated = fs::read_to_string(&path).unwrap();
        assert_eq!(
            updated,
            "\
# syntax=docker/dockerfile:1
ARG BASE_IMAGE=repo:git-def-jammy@Dnew

FROM ${BASE_IMAGE}
USER root
"
        );
        assert!(updated.ends_with("root\n"));
        assert!(!updated.ends_with("\n\n"));
    }

    #[test]
    fn test_dockerfile_unchanged_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Dockerfile", "ARG BASE_IMAGE=repo:git-abc-jammy@D");

        let mut location = DockerfileLocation::locate(&path, "repo").unwrap();
        let current = location.tag.clone();
        assert!(!write_dockerfile(&mut location, &current).unwrap());
        // No trailing newline was added because nothing was written
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ARG BASE_IMAGE=repo:git-abc-jammy@D"
        );
    }

    #[test]
    fn test_workflow_rewrite_keeps_indent_and_quotes() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "build.yml",
            "matrix:\n  base-image:\n    - 'repo:git-a-jammy@D1'\n    - repo:git-a-alpine@D2\n  os: [linux]\n",
        );

        let mut location = WorkflowLocation::locate(&path, "base-image").unwrap();
        let tags = vec![tag("repo:git-b-jammy@N1"), tag("repo:git-a-alpine@D2")];
        assert!(write_workflow(&mut location, &tags).unwrap());

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "matrix:\n  base-image:\n    - 'repo:git-b-jammy@N1'\n    - repo:git-a-alpine@D2\n  os: [linux]\n"
        );
        assert_eq!(location.items[0].tag.git_tag, "b");
    }

    #[test]
    fn test_render_base_images_format() {
        let entries = vec![
            ("zeta".to_string(), tag("repo:git-a-jammy@D1")),
            ("alpha".to_string(), tag("repo:bookworm@D2")),
        ];
        assert_eq!(
            render_base_images(&entries).unwrap(),
            "{\n    \"zeta\": \"repo:git-a-jammy@D1\",\n    \"alpha\": \"repo:bookworm@D2\"\n}\n"
        );
    }

    #[test]
    fn test_write_base_images_skips_identical_content() {
        let dir = TempDir::new().unwrap();
        let entries = vec![("ubuntu".to_string(), tag("repo:git-a-jammy@D1"))];
        let path = write(&dir, "base-images.json", &render_base_images(&entries).unwrap());

        assert!(!write_base_images(&path, &entries).unwrap());

        let updated = vec![("ubuntu".to_string(), tag("repo:git-b-jammy@D2"))];
        assert!(write_base_images(&path, &updated).unwrap());
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("repo:git-b-jammy@D2"));
    }
}
