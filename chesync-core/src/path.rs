//! Conversions between workspace project paths, local paths and `file://` URIs
//!
//! A workspace project path is always rooted (`/name` or `/group/name`) and is
//! relative to the projects root on disk.

use std::path::{Component, Path, PathBuf};

use crate::config::DEFAULT_PROJECTS_ROOT;

const FILE_SCHEME: &str = "file://";

/// Convert a file path into a `file://` URI under `root`
///
/// Paths that already carry the `file://` scheme are returned unchanged. Other
/// paths, relative or absolute, are appended to `root` (default `/projects`),
/// which itself gets the scheme if it lacks one.
pub fn to_file_uri(path: &str, root: Option<&str>) -> String {
    if path.starts_with(FILE_SCHEME) {
        return path.to_string();
    }

    let root = root.unwrap_or(DEFAULT_PROJECTS_ROOT);
    let root_uri = if root.starts_with(FILE_SCHEME) {
        root.to_string()
    } else {
        format!("{}/{}", FILE_SCHEME, root.trim_start_matches('/'))
    };

    let root_uri = root_uri.strip_suffix('/').unwrap_or(&root_uri);
    let path = path.strip_prefix('/').unwrap_or(path);

    format!("{}/{}", root_uri, path)
}

/// Convert an absolute local path into a workspace project path
///
/// The `root` prefix and trailing slashes are removed, and the result always
/// starts with `/`. A path outside of `root` keeps its full form. The root
/// itself maps to `/`, which is not a valid project path.
pub fn to_project_path(absolute_path: &str, root: &str) -> String {
    let root = root.trim_end_matches('/');

    let relative = match absolute_path.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => absolute_path,
    };

    format!("/{}", relative.trim_matches('/'))
}

/// Local directory of a workspace project: `root` + `project_path`
///
/// Returns `None` for paths that could leave `root`, i.e. any containing a
/// `..` segment.
pub fn project_local_path(root: &Path, project_path: &str) -> Option<PathBuf> {
    let relative = Path::new(project_path.trim_start_matches('/'));
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    contained.then(|| root.join(relative))
}
