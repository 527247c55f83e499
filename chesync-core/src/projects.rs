//! In-place edits of a workspace project list
//!
//! Projects are identified by their path. The list is not assumed to be free
//! of duplicates, so every entry with a matching path is affected.

use crate::model::{
    ProjectEntry, ProjectSource, BRANCH_PARAMETER, FALLBACK_PROJECT_NAME, GIT_SOURCE_TYPE,
};

/// Point the project at `path` to `location` on `branch`, creating it if needed
pub fn upsert_git_project<'a>(
    projects: &'a mut Vec<ProjectEntry>,
    path: &str,
    location: &str,
    branch: &str,
) -> &'a mut Vec<ProjectEntry> {
    let mut found = false;

    for project in projects.iter_mut().filter(|p| p.path == path) {
        found = true;
        let source = project.source.get_or_insert_with(|| ProjectSource {
            kind: GIT_SOURCE_TYPE.to_string(),
            ..Default::default()
        });
        source.location = location.to_string();
        source
            .parameters
            .insert(BRANCH_PARAMETER.to_string(), branch.to_string());
    }

    if !found {
        projects.push(ProjectEntry {
            name: project_name(path).to_string(),
            path: path.to_string(),
            source: Some(ProjectSource::git(location, Some(branch))),
            ..Default::default()
        });
    }

    projects
}

/// Remove every project at `path`
pub fn delete_git_project<'a>(
    projects: &'a mut Vec<ProjectEntry>,
    path: &str,
) -> &'a mut Vec<ProjectEntry> {
    projects.retain(|p| p.path != path);
    projects
}

/// Last segment of a project path
fn project_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => FALLBACK_PROJECT_NAME,
    }
}
