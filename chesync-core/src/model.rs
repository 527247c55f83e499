//! Workspace and factory definitions as exchanged with the Che API
//!
//! Fields this crate does not interpret are kept in `extra` maps so that a
//! workspace read, modified and written back loses nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source kind of projects managed by chesync
pub const GIT_SOURCE_TYPE: &str = "git";

/// Name given to a project whose path has no final segment
pub const FALLBACK_PROJECT_NAME: &str = "new-project";

/// Parameter key holding the branch to check out
pub const BRANCH_PARAMETER: &str = "branch";

/// Where a project's content comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSource {
    /// Source kind, `git` for everything chesync creates
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Clone URL
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl ProjectSource {
    /// Git source cloned from `location`, optionally on `branch`
    pub fn git(location: impl Into<String>, branch: Option<&str>) -> Self {
        let mut parameters = BTreeMap::new();
        if let Some(branch) = branch {
            parameters.insert(BRANCH_PARAMETER.to_string(), branch.to_string());
        }

        Self {
            kind: GIT_SOURCE_TYPE.to_string(),
            location: location.into(),
            parameters,
        }
    }

    /// Branch to check out, if one is declared
    pub fn branch(&self) -> Option<&str> {
        self.parameters
            .get(BRANCH_PARAMETER)
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }
}

/// One declared project of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,

    /// Rooted path under the projects root, unique within a workspace
    pub path: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ProjectSource>,

    #[serde(default)]
    pub mixins: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectEntry {
    /// Clone URL of the project, if it has a usable source
    pub fn location(&self) -> Option<&str> {
        self.source
            .as_ref()
            .map(|s| s.location.as_str())
            .filter(|l| !l.is_empty())
    }

    /// Branch declared for the project
    pub fn branch(&self) -> Option<&str> {
        self.source.as_ref().and_then(ProjectSource::branch)
    }
}

/// Declarative part of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A running workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub config: WorkspaceConfig,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional properties of a factory action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_content_url: Option<String>,
}

/// IDE action declared by a factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ActionProperties>,
}

/// Actions bound to one IDE lifecycle moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryActions {
    #[serde(default)]
    pub actions: Vec<FactoryAction>,
}

/// IDE part of a factory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryIde {
    #[serde(default)]
    pub on_projects_loaded: Option<FactoryActions>,
    #[serde(default)]
    pub on_app_loaded: Option<FactoryActions>,
    #[serde(default)]
    pub on_app_closed: Option<FactoryActions>,
}

/// Workspace template of a factory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactoryWorkspace {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shareable workspace definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub workspace: Option<FactoryWorkspace>,

    #[serde(default)]
    pub ide: Option<FactoryIde>,
}

impl Factory {
    /// Projects the factory declares
    pub fn projects(&self) -> &[ProjectEntry] {
        self.workspace
            .as_ref()
            .map(|w| w.projects.as_slice())
            .unwrap_or_default()
    }

    /// Actions to run once the projects are imported
    pub fn on_projects_loaded_actions(&self) -> &[FactoryAction] {
        Self::actions(self.ide.as_ref().and_then(|ide| ide.on_projects_loaded.as_ref()))
    }

    pub fn on_app_loaded_actions(&self) -> &[FactoryAction] {
        Self::actions(self.ide.as_ref().and_then(|ide| ide.on_app_loaded.as_ref()))
    }

    pub fn on_app_closed_actions(&self) -> &[FactoryAction] {
        Self::actions(self.ide.as_ref().and_then(|ide| ide.on_app_closed.as_ref()))
    }

    fn actions(group: Option<&FactoryActions>) -> &[FactoryAction] {
        group.map(|g| g.actions.as_slice()).unwrap_or_default()
    }
}
