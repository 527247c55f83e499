//! Factory actions handed to the IDE once projects are imported

use async_trait::async_trait;

use crate::model::{ActionProperties, FactoryAction};
use crate::path::to_file_uri;
use crate::Result;

pub const OPEN_FILE_ACTION: &str = "openFile";
pub const RUN_COMMAND_ACTION: &str = "runCommand";

/// A factory action with its arguments resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeAction {
    /// Open a file, given as a `file://` URI
    OpenFile { uri: String },
    /// Run a named workspace command
    RunCommand { name: String },
    /// Anything not understood here, passed through untouched
    Other {
        id: String,
        properties: Option<ActionProperties>,
    },
}

impl IdeAction {
    /// Resolve a factory action against the projects root
    pub fn resolve(action: &FactoryAction, projects_root: &str) -> Self {
        let props = action.properties.as_ref();

        match action.id.as_str() {
            OPEN_FILE_ACTION => {
                if let Some(file) = props.and_then(|p| p.file.as_deref()) {
                    return IdeAction::OpenFile {
                        uri: to_file_uri(file, Some(projects_root)),
                    };
                }
            }
            RUN_COMMAND_ACTION => {
                if let Some(name) = props.and_then(|p| p.name.as_deref()) {
                    return IdeAction::RunCommand {
                        name: name.to_string(),
                    };
                }
            }
            _ => {}
        }

        IdeAction::Other {
            id: action.id.clone(),
            properties: action.properties.clone(),
        }
    }
}

/// The IDE command layer executing factory actions
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, action: IdeAction) -> Result<()>;
}
