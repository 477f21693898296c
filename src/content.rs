use serde::Serialize;

use crate::instrumentation::{Resource, ResourceType, Script, StyleSheetHeader};

/// The instrumentation object an indexed entry's content comes from.
///
/// The workspace keeps this alongside each entry so that whoever displays
/// the entry can ask the right model for its body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentSource {
    Resource(Resource),
    Script(Script),
    StyleSheet(StyleSheetHeader),
}

impl ContentSource {
    /// Scripts are always scripts and sheets always sheets; resources carry
    /// whatever category the network layer gave them.
    pub fn content_type(&self) -> ResourceType {
        match self {
            ContentSource::Resource(resource) => resource.resource_type,
            ContentSource::Script(_) => ResourceType::Script,
            ContentSource::StyleSheet(_) => ResourceType::StyleSheet,
        }
    }
}

impl From<Resource> for ContentSource {
    fn from(resource: Resource) -> Self {
        ContentSource::Resource(resource)
    }
}

impl From<Script> for ContentSource {
    fn from(script: Script) -> Self {
        ContentSource::Script(script)
    }
}

impl From<StyleSheetHeader> for ContentSource {
    fn from(header: StyleSheetHeader) -> Self {
        ContentSource::StyleSheet(header)
    }
}
