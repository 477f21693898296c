use serde::{Deserialize, Serialize};

/// The category the instrumentation layer assigns to a loaded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Document,
    StyleSheet,
    Script,
    Image,
    Media,
    Font,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    Other,
}

impl ResourceType {
    /// Only these three kinds of content ever show up in the project tree.
    pub fn is_document_or_script_or_style_sheet(self) -> bool {
        matches!(
            self,
            ResourceType::Document | ResourceType::Script | ResourceType::StyleSheet
        )
    }
}

/// A resource loaded by one of the target's frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub url: String,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Resource {
    pub fn new(url: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            url: url.into(),
            resource_type,
            mime_type: None,
        }
    }

    pub fn document(url: impl Into<String>) -> Self {
        Self::new(url, ResourceType::Document)
    }
}

/// A node of the target's frame tree, as seen at the moment it was queried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub child_frames: Vec<Frame>,
}

impl Frame {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            resources: Vec::new(),
            child_frames: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_child(mut self, child: Frame) -> Self {
        self.child_frames.push(child);
        self
    }
}
