use serde::{Deserialize, Serialize};

/// A script reported by the target's debugger feed, either parsed
/// successfully or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Script {
    pub script_id: String,

    /// The URL the script was loaded from, or the value of its `sourceURL`
    /// annotation. Empty for anonymous scripts.
    pub source_url: String,

    /// The script was produced by patching another script's source live.
    pub is_live_edit: bool,

    /// The script is embedded inside a document rather than loaded on its own.
    pub is_inline_script: bool,

    /// The script carries an explicit `//# sourceURL=` annotation.
    pub has_source_url: bool,

    /// The script was injected by an extension or embedder, not the page.
    pub is_content_script: bool,
}

impl Script {
    pub fn new(script_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn inline(self) -> Self {
        Self {
            is_inline_script: true,
            ..self
        }
    }

    pub fn live_edit(self) -> Self {
        Self {
            is_live_edit: true,
            ..self
        }
    }

    pub fn with_source_url_annotation(self) -> Self {
        Self {
            has_source_url: true,
            ..self
        }
    }

    pub fn content_script(self) -> Self {
        Self {
            is_content_script: true,
            ..self
        }
    }
}
