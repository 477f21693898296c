use serde::{Deserialize, Serialize};

use crate::url::ParsedUrl;

/// Where a stylesheet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleSheetOrigin {
    Regular,
    Inspector,
    UserAgent,
    Injected,
}

impl Default for StyleSheetOrigin {
    fn default() -> Self {
        StyleSheetOrigin::Regular
    }
}

/// A stylesheet reported by the target's CSS feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSheetHeader {
    pub style_sheet_id: String,
    pub source_url: String,
    pub origin: StyleSheetOrigin,
    pub is_inline: bool,
    pub has_source_url: bool,

    /// URL of the frame that owns the sheet. Inspector-authored sheets are
    /// named after it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_url: Option<String>,
}

impl StyleSheetHeader {
    pub fn new(style_sheet_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            style_sheet_id: style_sheet_id.into(),
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn inline(self) -> Self {
        Self {
            is_inline: true,
            ..self
        }
    }

    pub fn with_origin(self, origin: StyleSheetOrigin) -> Self {
        Self { origin, ..self }
    }

    pub fn with_source_url_annotation(self) -> Self {
        Self {
            has_source_url: true,
            ..self
        }
    }

    pub fn in_frame(self, frame_url: impl Into<String>) -> Self {
        Self {
            frame_url: Some(frame_url.into()),
            ..self
        }
    }

    pub fn is_via_inspector(&self) -> bool {
        self.origin == StyleSheetOrigin::Inspector
    }

    /// The URL the sheet is indexed under.
    ///
    /// Sheets created through the inspector have no URL of their own and are
    /// given a synthetic `inspector://` one next to their frame's document.
    pub fn resource_url(&self) -> String {
        if !self.is_via_inspector() {
            return self.source_url.clone();
        }

        let frame = ParsedUrl::parse(self.frame_url.as_deref().unwrap_or_default());

        let mut url = format!("inspector://{}{}", frame.host, frame.folder_path);
        if !frame.folder_path.ends_with('/') {
            url.push('/');
        }
        url.push_str("inspector-stylesheet");

        url
    }
}
