//! Decides which resources, scripts and stylesheets get indexed.
//!
//! Rules run in a fixed order and the first one that matches decides. Nothing
//! here is an error: a rejected item is simply not part of the project tree.

use std::fmt;

use crate::{
    instrumentation::{Resource, ResourceType, Script, StyleSheetHeader},
    url::ParsedUrl,
    workspace::Workspace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Index the item with this content type.
    Accept(ResourceType),
    Reject(Rejection),
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accept(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyUrl,
    AlreadyMapped,
    NotADocument(ResourceType),
    LiveEdit,
    InlineWithoutSourceUrl,
    SyntheticContentScriptUrl,
    UnindexedInlineStyleSheet,
    UnsupportedContentType(ResourceType),
}

impl fmt::Display for Rejection {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::EmptyUrl => write!(formatter, "it has no URL"),
            Rejection::AlreadyMapped => write!(formatter, "its URL is already mapped"),
            Rejection::NotADocument(resource_type) => {
                write!(formatter, "only documents are indexed, not {:?}", resource_type)
            }
            Rejection::LiveEdit => write!(formatter, "it came from a live edit"),
            Rejection::InlineWithoutSourceUrl => {
                write!(formatter, "it is inline without a sourceURL")
            }
            Rejection::SyntheticContentScriptUrl => {
                write!(formatter, "it is a content script with a synthetic URL")
            }
            Rejection::UnindexedInlineStyleSheet => {
                write!(formatter, "it is an inline sheet not created by the inspector")
            }
            Rejection::UnsupportedContentType(resource_type) => {
                write!(formatter, "{:?} content is not indexed", resource_type)
            }
        }
    }
}

pub fn classify_resource(resource: &Resource, workspace: &dyn Workspace) -> Verdict {
    if let Err(rejection) = check_unmapped(&resource.url, workspace) {
        return Verdict::Reject(rejection);
    }

    if resource.resource_type != ResourceType::Document {
        return Verdict::Reject(Rejection::NotADocument(resource.resource_type));
    }

    check_content_type(resource.resource_type)
}

pub fn classify_script(script: &Script, workspace: &dyn Workspace) -> Verdict {
    if let Err(rejection) = check_unmapped(&script.source_url, workspace) {
        return Verdict::Reject(rejection);
    }

    if script.is_live_edit {
        return Verdict::Reject(Rejection::LiveEdit);
    }

    if script.is_inline_script && !script.has_source_url {
        return Verdict::Reject(Rejection::InlineWithoutSourceUrl);
    }

    // Embedders inject content scripts under made-up names; only keep the ones
    // that look like real URLs.
    if script.is_content_script
        && !script.has_source_url
        && !ParsedUrl::parse(&script.source_url).is_valid
    {
        return Verdict::Reject(Rejection::SyntheticContentScriptUrl);
    }

    check_content_type(ResourceType::Script)
}

pub fn classify_style_sheet(header: &StyleSheetHeader, workspace: &dyn Workspace) -> Verdict {
    if let Err(rejection) = check_unmapped(&header.resource_url(), workspace) {
        return Verdict::Reject(rejection);
    }

    if !is_tracked_style_sheet(header) {
        return Verdict::Reject(Rejection::UnindexedInlineStyleSheet);
    }

    check_content_type(ResourceType::StyleSheet)
}

/// Inline sheets are only indexed if they have a `sourceURL` annotation or
/// were created through the inspector. Both addition and removal go through
/// this check.
pub fn is_tracked_style_sheet(header: &StyleSheetHeader) -> bool {
    !(header.is_inline && !header.has_source_url && !header.is_via_inspector())
}

/// The de-duplication guard every indexed item passes first.
pub fn check_unmapped(url: &str, workspace: &dyn Workspace) -> Result<(), Rejection> {
    if url.is_empty() {
        return Err(Rejection::EmptyUrl);
    }

    if workspace.has_entry_for_url(url) {
        return Err(Rejection::AlreadyMapped);
    }

    Ok(())
}

/// The final gate: only documents, scripts and stylesheets are indexed.
pub fn check_content_type(content_type: ResourceType) -> Verdict {
    if content_type.is_document_or_script_or_style_sheet() {
        Verdict::Accept(content_type)
    } else {
        Verdict::Reject(Rejection::UnsupportedContentType(content_type))
    }
}
