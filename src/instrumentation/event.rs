use serde::{Deserialize, Serialize};

use super::{Resource, Script, StyleSheetHeader};

/// An event raised by one of a target's instrumentation feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum SourceEvent {
    ResourceAdded(Resource),
    MainFrameNavigated,
    ScriptParsed(Script),
    ScriptFailedToParse(Script),
    StyleSheetAdded(StyleSheetHeader),
    StyleSheetRemoved(StyleSheetHeader),
    SuspendStateChanged,
}

impl SourceEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SourceEvent::ResourceAdded(_) => EventKind::ResourceAdded,
            SourceEvent::MainFrameNavigated => EventKind::MainFrameNavigated,
            SourceEvent::ScriptParsed(_) => EventKind::ScriptParsed,
            SourceEvent::ScriptFailedToParse(_) => EventKind::ScriptFailedToParse,
            SourceEvent::StyleSheetAdded(_) => EventKind::StyleSheetAdded,
            SourceEvent::StyleSheetRemoved(_) => EventKind::StyleSheetRemoved,
            SourceEvent::SuspendStateChanged => EventKind::SuspendStateChanged,
        }
    }
}

/// The discriminant of a `SourceEvent`, used as a subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ResourceAdded,
    MainFrameNavigated,
    ScriptParsed,
    ScriptFailedToParse,
    StyleSheetAdded,
    StyleSheetRemoved,
    SuspendStateChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::ResourceAdded,
        EventKind::MainFrameNavigated,
        EventKind::ScriptParsed,
        EventKind::ScriptFailedToParse,
        EventKind::StyleSheetAdded,
        EventKind::StyleSheetRemoved,
        EventKind::SuspendStateChanged,
    ];

    pub fn feed(self) -> EventFeed {
        match self {
            EventKind::ResourceAdded | EventKind::MainFrameNavigated => EventFeed::ResourceTree,
            EventKind::ScriptParsed | EventKind::ScriptFailedToParse => EventFeed::Debugger,
            EventKind::StyleSheetAdded | EventKind::StyleSheetRemoved => EventFeed::Css,
            EventKind::SuspendStateChanged => EventFeed::TargetManager,
        }
    }
}

/// The instrumentation model that raises a given kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFeed {
    ResourceTree,
    Debugger,
    Css,
    TargetManager,
}
