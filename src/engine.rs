//! The per-target synchronization engine.
//!
//! An engine subscribes to its target's feeds when it attaches. Every
//! subscription sends into one queue, so the engine sees events in the order
//! the host emitted them. Nothing is processed until the host pumps the queue
//! with `process_events`, and each handler runs to completion before the next
//! event is looked at.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use serde::Serialize;

use crate::{
    classifier::{
        check_content_type, check_unmapped, classify_resource, classify_script,
        classify_style_sheet, is_tracked_style_sheet, Verdict,
    },
    content::ContentSource,
    instrumentation::{
        EventFeed, EventHub, EventKind, Frame, ListenerId, ListenerScope, Resource, ResourceType,
        Script, SourceEvent, StyleSheetHeader, Target, TargetId,
    },
    partition::PartitionRegistry,
    workspace::{EntryId, Workspace},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineState {
    /// Subscribed, nothing indexed yet.
    AttachedEmpty,

    /// Subscribed with at least one populate or add behind it.
    AttachedPopulated,

    /// Every target is suspended and the index has been cleared. Resource
    /// loads are ignored until a resume repopulates.
    Suspended,

    Disposed,
}

pub struct SyncEngine {
    target: Arc<dyn Target>,
    state: EngineState,
    registry: PartitionRegistry,
    listeners: Vec<ListenerId>,
    event_receiver: Receiver<SourceEvent>,
}

impl SyncEngine {
    /// Creates an engine for `target` and subscribes it to every feed the
    /// target exposes.
    pub fn attach(target: Arc<dyn Target>, hub: &mut EventHub) -> Self {
        let (event_sender, event_receiver) = unbounded();
        let mut listeners = Vec::new();

        for kind in EventKind::ALL {
            let scope = match kind.feed() {
                EventFeed::ResourceTree => ListenerScope::Target(target.id().clone()),
                EventFeed::Debugger if target.has_script_feed() => {
                    ListenerScope::Target(target.id().clone())
                }
                EventFeed::Css if target.has_style_sheet_feed() => {
                    ListenerScope::Target(target.id().clone())
                }
                // Suspension is announced by the target manager for every
                // target at once.
                EventFeed::TargetManager => ListenerScope::AllTargets,
                EventFeed::Debugger | EventFeed::Css => continue,
            };

            listeners.push(hub.subscribe(scope, kind, event_sender.clone()));
        }

        log::info!(
            "Attached to target {} ({}) with {} listeners",
            target.id(),
            target.name(),
            listeners.len()
        );

        Self {
            registry: PartitionRegistry::new(Arc::clone(&target)),
            target,
            state: EngineState::AttachedEmpty,
            listeners,
            event_receiver,
        }
    }

    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    pub fn target_id(&self) -> &TargetId {
        self.target.id()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn registry(&self) -> &PartitionRegistry {
        &self.registry
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    /// Number of events delivered to this engine but not yet handled.
    pub fn pending_events(&self) -> usize {
        self.event_receiver.len()
    }

    /// Handles every queued event in arrival order. Returns how many were
    /// handled.
    pub fn process_events(&mut self, workspace: &mut dyn Workspace) -> usize {
        let mut handled = 0;

        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event, workspace);
            handled += 1;
        }

        handled
    }

    pub fn handle_event(&mut self, event: SourceEvent, workspace: &mut dyn Workspace) {
        if self.state == EngineState::Disposed {
            log::warn!(
                "Target {} is disposed, dropping {:?}",
                self.target.id(),
                event.kind()
            );
            return;
        }

        log::trace!("Target {} handling {:?}", self.target.id(), event.kind());

        match event {
            SourceEvent::ResourceAdded(resource) => self.resource_added(resource, workspace),
            SourceEvent::MainFrameNavigated => self.main_frame_navigated(workspace),
            SourceEvent::ScriptParsed(script) | SourceEvent::ScriptFailedToParse(script) => {
                self.script_parsed(script, workspace)
            }
            SourceEvent::StyleSheetAdded(header) => self.style_sheet_added(header, workspace),
            SourceEvent::StyleSheetRemoved(header) => self.style_sheet_removed(header, workspace),
            SourceEvent::SuspendStateChanged => self.suspend_state_changed(workspace),
        }
    }

    /// Maps `url` into the project tree unless it's already there or its
    /// content isn't something the tree holds.
    pub fn add_file_for_url(
        &mut self,
        url: &str,
        content: ContentSource,
        is_content_script: bool,
        workspace: &mut dyn Workspace,
    ) -> Option<EntryId> {
        if let Err(rejection) = check_unmapped(url, workspace) {
            log::debug!("Not adding {:?}: {}", url, rejection);
            return None;
        }

        let content_type = match check_content_type(content.content_type()) {
            Verdict::Accept(content_type) => content_type,
            Verdict::Reject(rejection) => {
                log::debug!("Not adding {}: {}", url, rejection);
                return None;
            }
        };

        let id = self
            .registry
            .add_entry(url, content, is_content_script, content_type, workspace);

        if self.state == EngineState::AttachedEmpty {
            self.state = EngineState::AttachedPopulated;
        }

        Some(id)
    }

    /// Unsubscribes from every feed, throws away anything still queued and
    /// clears the index. Later calls do nothing.
    pub fn dispose(&mut self, hub: &mut EventHub, workspace: &mut dyn Workspace) {
        if self.state == EngineState::Disposed {
            return;
        }

        for listener in self.listeners.drain(..) {
            hub.unsubscribe(listener);
        }

        let discarded = self.event_receiver.try_iter().count();
        if discarded > 0 {
            log::debug!(
                "Discarded {} queued events for target {}",
                discarded,
                self.target.id()
            );
        }

        self.reset(workspace);
        self.state = EngineState::Disposed;

        log::info!("Detached from target {}", self.target.id());
    }

    fn resource_added(&mut self, resource: Resource, workspace: &mut dyn Workspace) {
        if self.state == EngineState::Suspended || self.target.all_targets_suspended() {
            log::trace!("Suspended, ignoring {}", resource.url);
            return;
        }

        self.add_resource(resource, workspace);
    }

    fn add_resource(&mut self, resource: Resource, workspace: &mut dyn Workspace) {
        match classify_resource(&resource, workspace) {
            Verdict::Accept(_) => {
                let url = resource.url.clone();
                self.add_file_for_url(&url, resource.into(), false, workspace);
            }
            Verdict::Reject(rejection) => {
                log::debug!("Skipping resource {}: {}", resource.url, rejection);
            }
        }
    }

    fn script_parsed(&mut self, script: Script, workspace: &mut dyn Workspace) {
        match classify_script(&script, workspace) {
            Verdict::Accept(_) => {
                let url = script.source_url.clone();
                let is_content_script = script.is_content_script;
                self.add_file_for_url(&url, script.into(), is_content_script, workspace);
            }
            Verdict::Reject(rejection) => {
                log::debug!(
                    "Skipping script {} ({:?}): {}",
                    script.script_id,
                    script.source_url,
                    rejection
                );
            }
        }
    }

    fn style_sheet_added(&mut self, header: StyleSheetHeader, workspace: &mut dyn Workspace) {
        match classify_style_sheet(&header, workspace) {
            Verdict::Accept(_) => {
                let url = header.resource_url();
                self.add_file_for_url(&url, header.into(), false, workspace);
            }
            Verdict::Reject(rejection) => {
                log::debug!(
                    "Skipping stylesheet {} ({:?}): {}",
                    header.style_sheet_id,
                    header.source_url,
                    rejection
                );
            }
        }
    }

    fn style_sheet_removed(&mut self, header: StyleSheetHeader, workspace: &mut dyn Workspace) {
        if !is_tracked_style_sheet(&header) {
            return;
        }

        let url = header.resource_url();
        let indexed_as = self
            .registry
            .entry_for_url(&url)
            .map(|record| record.content_type);

        match indexed_as {
            Some(ResourceType::StyleSheet) => {
                self.registry.remove_entry_for_url(&url, workspace);
            }
            Some(other) => log::debug!("Keeping {}, it was indexed as {:?}", url, other),
            None => log::trace!("Stylesheet {} was not indexed", url),
        }
    }

    fn main_frame_navigated(&mut self, workspace: &mut dyn Workspace) {
        log::debug!("Target {} navigated, rebuilding", self.target.id());

        self.reset(workspace);
        self.populate(workspace);
    }

    fn suspend_state_changed(&mut self, workspace: &mut dyn Workspace) {
        if self.target.all_targets_suspended() {
            log::debug!("All targets suspended, clearing {}", self.target.id());

            self.reset(workspace);
            self.state = EngineState::Suspended;
        } else {
            log::debug!("Targets resumed, repopulating {}", self.target.id());

            self.populate(workspace);
        }
    }

    /// Indexes every qualifying document in the current frame tree.
    fn populate(&mut self, workspace: &mut dyn Workspace) {
        match self.target.main_frame() {
            Some(main_frame) => self.populate_frame(&main_frame, workspace),
            None => log::trace!("Target {} has no main frame yet", self.target.id()),
        }

        self.state = EngineState::AttachedPopulated;
    }

    /// Child frames first, depth-first, then the frame's own resources.
    fn populate_frame(&mut self, frame: &Frame, workspace: &mut dyn Workspace) {
        for child in &frame.child_frames {
            self.populate_frame(child, workspace);
        }

        for resource in &frame.resources {
            self.add_resource(resource.clone(), workspace);
        }
    }

    fn reset(&mut self, workspace: &mut dyn Workspace) {
        self.registry.reset_all(workspace);
    }
}
