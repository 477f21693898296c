use pretty_assertions::assert_eq;

use netproject::{
    instrumentation::{
        ExecutionContext, Frame, HostTarget, Resource, ResourceType, Script, SourceEvent,
        StyleSheetHeader, StyleSheetOrigin, TargetId,
    },
    partition::{partition_key, PartitionKind},
    url::split_url,
    workspace::Workspace,
    EngineState,
};

use crate::sync_test::harness::Harness;

fn page() -> TargetId {
    TargetId::new("page")
}

fn document(url: &str) -> SourceEvent {
    SourceEvent::ResourceAdded(Resource::document(url))
}

fn script(id: &str, url: &str) -> SourceEvent {
    SourceEvent::ScriptParsed(Script::new(id, url))
}

#[test]
fn document_lands_in_its_origin_partition() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(&page(), document("http://a.com/index.html"));

    let key = partition_key(&page(), "http://a.com", false);
    let entry = harness
        .workspace
        .entry_at(&key, "index.html")
        .expect("document should be indexed");
    assert_eq!(entry.url, "http://a.com/index.html");

    let record = harness
        .engine(&page())
        .registry()
        .entry(entry.id)
        .unwrap()
        .clone();
    assert_eq!(record.parent_path, "");
    assert_eq!(record.name, "index.html");
    assert_eq!(record.content_type, ResourceType::Document);

    let partition = harness.engine(&page()).registry().partition(&key).unwrap();
    assert_eq!(partition.url, "http://a.com");
    assert_eq!(partition.display_name, "a.com");
    assert_eq!(partition.target_id(), &page());

    assert_eq!(harness.state(&page()), EngineState::AttachedPopulated);
}

#[test]
fn inline_script_without_source_url_is_not_indexed() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(
        &page(),
        SourceEvent::ScriptParsed(Script::new("1", "http://a.com/index.html").inline()),
    );
    harness.emit_and_process(&page(), SourceEvent::ScriptParsed(Script::new("2", "")));

    assert!(harness.urls().is_empty());
    assert_eq!(harness.state(&page()), EngineState::AttachedEmpty);
}

#[test]
fn failed_scripts_are_indexed_like_parsed_ones() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(
        &page(),
        SourceEvent::ScriptFailedToParse(Script::new("1", "http://a.com/bad.js")),
    );
    harness.emit_and_process(
        &page(),
        SourceEvent::ScriptFailedToParse(Script::new("2", "http://a.com/index.html").inline()),
    );
    harness.emit_and_process(
        &page(),
        SourceEvent::ScriptFailedToParse(Script::new("3", "http://a.com/bad.js")),
    );

    assert_eq!(harness.urls(), vec!["http://a.com/bad.js"]);

    let entry = harness.workspace.entry_for_url("http://a.com/bad.js").unwrap();
    assert_eq!(
        harness.directory.content_type_for_entry(entry.id),
        Some(ResourceType::Script)
    );
}

#[test]
fn inline_style_sheets_need_the_inspector() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    let inline = StyleSheetHeader::new("1", "http://a.com/index.html")
        .inline()
        .in_frame("http://a.com/index.html");

    harness.emit_and_process(&page(), SourceEvent::StyleSheetAdded(inline.clone()));
    assert!(harness.urls().is_empty());

    harness.emit_and_process(
        &page(),
        SourceEvent::StyleSheetAdded(inline.with_origin(StyleSheetOrigin::Inspector)),
    );
    assert_eq!(harness.urls(), vec!["inspector://a.com/inspector-stylesheet"]);
}

#[test]
fn navigation_replaces_entries_with_the_frame_walk() {
    let mut harness = Harness::new();
    let target = harness.attach(HostTarget::new(page(), "Page"));

    harness.emit(&page(), document("http://a.com/index.html"));
    harness.emit(&page(), script("1", "http://a.com/js/app.js"));
    harness.emit(
        &page(),
        SourceEvent::StyleSheetAdded(StyleSheetHeader::new("2", "http://a.com/css/site.css")),
    );
    assert_eq!(harness.process(), 3);
    assert_eq!(harness.workspace.entry_count(), 3);

    target.set_main_frame(Some(
        Frame::new("main", "http://b.com/")
            .with_resource(Resource::document("http://b.com/"))
            .with_resource(Resource::new("http://b.com/logo.png", ResourceType::Image))
            .with_child(
                Frame::new("child", "http://ads.com/frame.html")
                    .with_resource(Resource::document("http://ads.com/frame.html")),
            ),
    ));

    harness.emit_and_process(&page(), SourceEvent::MainFrameNavigated);

    assert_eq!(
        harness.urls(),
        vec!["http://ads.com/frame.html", "http://b.com/"]
    );
    assert_eq!(harness.engine(&page()).registry().len(), 2);
    assert_eq!(harness.state(&page()), EngineState::AttachedPopulated);

    // Child frames are walked before their parent's resources.
    let child = harness.workspace.entry_for_url("http://ads.com/frame.html").unwrap();
    let main = harness.workspace.entry_for_url("http://b.com/").unwrap();
    assert!(child.id < main.id);
}

#[test]
fn navigation_without_a_frame_tree_leaves_an_empty_index() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(&page(), document("http://a.com/index.html"));
    harness.emit_and_process(&page(), SourceEvent::MainFrameNavigated);

    assert!(harness.urls().is_empty());
    assert_eq!(harness.state(&page()), EngineState::AttachedPopulated);
}

#[test]
fn suspend_empties_and_resume_repopulates() {
    let mut harness = Harness::new();
    harness.attach(
        HostTarget::new(page(), "Page").with_main_frame(
            Frame::new("main", "http://a.com/")
                .with_resource(Resource::document("http://a.com/index.html")),
        ),
    );

    harness.emit_and_process(&page(), script("1", "http://a.com/app.js"));
    harness.suspend();

    assert!(harness.urls().is_empty());
    assert!(harness.engine(&page()).registry().is_empty());
    assert_eq!(harness.state(&page()), EngineState::Suspended);

    // Resource loads don't count while suspended.
    harness.emit_and_process(&page(), document("http://a.com/late.html"));
    assert!(harness.urls().is_empty());

    harness.resume();

    assert_eq!(harness.urls(), vec!["http://a.com/index.html"]);
    assert_eq!(harness.state(&page()), EngineState::AttachedPopulated);
}

#[test]
fn navigation_while_suspended_keeps_ignoring_resource_loads() {
    let mut harness = Harness::new();
    let target = harness.attach(HostTarget::new(page(), "Page"));

    harness.suspend();

    target.set_main_frame(Some(
        Frame::new("main", "http://b.com/").with_resource(Resource::document("http://b.com/")),
    ));
    harness.emit_and_process(&page(), SourceEvent::MainFrameNavigated);
    assert_eq!(harness.urls(), vec!["http://b.com/"]);

    harness.emit_and_process(&page(), document("http://b.com/late.html"));
    assert_eq!(harness.urls(), vec!["http://b.com/"]);

    harness.resume();
    harness.emit_and_process(&page(), document("http://b.com/late.html"));

    assert_eq!(
        harness.urls(),
        vec!["http://b.com/", "http://b.com/late.html"]
    );
    assert_eq!(harness.state(&page()), EngineState::AttachedPopulated);
}

#[test]
fn suspension_is_host_wide() {
    let mut harness = Harness::new();
    let worker = TargetId::new("worker");

    harness.attach(HostTarget::new(page(), "Page"));
    harness.attach(HostTarget::new(worker.clone(), "worker.js").secondary());

    harness.emit_and_process(&page(), script("1", "http://a.com/app.js"));
    harness.emit_and_process(&worker, script("2", "http://a.com/worker.js"));
    assert_eq!(harness.urls().len(), 2);

    harness.suspend();

    assert!(harness.urls().is_empty());
    assert_eq!(harness.state(&page()), EngineState::Suspended);
    assert_eq!(harness.state(&worker), EngineState::Suspended);
}

#[test]
fn detach_with_queued_events_leaves_nothing_behind() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(&page(), document("http://a.com/index.html"));
    harness.emit(&page(), script("1", "http://a.com/app.js"));
    assert_eq!(harness.engine(&page()).pending_events(), 1);

    assert!(harness.detach(&page()));
    assert_eq!(harness.process(), 0);

    assert!(harness.urls().is_empty());
    assert_eq!(harness.workspace.partition_count(), 0);
    assert_eq!(harness.hub.listener_count(), 0);
    assert!(harness.directory.lookup(&page()).is_none());

    assert!(!harness.detach(&page()));
}

#[test]
fn one_entry_per_url_across_sources() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    let url = "http://a.com/page.html";
    harness.emit(&page(), document(url));
    harness.emit(&page(), script("1", url));
    harness.emit(
        &page(),
        SourceEvent::StyleSheetAdded(StyleSheetHeader::new("2", url)),
    );
    harness.emit(&page(), document(url));
    harness.process();

    assert_eq!(harness.urls(), vec![url]);

    let entry = harness.workspace.entry_for_url(url).unwrap();
    assert_eq!(
        harness.directory.content_type_for_entry(entry.id),
        Some(ResourceType::Document)
    );
}

#[test]
fn urls_are_deduplicated_across_targets() {
    let mut harness = Harness::new();
    let worker = TargetId::new("worker");

    harness.attach(HostTarget::new(page(), "Page"));
    harness.attach(HostTarget::new(worker.clone(), "worker.js").secondary());

    harness.emit_and_process(&page(), script("1", "http://a.com/shared.js"));
    harness.emit_and_process(&worker, script("2", "http://a.com/shared.js"));

    assert_eq!(harness.urls(), vec!["http://a.com/shared.js"]);

    let entry = harness.workspace.entry_for_url("http://a.com/shared.js").unwrap();
    assert_eq!(harness.directory.target_for_entry(entry.id), Some(&page()));
    assert!(harness.engine(&worker).registry().is_empty());
}

#[test]
fn content_scripts_get_their_own_partition() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(&page(), script("1", "chrome-extension://abc/page.js"));
    harness.emit_and_process(
        &page(),
        SourceEvent::ScriptParsed(
            Script::new("2", "chrome-extension://abc/inject.js").content_script(),
        ),
    );

    let registry = harness.engine(&page()).registry();
    let kinds: Vec<_> = registry.partitions().map(|p| (p.key.clone(), p.kind)).collect();

    assert_eq!(
        kinds,
        vec![
            (
                partition_key(&page(), "chrome-extension://abc", false),
                PartitionKind::Network
            ),
            (
                partition_key(&page(), "chrome-extension://abc", true),
                PartitionKind::ContentScripts
            ),
        ]
    );
}

#[test]
fn untracked_style_sheet_removal_is_ignored() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    let url = "http://a.com/index.html";
    harness.emit_and_process(&page(), document(url));

    // An inline sheet living in the document shares its URL but was never
    // indexed, so removing it must not take the document with it.
    harness.emit_and_process(
        &page(),
        SourceEvent::StyleSheetRemoved(StyleSheetHeader::new("1", url).inline()),
    );
    assert_eq!(harness.urls(), vec![url]);

    // Removing something that was never added is a no-op.
    harness.emit_and_process(
        &page(),
        SourceEvent::StyleSheetRemoved(StyleSheetHeader::new("2", "http://z.com/none.css")),
    );
    assert_eq!(harness.urls(), vec![url]);
}

#[test]
fn style_sheet_removal_keeps_entries_of_other_kinds() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    let url = "http://a.com/page.html";
    harness.emit_and_process(&page(), document(url));

    // Already mapped, so the sheet is never indexed in its own right.
    let sheet = StyleSheetHeader::new("1", url);
    harness.emit_and_process(&page(), SourceEvent::StyleSheetAdded(sheet.clone()));
    harness.emit_and_process(&page(), SourceEvent::StyleSheetRemoved(sheet));
    assert_eq!(harness.urls(), vec![url]);

    let css = "http://a.com/site.css";
    let sheet = StyleSheetHeader::new("2", css);
    harness.emit_and_process(&page(), SourceEvent::StyleSheetAdded(sheet.clone()));
    assert_eq!(harness.urls(), vec![url, css]);

    harness.emit_and_process(&page(), SourceEvent::StyleSheetRemoved(sheet));
    assert_eq!(harness.urls(), vec![url]);
}

#[test]
fn display_names_follow_execution_contexts() {
    let mut harness = Harness::new();
    let target = harness.attach(HostTarget::new(page(), "Page"));
    let worker = TargetId::new("worker");
    harness.attach(HostTarget::new(worker.clone(), "sw.js").secondary());

    target.set_execution_contexts(vec![ExecutionContext::new("http://a.com", "Top")]);

    harness.emit_and_process(&page(), script("1", "http://a.com/app.js"));
    harness.emit_and_process(&page(), script("2", "http://b.com:8080/lib.js"));
    harness.emit_and_process(&worker, script("3", "http://c.com/sw.js"));

    let mut names: Vec<String> = harness
        .directory
        .engines()
        .flat_map(|engine| engine.registry().partitions())
        .map(|partition| partition.display_name.clone())
        .collect();
    names.sort();

    assert_eq!(names, vec!["Top", "b.com:8080", "c.com \u{2014} sw.js"]);
}

#[test]
fn malformed_urls_still_get_indexed() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    harness.emit_and_process(&page(), script("1", "not a url"));

    let key = partition_key(&page(), "", false);
    assert!(harness.workspace.entry_at(&key, "not a url").is_some());

    let partition = harness.engine(&page()).registry().partition(&key).unwrap();
    assert_eq!(partition.display_name, "(no domain)");
}

#[test]
fn split_keys_are_stable() {
    for url in [
        "http://a.com/index.html",
        "http://a.com:8080/x/y/z.js?v=1",
        "http://a.com/dir/",
        "https://a.com",
    ] {
        let parts = split_url(url);
        let rejoined = format!("{}/{}", parts.partition_url, parts.path());

        assert_eq!(split_url(&rejoined), parts, "re-splitting {}", url);
        assert_eq!(
            partition_key(&page(), &parts.partition_url, false),
            partition_key(&page(), &split_url(&rejoined).partition_url, false)
        );
    }
}

#[test]
fn registry_reset_clears_the_workspace() {
    let mut harness = Harness::new();
    harness.attach(HostTarget::new(page(), "Page"));

    for (index, url) in ["http://a.com/1.js", "http://b.com/2.js", "http://c.com/x/3.js"]
        .into_iter()
        .enumerate()
    {
        harness.emit(&page(), script(&index.to_string(), url));
    }
    harness.process();
    assert_eq!(harness.workspace.partition_count(), 3);

    harness.emit_and_process(&page(), SourceEvent::MainFrameNavigated);

    assert_eq!(harness.workspace.partition_count(), 0);
    assert!(!harness.workspace.has_entry_for_url("http://a.com/1.js"));
}
