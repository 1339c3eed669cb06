//! Reactive store driving renderer selection and redraws.

use std::sync::{Arc, Mutex};

use serde_json::json;

use planline::render::{
    Drawing, RenderOptions, RendererFactory, RendererFlag, RendererKind, RendererStrategy, SurfaceHandle,
};
use planline::{Error, ReactiveStore};

use crate::fixtures::{surface, tasks, YEAR};

#[test]
fn test_reference_set_get_subscribe() {
    let store = ReactiveStore::new();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    store.subscribe("a.b", move |new, old| {
        sink.lock().unwrap().push((new.clone(), old.cloned()));
        Ok(())
    });

    store.set("a.b", 5).unwrap();
    assert_eq!(store.get("a.b"), Some(json!(5)));
    assert_eq!(store.get("a.c"), None);
    assert_eq!(*calls.lock().unwrap(), vec![(json!(5), None)]);
}

#[test]
fn test_renderer_key_drives_flag() {
    let store = ReactiveStore::with_app_defaults();
    let flag = Arc::new(Mutex::new(RendererFlag::default()));

    let target = flag.clone();
    store.subscribe("settings.renderer", move |new, _| {
        let name = new.as_str().unwrap_or_default();
        target.lock().unwrap().set(name)?;
        Ok(())
    });

    store.set("settings.renderer", "timeline").unwrap();
    assert_eq!(flag.lock().unwrap().get(), RendererKind::Timeline);

    // The listener error is logged; the store value changes, the flag does not.
    store.set("settings.renderer", "gnuplot").unwrap();
    assert_eq!(store.get("settings.renderer"), Some(json!("gnuplot")));
    assert_eq!(flag.lock().unwrap().get(), RendererKind::Timeline);
}

#[test]
fn test_listener_redraws_on_focus_change() {
    let store = ReactiveStore::with_app_defaults();
    let surface = surface();
    let handle: SurfaceHandle = surface.clone();
    let nodes = tasks();

    store.subscribe("planning.draggedInitiativeId", move |new, _| {
        let mut options = RenderOptions::new().with_year(YEAR);
        options.focus.initiative_id = new.as_str().map(str::to_string);

        let mut renderer = RendererFactory::create(handle.clone(), RendererKind::Timeline);
        let rt = tokio::runtime::Builder::new_current_thread().build()?;
        rt.block_on(renderer.render(&nodes, &options));
        Ok(())
    });

    store.set("planning.draggedInitiativeId", "INIT-2").unwrap();

    let guard = surface.lock().unwrap();
    let Some(Drawing::Timeline(chart)) = guard.drawing() else {
        panic!("expected a timeline, got {:?}", guard.content());
    };
    let focused: Vec<&str> = chart
        .bars
        .iter()
        .filter(|bar| bar.has_class("focus-initiative"))
        .map(|bar| bar.source_id.as_str())
        .collect();
    assert_eq!(focused, vec!["INIT-2", "WP-C"]);
}

#[test]
fn test_same_key_reentry_is_rejected() {
    let store = ReactiveStore::new();
    let outcome = Arc::new(Mutex::new(None));

    let handle = store.clone();
    let sink = outcome.clone();
    store.subscribe("ui.loading", move |_, _| {
        *sink.lock().unwrap() = Some(handle.set("ui.loading", false));
        Ok(())
    });

    store.set("ui.loading", true).unwrap();
    assert_eq!(store.get("ui.loading"), Some(json!(true)));
    assert!(matches!(
        outcome.lock().unwrap().as_ref(),
        Some(Err(Error::ReentrantSet(key))) if key == "ui.loading"
    ));
}
