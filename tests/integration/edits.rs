//! Interactive date edits flowing back to the planning entities.

use std::sync::{Arc, Mutex};

use planline::core::dates::format_date;
use planline::core::{PlanSnapshot, SourceKind, TaskGraphBuilder, TaskId};
use planline::render::{DateEdit, RenderOptions, RendererFactory, RendererKind, RendererStrategy};

use crate::fixtures::{at, date, plan, surface, tasks, YEAR};

/// Apply an edit to the snapshot the way a host application would.
fn apply(plan: &mut PlanSnapshot, edit: &DateEdit) {
    match edit.source_kind {
        SourceKind::WorkPackage => {
            if let Some(wp) = plan.work_packages.iter_mut().find(|wp| wp.id == edit.source_id) {
                wp.start_date = Some(format_date(edit.start));
                wp.end_date = Some(format_date(edit.end));
            }
        }
        SourceKind::Initiative => {
            if let Some(init) = plan.initiatives.iter_mut().find(|i| i.id == edit.source_id) {
                init.start_date = Some(format_date(edit.start));
                init.target_due_date = Some(format_date(edit.end));
            }
        }
    }
}

#[tokio::test]
async fn test_edit_near_midnight_keeps_local_day() {
    let edits: Arc<Mutex<Vec<DateEdit>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = edits.clone();
    let options = RenderOptions::new()
        .with_year(YEAR)
        .on_update(move |edit| sink.lock().unwrap().push(edit.clone()));

    let mut renderer = RendererFactory::create(surface(), RendererKind::Timeline);
    renderer.render(&tasks(), &options).await;

    // Local midnight in UTC+9 is the previous evening in UTC.
    renderer
        .apply_edit(
            &TaskId::work_package("WP-A"),
            at("2025-03-10T00:00:00+09:00"),
            at("2025-05-01T00:30:00+09:00"),
        )
        .unwrap();

    let edits = edits.lock().unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].source_kind, SourceKind::WorkPackage);
    assert_eq!(edits[0].source_id, "WP-A");
    assert_eq!(format_date(edits[0].start), "2025-03-10");
    assert_eq!(format_date(edits[0].end), "2025-05-01");
}

#[tokio::test]
async fn test_edit_round_trips_into_rebuild() {
    let mut plan = plan();
    let received: Arc<Mutex<Option<DateEdit>>> = Arc::new(Mutex::new(None));
    let sink = received.clone();
    let options = RenderOptions::new()
        .with_year(YEAR)
        .on_update(move |edit| *sink.lock().unwrap() = Some(edit.clone()));

    let mut renderer = RendererFactory::create(surface(), RendererKind::Timeline);
    renderer.render(&tasks(), &options).await;
    renderer
        .apply_edit(
            &TaskId::work_package("WP-B"),
            at("2025-05-01T09:00:00-07:00"),
            at("2025-06-15T18:00:00-07:00"),
        )
        .unwrap();

    let edit = received.lock().unwrap().clone().unwrap();
    apply(&mut plan, &edit);

    let rebuilt = TaskGraphBuilder::new(YEAR).build(&plan.initiatives, &plan.work_packages);
    let wp_b = rebuilt.iter().find(|n| n.source_id == "WP-B").unwrap();
    assert_eq!((wp_b.start, wp_b.end), (date("2025-05-01"), date("2025-06-15")));
}

#[tokio::test]
async fn test_locked_initiative_edit_is_refused() {
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let options = RenderOptions::new()
        .with_year(YEAR)
        .on_update(move |_| *counter.lock().unwrap() += 1);

    let mut renderer = RendererFactory::create(surface(), RendererKind::Timeline);
    renderer.render(&tasks(), &options).await;

    let t = at("2025-06-01T12:00:00+00:00");
    assert!(renderer.apply_edit(&TaskId::initiative("INIT-1"), t, t).is_err());
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_mermaid_does_not_edit() {
    let mut renderer = RendererFactory::create(surface(), RendererKind::Mermaid);
    renderer.render(&tasks(), &RenderOptions::new().with_year(YEAR)).await;
    let t = at("2025-06-01T12:00:00+00:00");
    assert!(renderer.apply_edit(&TaskId::work_package("WP-A"), t, t).is_err());
}
