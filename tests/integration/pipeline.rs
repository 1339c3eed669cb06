//! Build, select and render.

use std::collections::HashSet;

use planline::core::{build, TaskId};
use planline::render::{
    Drawing, DrawingKind, MemorySurface, RenderOptions, RenderOutcome, RendererFactory, RendererFlag,
    RendererKind, RendererState, RendererStrategy, SurfaceContent, ViewMode, EMPTY_MESSAGE, RENDER_ERROR_HEADLINE,
};

use crate::fixtures::{date, plan, surface, tasks, YEAR};

#[test]
fn test_fixture_graph_shape() {
    let nodes = tasks();
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["init-INIT-1", "wp-WP-A", "wp-WP-B", "init-INIT-2", "wp-WP-C"]
    );

    let wp_b = &nodes[2];
    assert_eq!((wp_b.start, wp_b.end), (date("2025-04-01"), date("2025-04-01")));
    assert_eq!(wp_b.dependencies, vec![TaskId::work_package("WP-A")]);
    assert_eq!(wp_b.progress, 10);

    let wp_c = &nodes[4];
    assert_eq!((wp_c.start, wp_c.end), (date("2025-01-15"), date("2025-11-01")));
    assert_eq!(wp_c.dependencies, vec![TaskId::work_package("WP-B")]);
}

#[test]
fn test_every_node_is_valid_interval_with_resolved_dependencies() {
    let nodes = tasks();
    let ids: HashSet<&TaskId> = nodes.iter().map(|n| &n.id).collect();
    for node in &nodes {
        assert!(node.start <= node.end, "{} is inverted", node.id);
        for dep in &node.dependencies {
            assert!(ids.contains(dep), "{} has dangling {}", node.id, dep);
            assert_ne!(dep, &node.id);
        }
        assert!([0, 10, 50, 100].contains(&node.progress));
    }
}

#[test]
fn test_rebuild_is_identical() {
    let plan = plan();
    assert_eq!(
        build(&plan.initiatives, &plan.work_packages, YEAR),
        build(&plan.initiatives, &plan.work_packages, YEAR)
    );
}

#[tokio::test]
async fn test_default_flag_renders_mermaid() {
    let surface = surface();
    let flag = RendererFlag::default();
    let mut renderer = RendererFactory::from_flag(surface.clone(), &flag);

    let outcome = renderer.render(&tasks(), &RenderOptions::new().with_year(YEAR)).await;
    assert_eq!(outcome, RenderOutcome::Rendered { bars: 5 });

    let guard = surface.lock().unwrap();
    let Some(Drawing::Mermaid(source)) = guard.drawing() else {
        panic!("expected mermaid drawing, got {:?}", guard.content());
    };
    assert!(source.contains("section Payments platform (INIT-1)"));
    assert!(source.contains("Checkout API :crit, wp-wp-b, 2025-04-01, 2025-04-01"));
    assert!(source.contains("Ledger service :done, wp-wp-a, 2025-02-01, 2025-04-15"));
}

#[tokio::test]
async fn test_rejected_flag_value_keeps_previous_renderer() {
    let mut flag = RendererFlag::default();
    flag.set("frappe").unwrap();
    assert!(flag.set("gnuplot").is_err());
    assert_eq!(flag.get(), RendererKind::Timeline);

    let surface = surface();
    let mut renderer = RendererFactory::from_flag(surface.clone(), &flag);
    assert_eq!(renderer.kind(), RendererKind::Timeline);

    let options = RenderOptions::new().with_year(YEAR).with_view_mode(ViewMode::Week);
    renderer.render(&tasks(), &options).await;
    assert!(matches!(
        surface.lock().unwrap().drawing(),
        Some(Drawing::Timeline(chart)) if chart.view_mode == ViewMode::Week && chart.bars.len() == 5
    ));
}

#[tokio::test]
async fn test_factory_creates_fresh_instances() {
    let surface = surface();
    let mut first = RendererFactory::create(surface.clone(), RendererKind::Mermaid);
    first.render(&tasks(), &RenderOptions::new().with_year(YEAR)).await;

    let second = RendererFactory::create(surface.clone(), RendererKind::Mermaid);
    assert_eq!(first.state(), RendererState::Rendered);
    assert_eq!(second.state(), RendererState::Idle);
}

#[tokio::test]
async fn test_empty_input_shows_message() {
    for kind in RendererKind::ALL {
        let surface = surface();
        let mut renderer = RendererFactory::create(surface.clone(), kind);
        let outcome = renderer.render(&[], &RenderOptions::default()).await;
        assert_eq!(outcome, RenderOutcome::Empty);
        assert_eq!(
            surface.lock().unwrap().content(),
            &SurfaceContent::Message(EMPTY_MESSAGE.to_string())
        );
    }
}

#[tokio::test]
async fn test_unavailable_backend_degrades() {
    for kind in RendererKind::ALL {
        let drawing = match kind {
            RendererKind::Mermaid => DrawingKind::Mermaid,
            RendererKind::Timeline => DrawingKind::Timeline,
        };
        let surface = MemorySurface::new().without(drawing).shared();
        let mut renderer = RendererFactory::create(surface.clone(), kind);

        let outcome = renderer.render(&tasks(), &RenderOptions::default()).await;
        assert!(outcome.is_degraded(), "{} should degrade", kind);
        assert_eq!(renderer.state(), RendererState::Errored);
        assert!(matches!(surface.lock().unwrap().content(), SurfaceContent::Message(_)));
    }
}

#[tokio::test]
async fn test_draw_failure_is_contained_and_recoverable() {
    let surface = surface();
    let mut renderer = RendererFactory::create(surface.clone(), RendererKind::Timeline);

    surface.lock().unwrap().set_failure(Some("svg layout failed"));
    let outcome = renderer.render(&tasks(), &RenderOptions::new().with_year(YEAR)).await;
    assert!(outcome.is_degraded());
    assert_eq!(renderer.state(), RendererState::Errored);
    assert!(matches!(
        surface.lock().unwrap().content(),
        SurfaceContent::Error { headline, detail: Some(detail) }
            if headline == RENDER_ERROR_HEADLINE && detail.contains("svg layout failed")
    ));

    surface.lock().unwrap().set_failure(None);
    let outcome = renderer.render(&tasks(), &RenderOptions::new().with_year(YEAR)).await;
    assert_eq!(outcome, RenderOutcome::Rendered { bars: 5 });
    assert_eq!(renderer.state(), RendererState::Rendered);

    renderer.clear();
    renderer.clear();
    assert!(surface.lock().unwrap().is_blank());
    assert_eq!(renderer.state(), RendererState::Idle);
}
