//! Mermaid gantt renderer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::dates::format_date;
use crate::core::sanitize::ElementIds;
use crate::core::task::TaskNode;
use crate::{plog_debug, plog_trace};
use crate::render::surface::{Drawing, DrawingKind, SurfaceHandle};
use crate::render::{Canvas, RenderOptions, RenderOutcome, RendererKind, RendererState, RendererStrategy};

pub const DEFAULT_TITLE: &str = "Detailed Plan";
pub const UNAVAILABLE_MESSAGE: &str = "Mermaid is not available.";

const GROUP_LABEL_MAX: usize = 65;
const FALLBACK_GROUP: &str = "All";

/// Draws a static gantt diagram. Date editing is not supported.
pub struct MermaidRenderer {
    canvas: Canvas,
}

impl MermaidRenderer {
    pub fn new(surface: SurfaceHandle) -> Self {
        Self {
            canvas: Canvas::new(surface, "mermaid"),
        }
    }
}

#[async_trait]
impl RendererStrategy for MermaidRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Mermaid
    }

    fn state(&self) -> RendererState {
        self.canvas.state()
    }

    async fn render(&mut self, tasks: &[TaskNode], options: &RenderOptions) -> RenderOutcome {
        self.canvas.begin();
        if tasks.is_empty() {
            return self.canvas.show_empty();
        }
        if !self.canvas.supports(DrawingKind::Mermaid) {
            return self.canvas.unavailable(UNAVAILABLE_MESSAGE);
        }

        let source = gantt_source(tasks, options);
        plog_debug!("mermaid: {} task(s), {} byte(s) of source", tasks.len(), source.len());
        plog_trace!("mermaid source:\n{}", source);

        // Layout is the host's job; let it run before mounting.
        tokio::task::yield_now().await;
        self.canvas.present(Drawing::Mermaid(source), tasks.len())
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }
}

fn init_config() -> Value {
    json!({
        "theme": "default",
        "gantt": {
            "barHeight": 60,
            "barGap": 10,
            "fontSize": 18,
            "sectionFontSize": 18,
            "numberSectionStyles": 4,
            "axisFormat": "%Y-%m-%d",
            "topPadding": 120,
            "leftPadding": 450,
            "gridLineStartPadding": 50
        }
    })
}

/// Mermaid gantt source for `tasks`.
///
/// Emits one `section` per initiative, in first-seen order, holding the
/// initiative row followed by its work packages.
pub fn gantt_source(tasks: &[TaskNode], options: &RenderOptions) -> String {
    let mut lines = vec![
        format!("%%{{init: {} }}%%", init_config()),
        "gantt".to_string(),
        "dateFormat YYYY-MM-DD".to_string(),
        "axisFormat %Y-%m-%d".to_string(),
    ];

    let title = options
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE);
    lines.push(format!("title {}", title));
    lines.push("todayMarker stroke-width:2px,stroke:#f00,opacity:0.7".to_string());

    let ids = ElementIds::assign(tasks);
    let labels: HashMap<&str, String> = tasks
        .iter()
        .filter(|task| task.is_initiative())
        .map(|task| (task.source_id.as_str(), group_label(task)))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&TaskNode>> = HashMap::new();
    for task in tasks {
        let owner = if task.is_initiative() {
            Some(task.source_id.as_str())
        } else {
            task.initiative_id.as_deref()
        };
        let group = owner
            .and_then(|id| labels.get(id).cloned())
            .unwrap_or_else(|| FALLBACK_GROUP.to_string());
        if !groups.contains_key(&group) {
            order.push(group.clone());
        }
        groups.entry(group).or_default().push(task);
    }

    for group in &order {
        lines.push(format!("section {}", escape_label(group)));
        for task in &groups[group] {
            lines.push(format!(
                "{} :{}, {}, {}, {}",
                escape_label(&task.name),
                status_token(&task.status),
                ids.get(&task.id),
                format_date(task.start),
                format_date(task.end)
            ));
        }
    }

    lines.join("\n")
}

/// Section heading for an initiative: `<title> (<id>)`, truncated.
pub fn group_label(task: &TaskNode) -> String {
    let full = format!("{} ({})", task.name, task.source_id);
    if full.chars().count() > GROUP_LABEL_MAX {
        let head: String = full.chars().take(GROUP_LABEL_MAX).collect();
        format!("{}...", head)
    } else {
        full
    }
}

/// Mermaid uses `:` and `,` as row syntax.
pub fn escape_label(text: &str) -> String {
    text.replace(':', " -").replace(',', " / ")
}

pub fn status_token(status: &str) -> &'static str {
    let s = status.to_lowercase();
    if s.contains("done") || s.contains("complete") {
        "done"
    } else if s.contains("risk") || s.contains("block") {
        "crit"
    } else {
        "active"
    }
}
