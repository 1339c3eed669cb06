//! Interactive timeline renderer.
//!
//! Bars are clamped to a single calendar year and can be dragged by the
//! host; [`TimelineRenderer::handle_date_change`] turns such a drag into a
//! [`DateEdit`] for the caller's update callback.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::core::dates::{current_year, format_date, year_end, year_start, DateSpan};
use crate::core::sanitize::{normalize_id, ElementIds};
use crate::core::task::{SourceKind, TaskId, TaskNode};
use crate::error::{Error, Result};
use crate::render::surface::{Drawing, DrawingKind, SurfaceHandle};
use crate::render::{
    local_calendar_day, Canvas, DateEdit, Focus, RenderOptions, RenderOutcome, RendererKind,
    RendererState, RendererStrategy, UpdateCallback, ViewMode,
};
use crate::{plog_debug, plog_warn};

pub const UNAVAILABLE_MESSAGE: &str = "Timeline view is not available.";
/// Why an initiative bar with work packages cannot be dragged.
pub const LOCKED_INITIATIVE: &str = "Edit at work package level";

const INITIATIVE_PREFIX: &str = "◆ ";
const WORK_PACKAGE_PREFIX: &str = "  ↳ ";
const LABEL_WIDTH: usize = 36;

/// One laid-out bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBar {
    /// Element-safe form of `task_id`, unique within the chart.
    pub id: String,
    pub task_id: TaskId,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
    /// Comma-joined element ids of the bars this one depends on.
    pub dependencies: String,
    pub class: String,
    pub kind: SourceKind,
    pub source_id: String,
    pub initiative_id: Option<String>,
    /// Set when the bar must not be edited directly.
    pub locked: Option<String>,
}

impl TimelineBar {
    fn from_node(node: &TaskNode, ids: &ElementIds, window: DateSpan, focus: &Focus) -> Self {
        let span = DateSpan::repaired(node.start, node.end).clamp_to(window);
        let prefix = match node.kind {
            SourceKind::Initiative => INITIATIVE_PREFIX,
            SourceKind::WorkPackage => WORK_PACKAGE_PREFIX,
        };
        let locked = (node.is_initiative() && node.has_work_packages).then(|| LOCKED_INITIATIVE.to_string());

        Self {
            id: ids.get(&node.id),
            task_id: node.id.clone(),
            label: format!("{}{}", prefix, node.name.trim_start()),
            start: span.start,
            end: span.end,
            progress: node.progress,
            dependencies: ids.join(&node.dependencies),
            class: bar_class(node, focus),
            kind: node.kind,
            source_id: node.source_id.clone(),
            initiative_id: node.initiative_id.clone(),
            locked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }
}

fn bar_class(node: &TaskNode, focus: &Focus) -> String {
    let mut classes = vec!["gantt-task".to_string()];
    classes.push(
        match node.kind {
            SourceKind::Initiative => "gantt-initiative",
            SourceKind::WorkPackage => "gantt-work-package",
        }
        .to_string(),
    );

    let slug = status_slug(&node.status);
    if !slug.is_empty() {
        classes.push(format!("status-{}", slug));
    }

    let owner = if node.is_initiative() {
        Some(node.source_id.as_str())
    } else {
        node.initiative_id.as_deref()
    };
    if let (Some(wanted), Some(owner)) = (focus.initiative_id.as_deref(), owner) {
        if normalize_id(wanted) == normalize_id(owner) {
            classes.push("focus-initiative".to_string());
        }
    }
    if focus.task_id.as_ref() == Some(&node.id) {
        classes.push("focus-row".to_string());
    }

    classes.join(" ")
}

fn status_slug(status: &str) -> String {
    status
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// A timeline ready to mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineChart {
    pub title: Option<String>,
    pub year: i32,
    pub view_mode: ViewMode,
    pub bars: Vec<TimelineBar>,
}

impl TimelineChart {
    pub fn layout(tasks: &[TaskNode], options: &RenderOptions) -> Self {
        let year = options.year.unwrap_or_else(current_year);
        let window = DateSpan::repaired(year_start(year), year_end(year));
        let ids = ElementIds::assign(tasks);
        Self {
            title: options.title.clone(),
            year,
            view_mode: options.view_mode,
            bars: tasks
                .iter()
                .map(|node| TimelineBar::from_node(node, &ids, window, &options.focus))
                .collect(),
        }
    }

    pub fn bar(&self, task_id: &TaskId) -> Option<&TimelineBar> {
        self.bars.iter().find(|bar| &bar.task_id == task_id)
    }

    fn bar_mut(&mut self, task_id: &TaskId) -> Option<&mut TimelineBar> {
        self.bars.iter_mut().find(|bar| &bar.task_id == task_id)
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = if month == 12 {
        NaiveDate::from_ymd_opt(year, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()?
    };
    Some((first, last))
}

/// Text grid: one row per bar, one cell per month.
impl std::fmt::Display for TimelineChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let year = year_start(self.year).year();
        match &self.title {
            Some(title) => writeln!(f, "{} ({}, {})", title, year, self.view_mode)?,
            None => writeln!(f, "{} ({})", year, self.view_mode)?,
        }
        writeln!(f, "{:<width$} JFMAMJJASOND", "", width = LABEL_WIDTH)?;

        for bar in &self.bars {
            let cells: String = (1..=12)
                .map(|month| match month_bounds(year, month) {
                    Some((first, last)) if bar.start <= last && bar.end >= first => '█',
                    _ => '·',
                })
                .collect();
            let label: String = bar.label.chars().take(LABEL_WIDTH).collect();
            write!(
                f,
                "{:<width$} {} {} .. {} {:>3}%",
                label,
                cells,
                format_date(bar.start),
                format_date(bar.end),
                bar.progress,
                width = LABEL_WIDTH
            )?;
            if bar.is_locked() {
                write!(f, " [locked]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct TimelineRenderer {
    canvas: Canvas,
    view_mode: ViewMode,
    chart: Option<TimelineChart>,
    on_update: Option<UpdateCallback>,
}

impl TimelineRenderer {
    pub fn new(surface: SurfaceHandle) -> Self {
        Self {
            canvas: Canvas::new(surface, "timeline"),
            view_mode: ViewMode::default(),
            chart: None,
            on_update: None,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// The last successfully mounted chart.
    pub fn chart(&self) -> Option<&TimelineChart> {
        self.chart.as_ref()
    }

    /// Switch granularity, redrawing the current chart if there is one.
    pub fn change_view_mode(&mut self, mode: ViewMode) -> Option<RenderOutcome> {
        self.view_mode = mode;
        let chart = self.chart.as_mut()?;
        chart.view_mode = mode;
        let drawing = Drawing::Timeline(chart.clone());
        let bars = chart.bars.len();
        Some(self.canvas.refresh(drawing, bars))
    }

    /// Apply a drag of a bar's boundaries.
    ///
    /// Timestamps are reduced to the calendar day in their own offset, an
    /// inverted result has its end forced to its start, and the update
    /// callback (if any) receives the edit. Locked and unknown bars are
    /// refused and the callback is not invoked.
    pub fn handle_date_change(
        &mut self,
        task_id: &TaskId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<DateEdit> {
        let chart = self
            .chart
            .as_mut()
            .ok_or_else(|| Error::Validation("no timeline is rendered".to_string()))?;
        let bar = chart
            .bar_mut(task_id)
            .ok_or_else(|| Error::Validation(format!("unknown task: {}", task_id)))?;

        if let Some(reason) = &bar.locked {
            plog_warn!("timeline: edit of {} refused: {}", task_id, reason);
            return Err(Error::Validation(format!("{}: {}", task_id, reason)));
        }

        let span = DateSpan::repaired(local_calendar_day(&start), local_calendar_day(&end));
        bar.start = span.start;
        bar.end = span.end;

        let edit = DateEdit {
            source_kind: bar.kind,
            source_id: bar.source_id.clone(),
            start: span.start,
            end: span.end,
        };
        plog_debug!(
            "timeline: {} {} moved to {} .. {}",
            edit.source_kind,
            edit.source_id,
            edit.start,
            edit.end
        );
        if let Some(callback) = &self.on_update {
            callback(&edit);
        }
        Ok(edit)
    }
}

#[async_trait]
impl RendererStrategy for TimelineRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Timeline
    }

    fn state(&self) -> RendererState {
        self.canvas.state()
    }

    async fn render(&mut self, tasks: &[TaskNode], options: &RenderOptions) -> RenderOutcome {
        self.canvas.begin();
        self.chart = None;
        self.view_mode = options.view_mode;
        self.on_update = options.on_update.clone();

        if tasks.is_empty() {
            return self.canvas.show_empty();
        }
        if !self.canvas.supports(DrawingKind::Timeline) {
            return self.canvas.unavailable(UNAVAILABLE_MESSAGE);
        }

        let chart = TimelineChart::layout(tasks, options);
        tokio::task::yield_now().await;

        let outcome = self.canvas.present(Drawing::Timeline(chart.clone()), chart.bars.len());
        if !outcome.is_degraded() {
            self.chart = Some(chart);
        }
        outcome
    }

    fn clear(&mut self) {
        self.chart = None;
        self.canvas.clear();
    }

    fn apply_edit(
        &mut self,
        task_id: &TaskId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<DateEdit> {
        self.handle_date_change(task_id, start, end)
    }
}
