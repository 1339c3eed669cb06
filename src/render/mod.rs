//! Pluggable timeline rendering.
//!
//! A [`RendererStrategy`] draws a task node list into a [`Surface`] and,
//! when it supports interactive editing, reports date edits back through
//! the caller's [`UpdateCallback`]. [`RendererFactory`] maps the selected
//! [`RendererKind`] to a fresh strategy instance.
//!
//! Instances move between these states and are reusable indefinitely:
//!
//! ```text
//! Idle -> Rendering -> Rendered -> (clear) Idle
//!                   \-> Errored  -> (render) Rendering
//! ```
//!
//! `render` never fails: an unavailable backend or a failing draw becomes
//! [`RenderOutcome::Degraded`] with an error message left on the surface.
//! At most one render may be in flight per instance; `&mut self` enforces
//! that.

pub mod factory;
pub mod flag;
pub mod mermaid;
pub mod surface;
pub mod timeline;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::task::{SourceKind, TaskId, TaskNode};
use crate::error::{Error, Result};
use crate::util::panic_message;
use crate::{plog_error, plog_warn};

pub use factory::RendererFactory;
pub use flag::{RendererFlag, RendererKind};
pub use mermaid::MermaidRenderer;
pub use surface::{
    Drawing, DrawingKind, MemorySurface, StdoutSurface, Surface, SurfaceContent, SurfaceHandle, WriterSurface,
};
pub use timeline::{TimelineBar, TimelineChart, TimelineRenderer};

/// Shown when a render request has no tasks.
pub const EMPTY_MESSAGE: &str = "No initiatives to display.";
/// Headline of the in-surface error shown when drawing fails.
pub const RENDER_ERROR_HEADLINE: &str = "Error rendering Gantt chart.";

/// Timeline granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "Quarter Day")]
    QuarterDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    Day,
    Week,
    #[default]
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::QuarterDay,
        ViewMode::HalfDay,
        ViewMode::Day,
        ViewMode::Week,
        ViewMode::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::QuarterDay => "Quarter Day",
            ViewMode::HalfDay => "Half Day",
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = Error;

    /// Accepts display names case-insensitively, with spaces, dashes or
    /// underscores between words ("quarter-day", "Half Day", "month").
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let squash = |v: &str| {
            v.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .collect::<String>()
                .to_lowercase()
        };
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|mode| squash(mode.as_str()) == wanted)
            .ok_or_else(|| Error::InvalidViewMode(s.to_string()))
    }
}

/// Highlight request for one initiative or task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Focus {
    pub initiative_id: Option<String>,
    pub task_id: Option<TaskId>,
}

/// A date edit normalized to calendar days.
///
/// `start` and `end` display as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEdit {
    pub source_kind: SourceKind,
    pub source_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Receives edits so the host can update its planning entities.
pub type UpdateCallback = Arc<dyn Fn(&DateEdit) + Send + Sync>;

/// The calendar day the user saw when they picked `timestamp`.
///
/// Uses the offset the timestamp carries, so callers must hand over the
/// user's own offset. Hosts that only hold a UTC instant convert it with
/// [`in_local_offset`] first; reading the UTC date would move local times
/// just after midnight east of Greenwich onto the previous day.
pub fn local_calendar_day(timestamp: &DateTime<FixedOffset>) -> NaiveDate {
    timestamp.date_naive()
}

/// `instant` re-expressed in this machine's local offset.
pub fn in_local_offset<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
    instant.with_timezone(&Local).fixed_offset()
}

#[derive(Clone, Default)]
pub struct RenderOptions {
    pub view_mode: ViewMode,
    pub title: Option<String>,
    /// Year bounding the visible window; the local year when unset.
    pub year: Option<i32>,
    pub focus: Focus,
    pub on_update: Option<UpdateCallback>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DateEdit) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(callback));
        self
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("view_mode", &self.view_mode)
            .field("title", &self.title)
            .field("year", &self.year)
            .field("focus", &self.focus)
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Idle,
    Rendering,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The drawing was mounted.
    Rendered { bars: usize },
    /// Nothing to draw; the surface shows [`EMPTY_MESSAGE`].
    Empty,
    /// The backend was unavailable or drawing failed; the surface shows
    /// an explanatory message.
    Degraded { reason: String },
}

impl RenderOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, RenderOutcome::Degraded { .. })
    }
}

#[async_trait]
pub trait RendererStrategy: Send {
    fn kind(&self) -> RendererKind;

    fn state(&self) -> RendererState;

    /// Draw `tasks` into the surface.
    async fn render(&mut self, tasks: &[TaskNode], options: &RenderOptions) -> RenderOutcome;

    /// Remove anything drawn. Idempotent.
    fn clear(&mut self);

    /// Apply a user edit of a bar's boundaries.
    ///
    /// Renderers without interactive editing refuse every edit.
    fn apply_edit(
        &mut self,
        task_id: &TaskId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<DateEdit> {
        let _ = (start, end);
        Err(Error::Validation(format!(
            "{} renderer does not support editing {}",
            self.kind(),
            task_id
        )))
    }
}

/// Surface plus lifecycle bookkeeping shared by every strategy.
pub(crate) struct Canvas {
    surface: SurfaceHandle,
    state: RendererState,
    label: &'static str,
}

impl Canvas {
    pub(crate) fn new(surface: SurfaceHandle, label: &'static str) -> Self {
        Self {
            surface,
            state: RendererState::Idle,
            label,
        }
    }

    pub(crate) fn state(&self) -> RendererState {
        self.state
    }

    pub(crate) fn begin(&mut self) {
        self.state = RendererState::Rendering;
    }

    pub(crate) fn supports(&self, kind: DrawingKind) -> bool {
        surface::lock_surface(&self.surface).supports(kind)
    }

    pub(crate) fn show_empty(&mut self) -> RenderOutcome {
        let mut surface = surface::lock_surface(&self.surface);
        surface.clear();
        surface.show_message(EMPTY_MESSAGE);
        self.state = RendererState::Rendered;
        RenderOutcome::Empty
    }

    pub(crate) fn unavailable(&mut self, message: &str) -> RenderOutcome {
        plog_warn!("{} renderer unavailable: {}", self.label, message);
        let mut surface = surface::lock_surface(&self.surface);
        surface.clear();
        surface.show_message(message);
        self.state = RendererState::Errored;
        RenderOutcome::Degraded {
            reason: message.to_string(),
        }
    }

    /// Mount a drawing, converting errors and panics from the surface into
    /// a degraded outcome.
    pub(crate) fn present(&mut self, drawing: Drawing, bars: usize) -> RenderOutcome {
        let mut surface = surface::lock_surface(&self.surface);
        surface.clear();

        let failure = match catch_unwind(AssertUnwindSafe(|| surface.mount(drawing))) {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        match failure {
            None => {
                self.state = RendererState::Rendered;
                RenderOutcome::Rendered { bars }
            }
            Some(detail) => {
                plog_error!("{} render failed: {}", self.label, detail);
                surface.clear();
                surface.show_error(RENDER_ERROR_HEADLINE, Some(&detail));
                self.state = RendererState::Errored;
                RenderOutcome::Degraded { reason: detail }
            }
        }
    }

    /// Remount an updated drawing after a successful render.
    pub(crate) fn refresh(&mut self, drawing: Drawing, bars: usize) -> RenderOutcome {
        self.begin();
        self.present(drawing, bars)
    }

    pub(crate) fn clear(&mut self) {
        surface::lock_surface(&self.surface).clear();
        self.state = RendererState::Idle;
    }
}
