//! Drawing surfaces.
//!
//! A surface is the opaque target a renderer draws into. The core only
//! ever hands it finished drawings or messages; what a surface does with
//! them (embed an SVG, print text, forward to a UI thread) is its own
//! business.

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::render::timeline::TimelineChart;
use crate::util;

/// The drawing formats renderers produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingKind {
    /// Mermaid gantt source.
    Mermaid,
    /// Laid-out timeline bars.
    Timeline,
}

/// A finished drawing ready to be mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawing {
    Mermaid(String),
    Timeline(TimelineChart),
}

impl Drawing {
    pub fn kind(&self) -> DrawingKind {
        match self {
            Drawing::Mermaid(_) => DrawingKind::Mermaid,
            Drawing::Timeline(_) => DrawingKind::Timeline,
        }
    }
}

impl std::fmt::Display for Drawing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Drawing::Mermaid(source) => write!(f, "{}", source),
            Drawing::Timeline(chart) => write!(f, "{}", chart),
        }
    }
}

pub trait Surface: Send {
    /// Whether the backend for this drawing kind is available.
    fn supports(&self, kind: DrawingKind) -> bool;

    /// Replace the surface content with a drawing.
    fn mount(&mut self, drawing: Drawing) -> Result<()>;

    /// Show a static, non-error message (e.g. nothing to display).
    fn show_message(&mut self, message: &str);

    /// Show a user-visible error in place of a drawing.
    fn show_error(&mut self, headline: &str, detail: Option<&str>);

    /// Remove all content. Must be safe to call on an empty surface.
    fn clear(&mut self);
}

/// Shared handle passed to the renderer factory.
pub type SurfaceHandle = Arc<Mutex<dyn Surface>>;

pub(crate) fn lock_surface(handle: &SurfaceHandle) -> MutexGuard<'_, dyn Surface + 'static> {
    util::lock(handle)
}

/// What a [`MemorySurface`] currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SurfaceContent {
    #[default]
    Blank,
    Drawing(Drawing),
    Message(String),
    Error {
        headline: String,
        detail: Option<String>,
    },
}

/// In-memory surface that records what was drawn.
///
/// Useful for hosts that post-process renderer output, and for tests: it
/// can pretend a backend is missing or that drawing fails.
#[derive(Debug, Default)]
pub struct MemorySurface {
    content: SurfaceContent,
    unsupported: HashSet<DrawingKind>,
    failure: Option<String>,
    mounts: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared handle type renderers expect.
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// A surface whose backend for `kind` is not loaded.
    pub fn without(mut self, kind: DrawingKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// Make every subsequent mount fail with `message`, or succeed again
    /// with `None`.
    pub fn set_failure(&mut self, message: Option<&str>) {
        self.failure = message.map(str::to_string);
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        match &self.content {
            SurfaceContent::Drawing(drawing) => Some(drawing),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content == SurfaceContent::Blank
    }

    /// Number of successful mounts so far.
    pub fn mount_count(&self) -> usize {
        self.mounts
    }
}

impl Surface for MemorySurface {
    fn supports(&self, kind: DrawingKind) -> bool {
        !self.unsupported.contains(&kind)
    }

    fn mount(&mut self, drawing: Drawing) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::Surface(message.clone()));
        }
        if !self.supports(drawing.kind()) {
            return Err(Error::Surface(format!("{:?} drawings are not supported", drawing.kind())));
        }
        self.content = SurfaceContent::Drawing(drawing);
        self.mounts += 1;
        Ok(())
    }

    fn show_message(&mut self, message: &str) {
        self.content = SurfaceContent::Message(message.to_string());
    }

    fn show_error(&mut self, headline: &str, detail: Option<&str>) {
        self.content = SurfaceContent::Error {
            headline: headline.to_string(),
            detail: detail.map(str::to_string),
        };
    }

    fn clear(&mut self) {
        self.content = SurfaceContent::Blank;
    }
}

/// Surface that prints drawings as text to any writer (stdout in the CLI).
pub struct WriterSurface<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub type StdoutSurface = WriterSurface<std::io::Stdout>;

impl StdoutSurface {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Surface for WriterSurface<W> {
    fn supports(&self, _kind: DrawingKind) -> bool {
        true
    }

    fn mount(&mut self, drawing: Drawing) -> Result<()> {
        writeln!(self.writer, "{}", drawing)?;
        self.writer.flush()?;
        Ok(())
    }

    fn show_message(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{}", message);
    }

    fn show_error(&mut self, headline: &str, detail: Option<&str>) {
        let _ = match detail {
            Some(detail) => writeln!(self.writer, "{}\n{}", headline, detail),
            None => writeln!(self.writer, "{}", headline),
        };
    }

    // Printed output cannot be taken back.
    fn clear(&mut self) {}
}
