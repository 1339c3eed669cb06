use crate::plog_debug;
use crate::render::flag::{RendererFlag, RendererKind};
use crate::render::mermaid::MermaidRenderer;
use crate::render::surface::SurfaceHandle;
use crate::render::timeline::TimelineRenderer;
use crate::render::RendererStrategy;

/// Maps a renderer selection to a fresh strategy instance.
///
/// Nothing is cached: every call constructs a new renderer bound to the
/// given surface. The caller owns it and should `clear` it before
/// dropping it.
pub struct RendererFactory;

impl RendererFactory {
    pub fn create(surface: SurfaceHandle, kind: RendererKind) -> Box<dyn RendererStrategy> {
        plog_debug!("factory: creating {} renderer", kind);
        match kind {
            RendererKind::Mermaid => Box::new(MermaidRenderer::new(surface)),
            RendererKind::Timeline => Box::new(TimelineRenderer::new(surface)),
        }
    }

    pub fn from_flag(surface: SurfaceHandle, flag: &RendererFlag) -> Box<dyn RendererStrategy> {
        Self::create(surface, flag.get())
    }
}
