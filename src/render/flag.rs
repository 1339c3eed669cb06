//! Renderer selection switch.
//!
//! The hosting application owns a [`RendererFlag`] and is the only writer;
//! the factory just reads the selected [`RendererKind`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{plog, plog_warn};

/// Known renderer strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Static Mermaid gantt diagram.
    #[default]
    Mermaid,
    /// Interactive timeline with date editing. Also accepted as `frappe`.
    #[serde(alias = "frappe")]
    Timeline,
}

impl RendererKind {
    pub const ALL: [RendererKind; 2] = [RendererKind::Mermaid, RendererKind::Timeline];

    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Mermaid => "mermaid",
            RendererKind::Timeline => "timeline",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            RendererKind::Mermaid => &[],
            RendererKind::Timeline => &["frappe"],
        }
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RendererKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted || kind.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| Error::UnknownRenderer(s.to_string()))
    }
}

/// The currently selected renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererFlag {
    current: RendererKind,
}

impl RendererFlag {
    pub fn new(initial: RendererKind) -> Self {
        Self { current: initial }
    }

    pub fn get(&self) -> RendererKind {
        self.current
    }

    /// Select a renderer by name.
    ///
    /// An unrecognized name is rejected with a warning and the previous
    /// selection is kept.
    pub fn set(&mut self, name: &str) -> Result<RendererKind> {
        match name.parse::<RendererKind>() {
            Ok(kind) => {
                self.current = kind;
                plog!("renderer set to: {}", kind);
                Ok(kind)
            }
            Err(err) => {
                plog_warn!("Invalid renderer: {:?}, keeping {}", name, self.current);
                Err(err)
            }
        }
    }
}
