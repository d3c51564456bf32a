//! Build tasks: the named steps of the pipeline and how they are run.
//!
//! - `graph` - ordering constraints between tasks
//! - `context` - per-build state (config, manifest, reload channel)
//! - `run` - phase-by-phase execution on the rayon pool

mod context;
mod graph;
mod run;

pub use context::BuildContext;
pub use graph::TaskGraph;
pub use run::{BuildSummary, TaskReport, run_graph};

use crate::asset::AssetKind;

/// Named pipeline step.
///
/// Declaration order is the display order within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Clean,
    Html,
    Css,
    Js,
    Images,
    Fonts,
    Watch,
    Serve,
}

impl Task {
    /// The per-asset-type transforms.
    pub const TRANSFORMS: [Self; 5] = [Self::Html, Self::Css, Self::Js, Self::Images, Self::Fonts];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Watch => "watch",
            Self::Serve => "serve",
            Self::Html => AssetKind::Markup.name(),
            Self::Css => AssetKind::Stylesheet.name(),
            Self::Js => AssetKind::Script.name(),
            Self::Images => AssetKind::Image.name(),
            Self::Fonts => AssetKind::Font.name(),
        }
    }

    /// Asset kind handled by a transform task.
    pub const fn asset_kind(self) -> Option<AssetKind> {
        match self {
            Self::Html => Some(AssetKind::Markup),
            Self::Css => Some(AssetKind::Stylesheet),
            Self::Js => Some(AssetKind::Script),
            Self::Images => Some(AssetKind::Image),
            Self::Fonts => Some(AssetKind::Font),
            Self::Clean | Self::Watch | Self::Serve => None,
        }
    }

    pub const fn for_kind(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Markup => Self::Html,
            AssetKind::Stylesheet => Self::Css,
            AssetKind::Script => Self::Js,
            AssetKind::Image => Self::Images,
            AssetKind::Font => Self::Fonts,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_kinds_round_trip() {
        for task in Task::TRANSFORMS {
            let kind = task.asset_kind().unwrap();
            assert_eq!(Task::for_kind(kind), task);
            assert_eq!(task.name(), kind.name());
        }
        assert!(Task::Clean.asset_kind().is_none());
    }
}
