use shaderbox_assets::AssetEvent;
use shaderbox_frame::Animation;
use shaderbox_params::{ParamError, ParameterPanel};
use shaderbox_scene::{RenderBackend, Scene, SceneHost};
use std::str::FromStr;

use crate::lamps::Lamps;
use crate::terrain::Terrain;
use crate::wave_cube::WaveCube;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DemoError {
    #[error("unknown demo {0:?} (expected wave-cube, lamps or terrain)")]
    UnknownDemo(String),
    #[error(transparent)]
    Param(#[from] ParamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    WaveCube,
    Lamps,
    Terrain,
}

impl DemoKind {
    pub const ALL: [DemoKind; 3] = [Self::WaveCube, Self::Lamps, Self::Terrain];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WaveCube => "wave-cube",
            Self::Lamps => "lamps",
            Self::Terrain => "terrain",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::WaveCube => "Wave Cube",
            Self::Lamps => "Lamps",
            Self::Terrain => "Terrain",
        }
    }
}

impl std::fmt::Display for DemoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoKind {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| DemoError::UnknownDemo(s.to_string()))
    }
}

/// One of the demo scenes.
#[derive(Debug)]
pub enum Demo {
    WaveCube(WaveCube),
    Lamps(Lamps),
    Terrain(Terrain),
}

impl Demo {
    pub fn new(kind: DemoKind) -> Self {
        match kind {
            DemoKind::WaveCube => Self::WaveCube(WaveCube::new()),
            DemoKind::Lamps => Self::Lamps(Lamps::new()),
            DemoKind::Terrain => Self::Terrain(Terrain::new()),
        }
    }

    pub fn kind(&self) -> DemoKind {
        match self {
            Self::WaveCube(_) => DemoKind::WaveCube,
            Self::Lamps(_) => DemoKind::Lamps,
            Self::Terrain(_) => DemoKind::Terrain,
        }
    }

    /// Builds the initial scene and panel, requests assets, and returns the
    /// per-frame animations.
    pub fn setup<R: RenderBackend>(
        &mut self,
        host: &mut SceneHost<R>,
        panel: &mut ParameterPanel<Scene>,
    ) -> Result<Vec<Animation>, DemoError> {
        let _span = tracing::info_span!("demo_setup", demo = %self.kind()).entered();
        match self {
            Self::WaveCube(d) => d.setup(host, panel),
            Self::Lamps(d) => d.setup(host, panel),
            Self::Terrain(d) => d.setup(host, panel),
        }
    }

    /// Applies a drained asset completion.
    pub fn on_asset<R: RenderBackend>(
        &mut self,
        event: &AssetEvent,
        host: &mut SceneHost<R>,
        panel: &mut ParameterPanel<Scene>,
    ) {
        match self {
            Self::WaveCube(d) => d.on_asset(event, host.scene_mut()),
            Self::Lamps(d) => d.on_asset(event, host.scene_mut(), panel),
            Self::Terrain(d) => d.on_asset(event, host.scene_mut()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_by_name() {
        for kind in DemoKind::ALL {
            assert_eq!(kind.name().parse::<DemoKind>().unwrap(), kind);
        }
        assert!(matches!(
            "teapot".parse::<DemoKind>(),
            Err(DemoError::UnknownDemo(_))
        ));
    }

    #[test]
    fn demo_reports_its_kind() {
        for kind in DemoKind::ALL {
            assert_eq!(Demo::new(kind).kind(), kind);
        }
    }
}
