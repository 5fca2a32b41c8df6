/// Fatal start-up failures. There is no recovery path: without a surface
/// and a device nothing can be drawn.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("could not create render surface: {0}")]
    SurfaceCreation(String),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("could not create GPU device: {0}")]
    DeviceRequest(String),
}

/// A single frame could not be drawn. Never fatal to the frame loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("surface unavailable: {0}")]
    Surface(String),
    #[error("backend error: {0}")]
    Backend(String),
}
