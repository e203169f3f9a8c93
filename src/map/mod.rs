mod geometry;
mod projection;
mod renderer;

pub use projection::Viewport;
pub use renderer::{ChoroplethRenderer, ColorScale, MapLayers, Ring, CLASS_COUNT};
