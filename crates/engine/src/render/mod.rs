//! Drawing targets and the surfaces behind them.
//!
//! Draw calls travel as [`DrawCommand`] values. A [`DrawTarget`] accepts them
//! in its own coordinate space: a [`Screen`] forwards them to its [`Surface`]
//! unchanged, a [`ScreenSection`] clamps them to its bounds first, and a
//! [`DrawingSequence`] records them for later replay.

mod command;
mod effects;
mod font;
mod raster;
mod recording;
mod section;
mod sequence;
mod surface;
mod target;

pub use command::{
    CircleArgs, ClearArgs, DrawCommand, GraphicArgs, LineArgs, RectArgs, TextArgs, DEFAULT_FONT,
};
pub use effects::{Effect, EffectPipeline, FnEffect, ScreenShake};
pub use raster::RasterSurface;
pub use recording::{RecordingSurface, SurfaceCall};
pub use section::ScreenSection;
pub use sequence::DrawingSequence;
pub use surface::Surface;
pub use target::{Draw, DrawTarget, Screen};
