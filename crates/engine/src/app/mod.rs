//! Windowed frame loop: fixed-step updates, one software-rendered frame per
//! redraw, copied into a `pixels` buffer.

mod clock;
mod input;
mod loop_runner;
mod metrics;
mod presenter;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, FrameScene, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
