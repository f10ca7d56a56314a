use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowBuilder};

use crate::geometry::Vec2;
use crate::render::{RasterSurface, Screen};

use super::clock::FrameClock;
use super::input::InputCollector;
use super::metrics::MetricsAccumulator;
use super::presenter::Presenter;
use super::{InputSnapshot, LoopMetricsSnapshot};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// `None` or `Some(0)` leaves rendering uncapped.
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "pixelcam".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel buffer: {0}")]
    CreatePixels(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// A scene driven by [`run_app`]: updated at a fixed rate, rendered once per
/// redraw into the window's screen.
pub trait FrameScene {
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot);

    fn render(&mut self, screen: &mut Screen<RasterSurface>, metrics: &LoopMetricsSnapshot);

    fn shutdown(&mut self) {}
}

/// Opens a window and drives `scene` until the window closes or Escape is
/// pressed.
pub fn run_app(config: LoopConfig, scene: Box<dyn FrameScene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window_width),
                f64::from(config.window_height),
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let presenter = Presenter::new(Arc::clone(&window)).map_err(AppError::CreatePixels)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = LoopState::new(&config, window, presenter, scene);
    event_loop
        .run(move |event, target| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                state.on_window_event(event, target);
            }
            Event::AboutToWait => state.window.request_redraw(),
            Event::LoopExiting => {
                state.scene.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

struct LoopState {
    window: Arc<Window>,
    presenter: Presenter,
    scene: Box<dyn FrameScene>,
    clock: FrameClock,
    input: InputCollector,
    metrics: MetricsAccumulator,
}

impl LoopState {
    fn new(
        config: &LoopConfig,
        window: Arc<Window>,
        presenter: Presenter,
        scene: Box<dyn FrameScene>,
    ) -> Self {
        let clock = FrameClock::new(
            config.target_tps,
            config.max_frame_delta,
            config.max_ticks_per_frame,
            config.max_render_fps,
            Instant::now(),
        );
        let metrics_interval = if config.metrics_log_interval.is_zero() {
            Duration::from_secs(1)
        } else {
            config.metrics_log_interval
        };
        let size = window.inner_size();
        info!(
            tick_seconds = clock.tick_seconds(),
            max_ticks_per_frame = clock.max_ticks(),
            render_cap_ms = clock.render_cap().map(|cap| cap.as_millis() as u64),
            metrics_interval_ms = metrics_interval.as_millis() as u64,
            window_width = size.width,
            window_height = size.height,
            "loop_config"
        );
        Self {
            window,
            presenter,
            scene,
            clock,
            input: InputCollector::new(size.width, size.height),
            metrics: MetricsAccumulator::new(metrics_interval),
        }
    }

    fn on_window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                self.input.request_quit();
                info!(reason = "window_close", "shutdown_requested");
                target.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.input.set_window_size(size.width, size.height);
                if let Err(error) = self.presenter.resize(size.width, size.height) {
                    warn!(error = %error, "presenter_resize_failed");
                    target.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                self.input.set_cursor(Some(cursor));
            }
            WindowEvent::CursorLeft { .. } => self.input.set_cursor(None),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => self.input.handle_wheel(delta),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.handle_key(code, event.state, event.repeat);
                }
                if self.input.quit_requested() {
                    info!(reason = "escape_key", "shutdown_requested");
                    target.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(error) = self.redraw() {
                    warn!(error = %error, "present_failed");
                    target.exit();
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self) -> Result<(), PixelsError> {
        let now = Instant::now();
        let advance = self.clock.advance(now);
        let tick_seconds = self.clock.tick_seconds();
        for _ in 0..advance.ticks {
            let snapshot = self.input.snapshot_for_tick();
            self.scene.update(tick_seconds, &snapshot);
            self.metrics.record_tick();
        }
        if !advance.dropped.is_zero() {
            warn!(
                dropped_backlog_ms = advance.dropped.as_millis() as u64,
                max_ticks_per_frame = self.clock.max_ticks(),
                "sim_clamp_triggered"
            );
        }

        let delay = self.clock.present_delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let render_start = Instant::now();
        let latest = self.metrics.latest();
        self.scene.render(self.presenter.screen_mut(), &latest);
        let presented = self.presenter.present();
        let presented_at = Instant::now();
        self.clock.mark_presented(presented_at);
        self.metrics.record_frame(
            advance.frame_dt,
            presented_at.saturating_duration_since(render_start),
        );

        if let Some(snapshot) = self.metrics.maybe_snapshot(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                render_time_ms = snapshot.render_time_ms,
                "loop_metrics"
            );
        }
        presented
    }
}
