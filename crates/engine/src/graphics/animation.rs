use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::warn;

use super::{GraphicError, GridSplit, ImageRegion};

pub type SharedAnimation = Rc<RefCell<Animation>>;
pub type SharedController = Rc<RefCell<AnimationController>>;

/// Frame sequence played at a fixed rate. Time is advanced externally.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<ImageRegion>,
    frame_duration_ms: f32,
    timer_ms: f32,
    current_frame: usize,
}

impl Animation {
    pub fn new(frames: Vec<ImageRegion>, fps: f32) -> Result<Self, GraphicError> {
        if frames.is_empty() {
            warn!("animation_without_frames");
            return Err(GraphicError::NoFrames);
        }
        if !(fps.is_finite() && fps > 0.0) {
            warn!(fps, "animation_fps_rejected");
            return Err(GraphicError::InvalidFps(fps));
        }
        Ok(Self {
            frames,
            frame_duration_ms: 1000.0 / fps,
            timer_ms: 0.0,
            current_frame: 0,
        })
    }

    pub fn from_grid(sheet: &ImageRegion, split: GridSplit, fps: f32) -> Result<Self, GraphicError> {
        let frames = sheet.split_into_grid(split);
        if frames.is_empty() {
            warn!(width = sheet.width(), height = sheet.height(), "animation_grid_empty");
            return Err(GraphicError::EmptyGrid);
        }
        Self::new(frames, fps)
    }

    /// Plays `a` then `b` as one animation.
    pub fn join(a: &Animation, b: &Animation, fps: f32) -> Result<Self, GraphicError> {
        let frames = a.frames.iter().chain(b.frames.iter()).cloned().collect();
        Self::new(frames, fps)
    }

    pub fn frames(&self) -> &[ImageRegion] {
        &self.frames
    }

    pub fn fps(&self) -> f32 {
        1000.0 / self.frame_duration_ms
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    pub fn current_frame(&self) -> &ImageRegion {
        &self.frames[self.current_frame]
    }

    pub fn reset(&mut self) {
        self.timer_ms = 0.0;
        self.current_frame = 0;
    }

    /// Advances by `delta_ms`, skipping as many whole frames as elapsed.
    /// Returns `true` when playback wrapped past the last frame.
    pub fn animate(&mut self, delta_ms: f32) -> bool {
        if !(delta_ms.is_finite() && delta_ms > 0.0) {
            return false;
        }
        self.timer_ms += delta_ms;
        let frames_to_add = (self.timer_ms / self.frame_duration_ms).floor() as usize;
        let advanced = self.current_frame + frames_to_add;
        let has_looped = advanced >= self.frames.len();
        self.current_frame = advanced % self.frames.len();
        self.timer_ms -= frames_to_add as f32 * self.frame_duration_ms;
        has_looped
    }
}

/// Plays one animation at a time and moves on to the next queued one each
/// time the current one loops.
#[derive(Debug, Default)]
pub struct AnimationController {
    queue: VecDeque<SharedAnimation>,
    current: Option<SharedAnimation>,
}

impl AnimationController {
    pub fn animate(&mut self, delta_ms: f32) {
        let Some(current) = &self.current else {
            return;
        };
        let looped = current.borrow_mut().animate(delta_ms);
        if looped {
            if let Some(next) = self.queue.pop_front() {
                self.current = Some(next);
            }
        }
    }

    /// Switches immediately and forgets anything queued.
    pub fn run_animation(&mut self, animation: SharedAnimation) {
        self.queue.clear();
        self.current = Some(animation);
    }

    /// Replaces the queue. The current animation keeps playing until it loops.
    pub fn run_animations(&mut self, animations: impl IntoIterator<Item = SharedAnimation>) {
        self.queue.clear();
        self.queue_animations(animations);
    }

    pub fn queue_animation(&mut self, animation: SharedAnimation) {
        if self.current.is_none() {
            self.current = Some(animation);
            return;
        }
        self.queue.push_back(animation);
    }

    pub fn queue_animations(&mut self, animations: impl IntoIterator<Item = SharedAnimation>) {
        for animation in animations {
            self.queue_animation(animation);
        }
    }

    pub fn current_animation(&self) -> Option<&SharedAnimation> {
        self.current.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn current_frame(&self) -> Option<ImageRegion> {
        let current = self.current.as_ref()?;
        let animation = current.try_borrow().ok()?;
        Some(animation.current_frame().clone())
    }
}
