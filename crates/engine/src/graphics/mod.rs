mod animation;
mod image_region;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

pub use animation::{Animation, AnimationController, SharedAnimation, SharedController};
pub use image_region::{GridSplit, ImageRegion};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GraphicError {
    #[error("an animation needs at least one frame")]
    NoFrames,
    #[error("animation fps must be positive and finite, got {0}")]
    InvalidFps(f32),
    #[error("grid split produced no frames")]
    EmptyGrid,
}

/// Anything that resolves to one image region at draw time.
#[derive(Debug, Clone)]
pub enum Graphic {
    Image(ImageRegion),
    Animation(SharedAnimation),
    Controller(SharedController),
}

impl Graphic {
    pub fn animation(animation: Animation) -> Self {
        Graphic::Animation(Rc::new(RefCell::new(animation)))
    }

    pub fn controller(controller: AnimationController) -> Self {
        Graphic::Controller(Rc::new(RefCell::new(controller)))
    }

    /// The region to blit right now. A controller with nothing playing, or an
    /// animation that is mutably borrowed elsewhere, resolves to `None`.
    pub fn current_frame(&self) -> Option<ImageRegion> {
        match self {
            Graphic::Image(region) => Some(region.clone()),
            Graphic::Animation(animation) => animation
                .try_borrow()
                .ok()
                .map(|animation| animation.current_frame().clone()),
            Graphic::Controller(controller) => controller.try_borrow().ok()?.current_frame(),
        }
    }
}

impl PartialEq for Graphic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Graphic::Image(a), Graphic::Image(b)) => a == b,
            (Graphic::Animation(a), Graphic::Animation(b)) => Rc::ptr_eq(a, b),
            (Graphic::Controller(a), Graphic::Controller(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<ImageRegion> for Graphic {
    fn from(region: ImageRegion) -> Self {
        Graphic::Image(region)
    }
}

impl From<SharedAnimation> for Graphic {
    fn from(animation: SharedAnimation) -> Self {
        Graphic::Animation(animation)
    }
}

impl From<SharedController> for Graphic {
    fn from(controller: SharedController) -> Self {
        Graphic::Controller(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Rect};

    #[test]
    fn image_graphic_resolves_to_itself() {
        let region = ImageRegion::solid(Color::RED, 4, 4);
        let graphic = Graphic::from(region.clone());
        assert_eq!(graphic.current_frame(), Some(region));
    }

    #[test]
    fn animation_graphic_follows_the_shared_animation() {
        let sheet = ImageRegion::solid(Color::BLUE, 4, 2);
        let frames = vec![sheet.area(0.0, 0.0, 2.0, 2.0), sheet.area(2.0, 0.0, 2.0, 2.0)];
        let shared = Rc::new(RefCell::new(Animation::new(frames, 10.0).expect("animation")));
        let graphic = Graphic::from(Rc::clone(&shared));

        assert_eq!(
            graphic.current_frame().map(|frame| frame.crop()),
            Some(Rect::new(0.0, 0.0, 2.0, 2.0))
        );
        shared.borrow_mut().animate(100.0);
        assert_eq!(
            graphic.current_frame().map(|frame| frame.crop()),
            Some(Rect::new(2.0, 0.0, 2.0, 2.0))
        );
    }

    #[test]
    fn idle_controller_resolves_to_nothing() {
        let graphic = Graphic::controller(AnimationController::default());
        assert_eq!(graphic.current_frame(), None);
    }

    #[test]
    fn shared_graphics_compare_by_identity() {
        let animation = Animation::new(vec![ImageRegion::solid(Color::RED, 1, 1)], 1.0)
            .expect("animation");
        let a = Graphic::animation(animation.clone());
        let b = Graphic::animation(animation);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
