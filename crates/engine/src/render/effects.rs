use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::rngs::ThreadRng;
use rand::Rng;

use super::DrawCommand;

/// Transform applied to every draw command just before it is forwarded.
///
/// `apply` must not change the effect's own state; anything that evolves over
/// time advances in `tick`, which the frame driver calls once per frame.
pub trait Effect {
    fn apply(&self, command: DrawCommand) -> DrawCommand;

    fn tick(&mut self) {}
}

/// Lets the driver keep a handle to an effect that lives in a pipeline.
/// While the handle is mutably borrowed the effect passes commands through.
impl<E: Effect + ?Sized> Effect for Rc<RefCell<E>> {
    fn apply(&self, command: DrawCommand) -> DrawCommand {
        match self.try_borrow() {
            Ok(effect) => effect.apply(command),
            Err(_) => command,
        }
    }

    fn tick(&mut self) {
        if let Ok(mut effect) = self.try_borrow_mut() {
            effect.tick();
        }
    }
}

/// Stateless effect from a closure.
pub struct FnEffect<F>(pub F);

impl<F> Effect for FnEffect<F>
where
    F: Fn(DrawCommand) -> DrawCommand,
{
    fn apply(&self, command: DrawCommand) -> DrawCommand {
        (self.0)(command)
    }
}

/// Ordered effects. Order matters: each effect sees the output of the
/// previous one.
#[derive(Default)]
pub struct EffectPipeline {
    effects: Vec<Box<dyn Effect>>,
}

impl EffectPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: impl Effect + 'static) {
        self.effects.push(Box::new(effect));
    }

    pub fn push_fn(&mut self, effect: impl Fn(DrawCommand) -> DrawCommand + 'static) {
        self.push(FnEffect(effect));
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn apply(&self, command: DrawCommand) -> DrawCommand {
        self.effects
            .iter()
            .fold(command, |command, effect| effect.apply(command))
    }

    pub fn tick(&mut self) {
        for effect in &mut self.effects {
            effect.tick();
        }
    }
}

impl fmt::Debug for EffectPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectPipeline")
            .field("effects", &self.effects.len())
            .finish()
    }
}

/// Random jitter whose strength decays geometrically every tick.
///
/// The offset is rolled once per tick, so every command drawn during one
/// frame moves by the same amount.
#[derive(Debug)]
pub struct ScreenShake<R = ThreadRng> {
    magnitude: f32,
    decay: f32,
    offset: (f32, f32),
    rng: R,
}

const SHAKE_CUTOFF: f32 = 0.05;

impl ScreenShake<ThreadRng> {
    pub fn new(decay: f32) -> Self {
        Self::with_rng(decay, rand::rng())
    }
}

impl<R: Rng> ScreenShake<R> {
    pub fn with_rng(decay: f32, rng: R) -> Self {
        Self {
            magnitude: 0.0,
            decay: decay.clamp(0.0, 1.0),
            offset: (0.0, 0.0),
            rng,
        }
    }

    /// Raises the current strength to `magnitude` unless it is already stronger.
    pub fn kick(&mut self, magnitude: f32) {
        if magnitude.is_finite() && magnitude > self.magnitude {
            self.magnitude = magnitude;
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }
}

impl<R: Rng> Effect for ScreenShake<R> {
    fn apply(&self, command: DrawCommand) -> DrawCommand {
        if self.offset == (0.0, 0.0) {
            return command;
        }
        command.translated(self.offset.0, self.offset.1)
    }

    fn tick(&mut self) {
        if self.magnitude <= SHAKE_CUTOFF {
            self.magnitude = 0.0;
            self.offset = (0.0, 0.0);
            return;
        }
        let m = self.magnitude;
        self.offset = (
            self.rng.random_range(-m..=m),
            self.rng.random_range(-m..=m),
        );
        self.magnitude *= self.decay;
    }
}
