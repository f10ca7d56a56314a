use std::rc::Rc;

use super::{DrawCommand, DrawTarget};

/// Deferred draw list.
///
/// Recording never touches a surface; [`DrawingSequence::replay`] forwards the
/// recorded commands in order to any target. Clones share the recorded list
/// until one of them records again, so a clone taken at the end of a frame is
/// a cheap snapshot of that frame.
#[derive(Debug, Clone)]
pub struct DrawingSequence {
    width: f32,
    height: f32,
    queue: Rc<Vec<DrawCommand>>,
}

impl DrawingSequence {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            queue: Rc::new(Vec::new()),
        }
    }

    /// Sequence with the same extent as `target`, for recording draws meant
    /// for it.
    pub fn for_target<T: DrawTarget + ?Sized>(target: &T) -> Self {
        Self::new(target.width(), target.height())
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn shares_commands_with(&self, other: &DrawingSequence) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }

    pub fn replay<T: DrawTarget + ?Sized>(&self, target: &mut T) {
        for command in self.queue.iter() {
            target.submit(command.clone());
        }
    }
}

impl DrawTarget for DrawingSequence {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    /// `Clear` starts a fresh list before it is recorded, detaching this
    /// sequence from any snapshot.
    fn submit(&mut self, command: DrawCommand) {
        if matches!(command, DrawCommand::Clear(_)) {
            self.queue = Rc::new(Vec::new());
        }
        Rc::make_mut(&mut self.queue).push(command);
    }
}
