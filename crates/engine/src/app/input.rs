use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    Quit,
}

impl InputAction {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Input state seen by one simulation tick. Press edges are reported to
/// exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    held: u8,
    quit_requested: bool,
    zoom_delta_steps: i32,
    shake_pressed: bool,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    window_size: (u32, u32),
}

impl InputSnapshot {
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held & action.bit() != 0
    }

    /// Pan direction in world axes (y up), each component in `-1..=1`.
    pub fn pan_direction(&self) -> Vec2 {
        let axis = |positive, negative| {
            f32::from(u8::from(self.is_down(positive))) - f32::from(u8::from(self.is_down(negative)))
        };
        Vec2::new(
            axis(InputAction::PanRight, InputAction::PanLeft),
            axis(InputAction::PanUp, InputAction::PanDown),
        )
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn shake_pressed(&self) -> bool {
        self.shake_pressed
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}

enum Binding {
    Hold(InputAction),
    Zoom(i32),
    Shake,
}

fn binding_for(code: KeyCode) -> Option<Binding> {
    let binding = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Binding::Hold(InputAction::PanUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Binding::Hold(InputAction::PanDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Binding::Hold(InputAction::PanLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Binding::Hold(InputAction::PanRight),
        KeyCode::Escape => Binding::Hold(InputAction::Quit),
        KeyCode::Equal | KeyCode::NumpadAdd => Binding::Zoom(1),
        KeyCode::Minus | KeyCode::NumpadSubtract => Binding::Zoom(-1),
        KeyCode::Space => Binding::Shake,
        _ => return None,
    };
    Some(binding)
}

/// Folds window events into the next [`InputSnapshot`]. Held keys persist
/// across ticks; presses, wheel steps and clicks are drained by each snapshot.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    pending: InputSnapshot,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        let mut collector = Self::default();
        collector.set_window_size(window_width, window_height);
        collector
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.pending.quit_requested
    }

    pub(crate) fn request_quit(&mut self) {
        self.pending.quit_requested = true;
    }

    /// Key repeats never count as fresh presses.
    pub(crate) fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        let pressed = state == ElementState::Pressed;
        let fresh_press = pressed && !repeat;
        match binding_for(code) {
            Some(Binding::Hold(action)) => {
                if pressed {
                    self.pending.held |= action.bit();
                } else {
                    self.pending.held &= !action.bit();
                }
                if action == InputAction::Quit && pressed {
                    self.request_quit();
                }
            }
            Some(Binding::Zoom(step)) if fresh_press => {
                self.pending.zoom_delta_steps = self.pending.zoom_delta_steps.saturating_add(step);
            }
            Some(Binding::Shake) if fresh_press => self.pending.shake_pressed = true,
            _ => {}
        }
    }

    pub(crate) fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left && state == ElementState::Pressed {
            self.pending.left_click_pressed = true;
        }
    }

    pub(crate) fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
            MouseScrollDelta::PixelDelta(position) => {
                i32::from(position.y > 0.0) - i32::from(position.y < 0.0)
            }
        };
        self.pending.zoom_delta_steps = self.pending.zoom_delta_steps.saturating_add(steps);
    }

    pub(crate) fn set_cursor(&mut self, cursor: Option<Vec2>) {
        self.pending.cursor_position_px = cursor;
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.pending.window_size = (width, height);
    }

    pub(crate) fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = self.pending;
        self.pending.zoom_delta_steps = 0;
        self.pending.shake_pressed = false;
        self.pending.left_click_pressed = false;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;

    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(code, ElementState::Pressed, false);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(code, ElementState::Released, false);
    }

    #[test]
    fn default_snapshot_is_idle() {
        let snapshot = InputSnapshot::default();
        assert_eq!(snapshot.pan_direction(), Vec2::ZERO);
        assert!(!snapshot.quit_requested());
        assert!(!snapshot.shake_pressed());
        assert_eq!(snapshot.window_size(), (0, 0));
    }

    #[test]
    fn held_pan_keys_persist_until_released() {
        let mut input = InputCollector::new(640, 480);
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);

        let held = input.snapshot_for_tick();
        assert_eq!(held.pan_direction(), Vec2::new(-1.0, 1.0));
        assert!(input.snapshot_for_tick().is_down(InputAction::PanUp));

        release(&mut input, KeyCode::KeyW);
        let released = input.snapshot_for_tick();
        assert!(!released.is_down(InputAction::PanUp));
        assert!(released.is_down(InputAction::PanLeft));
    }

    #[test]
    fn opposing_pan_keys_cancel() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyA);
        press(&mut input, KeyCode::KeyD);
        press(&mut input, KeyCode::ArrowUp);

        assert_eq!(input.snapshot_for_tick().pan_direction(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn repeats_do_not_add_zoom_steps_or_shakes() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Equal);
        input.handle_key(KeyCode::Equal, ElementState::Pressed, true);
        input.handle_key(KeyCode::Space, ElementState::Pressed, true);
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 1);

        press(&mut input, KeyCode::Minus);
        press(&mut input, KeyCode::Space);
        let snapshot = input.snapshot_for_tick();
        assert_eq!(snapshot.zoom_delta_steps(), -1);
        assert!(snapshot.shake_pressed());

        let idle = input.snapshot_for_tick();
        assert_eq!(idle.zoom_delta_steps(), 0);
        assert!(!idle.shake_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);
        assert!(input.quit_requested());
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.quit_requested());
        assert!(snapshot.is_down(InputAction::Quit));
    }

    #[test]
    fn left_click_reaches_one_tick_with_the_cursor() {
        let mut input = InputCollector::new(640, 480);
        input.set_cursor(Some(Vec2::new(100.0, 200.0)));
        input.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_button(MouseButton::Right, ElementState::Pressed);

        let first = input.snapshot_for_tick();
        assert!(first.left_click_pressed());
        assert_eq!(first.cursor_position_px(), Some(Vec2::new(100.0, 200.0)));
        assert_eq!(first.window_size(), (640, 480));
        assert!(!input.snapshot_for_tick().left_click_pressed());

        input.set_cursor(None);
        assert_eq!(input.snapshot_for_tick().cursor_position_px(), None);
    }

    #[test]
    fn wheel_lines_round_and_pixels_count_as_one_step() {
        let mut input = InputCollector::default();
        input.handle_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_wheel(MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), -1);

        input.handle_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 7.5)));
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 1);

        input.handle_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 0.0)));
        assert_eq!(input.snapshot_for_tick().zoom_delta_steps(), 0);
    }
}
