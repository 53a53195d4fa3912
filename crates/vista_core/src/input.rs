use std::collections::HashSet;

// winit 0.30 moved its key codes under `winit::keyboard`; re-export them so
// callers don't need a direct winit dependency.
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Wheel units per notch of a line-based mouse wheel.
pub const WHEEL_NOTCH: f32 = 120.0;

/// Keyboard and mouse state accumulated between two frames.
///
/// The event loop feeds winit events in; the frame update drains the
/// accumulated drag and wheel movement and queries key edges.  Call
/// [`InputState::end_frame`] once the frame has consumed everything.
#[derive(Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    cursor: Option<(f64, f64)>,
    /// Cursor movement while the left button is held, since the last drain.
    drag: (f32, f32),
    /// Wheel movement in wheel units, since the last drain.
    wheel: f32,
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            // key repeat does not count as a new press
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// `true` only in the frame the key went down.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Records a new cursor position (window coordinates).  Movement counts
    /// towards the drag only while the left button is held.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        if let Some((px, py)) = self.cursor {
            if self.is_button_down(MouseButton::Left) {
                self.drag.0 += (x - px) as f32;
                self.drag.1 += (y - py) as f32;
            }
        }
        self.cursor = Some((x, y));
    }

    /// Forgets the cursor position so re-entry does not produce a jump.
    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Adds wheel movement in wheel units (one notch = [`WHEEL_NOTCH`]).
    pub fn add_wheel(&mut self, units: f32) {
        self.wheel += units;
    }

    /// Drains the accumulated drag in pixels.
    pub fn take_drag(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.drag)
    }

    /// Drains the accumulated wheel movement.
    pub fn take_wheel(&mut self) -> f32 {
        std::mem::take(&mut self.wheel)
    }

    /// Clears per-frame edges.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_edges() {
        let mut state = InputState::new();
        assert!(!state.is_key_down(KeyCode::KeyC));
        state.update_key(KeyCode::KeyC, true);
        assert!(state.is_key_down(KeyCode::KeyC));
        assert!(state.just_pressed(KeyCode::KeyC));

        state.end_frame();
        // auto-repeat while held
        state.update_key(KeyCode::KeyC, true);
        assert!(!state.just_pressed(KeyCode::KeyC));

        state.update_key(KeyCode::KeyC, false);
        assert!(!state.is_key_down(KeyCode::KeyC));
    }

    #[test]
    fn drag_only_while_left_button_held() {
        let mut state = InputState::new();
        state.set_cursor(10.0, 20.0);
        state.set_cursor(30.0, 20.0);
        assert_eq!(state.take_drag(), (0.0, 0.0));

        state.update_mouse_button(MouseButton::Left, true);
        state.set_cursor(35.0, 25.0);
        state.set_cursor(40.0, 15.0);
        assert_eq!(state.take_drag(), (10.0, -5.0));
        // drained
        assert_eq!(state.take_drag(), (0.0, 0.0));

        state.update_mouse_button(MouseButton::Left, false);
        state.set_cursor(0.0, 0.0);
        assert_eq!(state.take_drag(), (0.0, 0.0));
        assert_eq!(state.cursor(), Some((0.0, 0.0)));
    }

    #[test]
    fn leaving_the_window_resets_the_anchor() {
        let mut state = InputState::new();
        state.update_mouse_button(MouseButton::Left, true);
        state.set_cursor(10.0, 10.0);
        state.cursor_left();
        state.set_cursor(500.0, 500.0);
        assert_eq!(state.take_drag(), (0.0, 0.0));
    }

    #[test]
    fn wheel_accumulates() {
        let mut state = InputState::new();
        state.add_wheel(WHEEL_NOTCH);
        state.add_wheel(-30.0);
        assert_eq!(state.take_wheel(), 90.0);
        assert_eq!(state.take_wheel(), 0.0);
    }
}
