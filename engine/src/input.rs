use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase},
    keyboard::{KeyCode, PhysicalKey},
};

/// Tracks keyboard, mouse and touch state across frames.
///
/// A "tap" is the game-level abstraction over all three: a left click, a finger going
/// down, or the space bar.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    mouse_x: f32,
    mouse_y: f32,
    mouse_down: [bool; 8],
    mouse_pressed: [bool; 8],
    mouse_released: [bool; 8],

    touches: HashMap<u64, (f32, f32)>,
    touch_started: bool,
    touch_ended: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.fill(false);
        self.mouse_released.fill(false);
        self.touch_started = false;
        self.touch_ended = false;
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(keycode) = event.physical_key {
            self.handle_key_code(keycode, event.state);
        }
    }

    pub fn handle_key_code(&mut self, keycode: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.contains(&keycode) {
                    self.keys_pressed.insert(keycode);
                }
                self.keys_down.insert(keycode);
            }
            ElementState::Released => {
                self.keys_down.remove(&keycode);
                self.keys_released.insert(keycode);
            }
        }
    }

    /// Handle a mouse button input event from winit.
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if let Some(idx) = mouse_button_index(button) {
            match state {
                ElementState::Pressed => {
                    if !self.mouse_down[idx] {
                        self.mouse_pressed[idx] = true;
                    }
                    self.mouse_down[idx] = true;
                }
                ElementState::Released => {
                    self.mouse_down[idx] = false;
                    self.mouse_released[idx] = true;
                }
            }
        }
    }

    /// Handle mouse cursor movement from winit.
    pub fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        self.mouse_x = x as f32;
        self.mouse_y = y as f32;
    }

    /// Handle a touch event from winit.
    pub fn handle_touch(&mut self, touch: &Touch) {
        self.handle_touch_phase(touch.id, touch.phase, touch.location.x, touch.location.y);
    }

    pub fn handle_touch_phase(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64) {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, (x as f32, y as f32));
                self.touch_started = true;
            }
            TouchPhase::Moved => {
                if let Some(position) = self.touches.get_mut(&id) {
                    *position = (x as f32, y as f32);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.touches.remove(&id).is_some() {
                    self.touch_ended = true;
                }
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_down[idx])
            .unwrap_or(false)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_pressed[idx])
            .unwrap_or(false)
    }

    /// Current mouse cursor position in surface pixels.
    pub fn mouse_position(&self) -> (f32, f32) {
        (self.mouse_x, self.mouse_y)
    }

    /// Number of fingers currently on the surface.
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// A tap started this frame (left click, touch, or space).
    pub fn tap_pressed(&self) -> bool {
        self.touch_started
            || self.is_mouse_pressed(MouseButton::Left)
            || self.is_key_pressed(KeyCode::Space)
    }

    /// A tap ended this frame.
    pub fn tap_released(&self) -> bool {
        self.touch_ended
            || self.mouse_released[0]
            || self.is_key_released(KeyCode::Space)
    }

    /// Any tap source is held.
    pub fn tap_down(&self) -> bool {
        !self.touches.is_empty()
            || self.is_mouse_down(MouseButton::Left)
            || self.is_key_down(KeyCode::Space)
    }
}

fn mouse_button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::Back => Some(3),
        MouseButton::Forward => Some(4),
        MouseButton::Other(raw) => {
            let idx = raw as usize;
            let mapped = 5 + idx; // Reserve 0-4 for standard buttons
            (mapped < 8).then_some(mapped)
        }
    }
}
