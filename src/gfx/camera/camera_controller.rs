use cgmath::Vector3;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Translates mouse and keyboard input into orbit camera motion: drag to
/// rotate, shift-drag to pan, scroll to zoom, WASD (plus Q/E for height)
/// to move the focus point.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub move_speed: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            move_speed: 0.25,
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                window.request_redraw();
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move focus point)
                        camera.move_target(Vector3::new(
                            -delta.0 as f32 * self.pan_speed,
                            0.0,
                            delta.1 as f32 * self.pan_speed,
                        ));
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around focus)
                        camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                        camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                    }
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        let KeyEvent {
            physical_key: PhysicalKey::Code(key_code),
            state,
            ..
        } = event
        else {
            return;
        };

        if matches!(key_code, KeyCode::ShiftLeft | KeyCode::ShiftRight) {
            self.is_shift_held = *state == ElementState::Pressed;
            return;
        }

        if *state != ElementState::Pressed {
            return;
        }

        let step = self.move_speed;
        let motion = match key_code {
            KeyCode::KeyW => Some(Vector3::new(0.0, step, 0.0)),
            KeyCode::KeyS => Some(Vector3::new(0.0, -step, 0.0)),
            KeyCode::KeyA => Some(Vector3::new(-step, 0.0, 0.0)),
            KeyCode::KeyD => Some(Vector3::new(step, 0.0, 0.0)),
            KeyCode::KeyE => Some(Vector3::new(0.0, 0.0, step)),
            KeyCode::KeyQ => Some(Vector3::new(0.0, 0.0, -step)),
            _ => None,
        };

        if let Some(motion) = motion {
            camera.move_target(motion);
        }
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }
}
