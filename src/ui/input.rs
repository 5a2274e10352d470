//! Keyboard and pointer handling, independent of the windowing backend.
//!
//! The app samples one [`InputFrame`] per frame from egui and hands it to
//! [`apply`], which mutates the [`ProgramState`] and reports what the window
//! should do in response.

use crate::scene::camera::CameraMovement;
use crate::state::ProgramState;

/// Input gathered over one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Seconds since the previous frame.
    pub dt: f32,

    // --- Held keys ---
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,

    // --- Key presses ---
    pub toggle_ui: bool,
    pub toggle_dir_light: bool,
    pub toggle_flashlight: bool,
    pub screenshot: bool,
    pub quit: bool,

    /// Raw pointer motion in screen units, +y downwards.
    pub mouse_delta: (f32, f32),
    /// Wheel movement in lines, +y away from the user.
    pub scroll_lines: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and locked to the window; motion drives the camera.
    Captured,
    /// Normal cursor for the overlay.
    Released,
}

/// Side effects the window layer must carry out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRequests {
    /// Persist the state and close.
    pub close: bool,
    pub screenshot: bool,
    pub cursor: Option<CursorMode>,
}

pub fn apply(state: &mut ProgramState, input: &InputFrame) -> WindowRequests {
    let mut requests = WindowRequests::default();

    if input.quit {
        requests.close = true;
    }

    for (held, movement) in [
        (input.forward, CameraMovement::Forward),
        (input.backward, CameraMovement::Backward),
        (input.left, CameraMovement::Left),
        (input.right, CameraMovement::Right),
    ] {
        if held {
            state.camera.process_keyboard(movement, input.dt);
        }
    }

    let (dx, dy) = input.mouse_delta;
    if state.camera_mouse_enabled && (dx != 0.0 || dy != 0.0) {
        // Screen y grows downwards, pitch grows upwards.
        state.camera.process_mouse_movement(dx, -dy, true);
    }
    if input.scroll_lines != 0.0 {
        state.camera.process_mouse_scroll(input.scroll_lines);
    }

    if input.toggle_ui {
        let visible = !state.ui_visible;
        state.set_ui_visible(visible);
        requests.cursor = Some(if visible {
            CursorMode::Released
        } else {
            CursorMode::Captured
        });
    }
    if input.toggle_dir_light {
        state.dir_light = !state.dir_light;
    }
    if input.toggle_flashlight {
        state.spot_light = !state.spot_light;
    }
    requests.screenshot = input.screenshot;

    requests
}

/// Cursor mode matching a freshly loaded state.
pub fn initial_cursor(state: &ProgramState) -> CursorMode {
    if state.ui_visible {
        CursorMode::Released
    } else {
        CursorMode::Captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn f1_shows_ui_and_releases_cursor() {
        let mut state = ProgramState::default();
        let press = InputFrame {
            toggle_ui: true,
            ..InputFrame::default()
        };

        let requests = apply(&mut state, &press);
        assert!(state.ui_visible);
        assert!(!state.camera_mouse_enabled);
        assert_eq!(requests.cursor, Some(CursorMode::Released));

        let requests = apply(&mut state, &press);
        assert!(!state.ui_visible);
        assert_eq!(requests.cursor, Some(CursorMode::Captured));
        // Coupling stays off until re-enabled from the overlay.
        assert!(!state.camera_mouse_enabled);
    }

    #[test]
    fn function_keys_toggle_lights() {
        let mut state = ProgramState::default();
        apply(
            &mut state,
            &InputFrame {
                toggle_dir_light: true,
                toggle_flashlight: true,
                ..InputFrame::default()
            },
        );
        assert!(state.dir_light && state.spot_light);
    }

    #[test]
    fn pointer_is_ignored_while_decoupled() {
        let mut state = ProgramState::default();
        let motion = InputFrame {
            mouse_delta: (100.0, 0.0),
            ..InputFrame::default()
        };

        apply(&mut state, &motion);
        assert_relative_eq!(state.camera.yaw, -80.0, epsilon = 1e-4);

        state.camera_mouse_enabled = false;
        apply(&mut state, &motion);
        assert_relative_eq!(state.camera.yaw, -80.0, epsilon = 1e-4);
    }

    #[test]
    fn moving_up_raises_pitch() {
        let mut state = ProgramState::default();
        apply(
            &mut state,
            &InputFrame {
                mouse_delta: (0.0, -50.0),
                ..InputFrame::default()
            },
        );
        assert_relative_eq!(state.camera.pitch, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn escape_requests_close() {
        let mut state = ProgramState::default();
        let requests = apply(
            &mut state,
            &InputFrame {
                quit: true,
                screenshot: true,
                ..InputFrame::default()
            },
        );
        assert!(requests.close);
        assert!(requests.screenshot);
    }

    #[test]
    fn wasd_moves_with_dt() {
        let mut state = ProgramState::default();
        let start = state.camera.position;
        apply(
            &mut state,
            &InputFrame {
                dt: 0.4,
                forward: true,
                ..InputFrame::default()
            },
        );
        assert_relative_eq!(state.camera.position.z, start.z - 1.0, epsilon = 1e-5);
    }
}
