use crate::state::{Lamp, ProgramState};

/// What the overlay changed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayResponse {
    pub lamps_changed: bool,
    pub coupling_changed: bool,
}

/// Toggle windows drawn over the rendered frame while the UI is visible.
pub fn draw(ctx: &egui::Context, state: &mut ProgramState) -> OverlayResponse {
    let mut response = OverlayResponse::default();
    if !state.ui_visible {
        return response;
    }

    egui::Window::new("Camera mouse")
        .resizable(false)
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            response.coupling_changed = ui
                .checkbox(&mut state.camera_mouse_enabled, "")
                .changed();
        });

    egui::Window::new("ON/OFF")
        .resizable(false)
        .default_pos([10.0, 80.0])
        .show(ctx, |ui| {
            for lamp in Lamp::ALL {
                if ui.checkbox(state.lamp_mut(lamp), lamp.label()).changed() {
                    response.lamps_changed = true;
                }
            }
        });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_overlay_draws_nothing() {
        let ctx = egui::Context::default();
        let mut state = ProgramState::default();
        let before = state.clone();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let response = draw(ctx, &mut state);
            assert_eq!(response, OverlayResponse::default());
        });
        assert_eq!(state, before);
    }

    #[test]
    fn visible_overlay_leaves_state_untouched_without_clicks() {
        let ctx = egui::Context::default();
        let mut state = ProgramState::default();
        state.set_ui_visible(true);
        state.set_lamp(Lamp::Desk, true);
        let before = state.clone();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            draw(ctx, &mut state);
        });
        assert_eq!(state, before);
    }
}
