//! Mutable program state: camera, light toggles and UI visibility.
//!
//! One `ProgramState` is owned by the application loop and lent to input
//! handling, the overlay and the compositor. Persistence lives in
//! [`crate::io::state_file`].

use crate::scene::camera::Camera;
use nalgebra::Point3;

/// The six switchable lamps, in persistence and overlay order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lamp {
    /// Ceiling fixture feeding the three overhead point lights.
    Ceiling,
    /// Wall sconce right of the desk.
    SconceRight,
    /// Wall sconce left of the desk.
    SconceLeft,
    /// Desk lamp, a spot light.
    Desk,
    /// Floor lamp, a spot light.
    Floor,
    /// Lamp on the side table.
    Side,
}

impl Lamp {
    pub const ALL: [Lamp; 6] = [
        Lamp::Ceiling,
        Lamp::SconceRight,
        Lamp::SconceLeft,
        Lamp::Desk,
        Lamp::Floor,
        Lamp::Side,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Overlay checkbox label.
    pub const fn label(self) -> &'static str {
        match self {
            Lamp::Ceiling => "Light1",
            Lamp::SconceRight => "Light2_1",
            Lamp::SconceLeft => "Light2_2",
            Lamp::Desk => "Light3",
            Lamp::Floor => "Light4",
            Lamp::Side => "Light5",
        }
    }
}

pub const START_POSITION: Point3<f32> = Point3::new(0.0, 5.0, 15.0);

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramState {
    pub ui_visible: bool,
    pub camera: Camera,
    /// Directional "sun" light.
    pub dir_light: bool,
    /// Flashlight attached to the camera.
    pub spot_light: bool,
    pub lamps: [bool; 6],
    /// Whether pointer motion rotates the camera. Not persisted.
    pub camera_mouse_enabled: bool,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            ui_visible: false,
            camera: Camera::new(START_POSITION),
            dir_light: false,
            spot_light: false,
            lamps: [false; 6],
            camera_mouse_enabled: true,
        }
    }
}

impl ProgramState {
    pub fn lamp(&self, lamp: Lamp) -> bool {
        self.lamps[lamp.index()]
    }

    pub fn lamp_mut(&mut self, lamp: Lamp) -> &mut bool {
        &mut self.lamps[lamp.index()]
    }

    pub fn set_lamp(&mut self, lamp: Lamp, on: bool) {
        self.lamps[lamp.index()] = on;
    }

    /// Whether any light that reaches the glass is on. The floor lamp and
    /// the flashlight do not count.
    pub fn glass_lit(&self) -> bool {
        self.dir_light
            || self.lamp(Lamp::Ceiling)
            || self.lamp(Lamp::SconceRight)
            || self.lamp(Lamp::SconceLeft)
            || self.lamp(Lamp::Desk)
            || self.lamp(Lamp::Side)
    }

    /// Shows or hides the overlay. Showing it decouples the mouse from the
    /// camera; hiding it leaves coupling as the user last set it.
    pub fn set_ui_visible(&mut self, visible: bool) {
        self.ui_visible = visible;
        if visible {
            self.camera_mouse_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_dark_with_mouse_coupled() {
        let state = ProgramState::default();
        assert!(!state.ui_visible);
        assert!(state.lamps.iter().all(|on| !on));
        assert!(state.camera_mouse_enabled);
        assert_eq!(state.camera.position, START_POSITION);
    }

    #[test]
    fn lamp_index_follows_declaration_order() {
        for (i, lamp) in Lamp::ALL.iter().enumerate() {
            assert_eq!(lamp.index(), i);
        }
        assert_eq!(Lamp::Side.label(), "Light5");
    }

    #[test]
    fn floor_lamp_alone_leaves_glass_unlit() {
        let mut state = ProgramState::default();
        state.set_lamp(Lamp::Floor, true);
        state.spot_light = true;
        assert!(!state.glass_lit());
        state.set_lamp(Lamp::Side, true);
        assert!(state.glass_lit());
    }

    #[test]
    fn showing_ui_decouples_mouse() {
        let mut state = ProgramState::default();
        state.set_ui_visible(true);
        assert!(!state.camera_mouse_enabled);
        state.set_ui_visible(false);
        assert!(!state.camera_mouse_enabled);
    }
}
