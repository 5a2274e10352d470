//! Flat text persistence of [`ProgramState`].
//!
//! One value per line: `ui_visible`, camera position x/y/z, camera front
//! x/y/z, `dir_light`, `spot_light`, then the six lamp flags. Booleans are
//! written as `0`/`1`.

use crate::error::Result;
use crate::state::ProgramState;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::Path;

/// Number of values in a complete state file.
pub const FIELD_COUNT: usize = 15;

pub fn to_text(state: &ProgramState) -> String {
    let camera = &state.camera;
    let mut lines = Vec::with_capacity(FIELD_COUNT);
    lines.push(flag(state.ui_visible));
    lines.extend(camera.position.iter().map(|c| c.to_string()));
    lines.extend(camera.front.iter().map(|c| c.to_string()));
    lines.push(flag(state.dir_light));
    lines.push(flag(state.spot_light));
    lines.extend(state.lamps.iter().map(|&on| flag(on)));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

/// Only `0` and `1` are flags; any other integer marks the file as corrupt.
fn parse_flag(token: &str) -> Option<bool> {
    match token.parse::<i64>().ok()? {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Parses a state dump. Returns `None` unless all fifteen values are present
/// and well-formed.
pub fn parse(text: &str) -> Option<ProgramState> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < FIELD_COUNT {
        return None;
    }

    let float = |i: usize| tokens[i].parse::<f32>().ok().filter(|v| v.is_finite());

    let ui_visible = parse_flag(tokens[0])?;
    let position = Point3::new(float(1)?, float(2)?, float(3)?);
    let front = Vector3::new(float(4)?, float(5)?, float(6)?);
    let dir_light = parse_flag(tokens[7])?;
    let spot_light = parse_flag(tokens[8])?;
    let mut lamps = [false; 6];
    for (slot, token) in lamps.iter_mut().zip(&tokens[9..FIELD_COUNT]) {
        *slot = parse_flag(token)?;
    }

    let mut state = ProgramState {
        dir_light,
        spot_light,
        lamps,
        ..ProgramState::default()
    };
    state.camera.position = position;
    state.camera.look_along(front);
    state.set_ui_visible(ui_visible);
    Some(state)
}

/// Reads the state file, falling back to defaults for a missing or malformed file.
pub fn load<P: AsRef<Path>>(path: P) -> ProgramState {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            info!("No program state at {path:?} ({e}); using defaults");
            return ProgramState::default();
        }
    };

    match parse(&text) {
        Some(state) => {
            info!("Program state restored from {path:?}");
            state
        }
        None => {
            warn!("Program state at {path:?} is malformed; using defaults");
            ProgramState::default()
        }
    }
}

pub fn save<P: AsRef<Path>>(state: &ProgramState, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_text(state))?;
    info!("Program state saved to {path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Lamp, START_POSITION};
    use approx::assert_relative_eq;

    fn sample_state() -> ProgramState {
        let mut state = ProgramState::default();
        state.dir_light = true;
        state.set_lamp(Lamp::SconceLeft, true);
        state.set_lamp(Lamp::Side, true);
        state.camera.position = Point3::new(1.5, 2.25, -3.0);
        state.camera.look_along(Vector3::new(0.6, -0.1, -0.8));
        state
    }

    #[test]
    fn writes_one_value_per_line() {
        let text = to_text(&sample_state());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), FIELD_COUNT);
        assert_eq!(lines[0], "0");
        assert_eq!(lines[1], "1.5");
        assert_eq!(lines[7], "1");
        assert_eq!(&lines[9..], ["0", "0", "1", "0", "0", "1"]);
    }

    #[test]
    fn save_then_load_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("program_state.txt");
        let state = sample_state();
        save(&state, &path).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.lamps, state.lamps);
        assert_eq!(loaded.dir_light, state.dir_light);
        assert_eq!(loaded.spot_light, state.spot_light);
        assert_relative_eq!(loaded.camera.position, state.camera.position);
        assert_relative_eq!(loaded.camera.front, state.camera.front, epsilon = 1e-5);
        assert_relative_eq!(loaded.camera.yaw, state.camera.yaw, epsilon = 1e-3);
        assert!(loaded.camera_mouse_enabled);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = load(dir.path().join("absent.txt"));
        assert_eq!(state, ProgramState::default());
    }

    #[test]
    fn short_or_garbled_file_is_rejected_whole() {
        let full = to_text(&sample_state());
        let short: String = full.lines().take(10).collect::<Vec<_>>().join("\n");
        assert!(parse(&short).is_none());

        let garbled = full.replacen("1.5", "one", 1);
        assert!(parse(&garbled).is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.txt");
        fs::write(&path, garbled).unwrap();
        let state = load(&path);
        assert!(!state.dir_light);
        assert_eq!(state.camera.position, START_POSITION);
    }

    #[test]
    fn visible_ui_starts_decoupled() {
        let mut state = sample_state();
        state.ui_visible = true;
        let loaded = parse(&to_text(&state)).unwrap();
        assert!(loaded.ui_visible);
        assert!(!loaded.camera_mouse_enabled);
    }

    #[test]
    fn flags_other_than_zero_or_one_are_rejected() {
        let text = to_text(&sample_state());
        let mut lines: Vec<&str> = text.lines().collect();
        assert!(parse(&lines.join("\n")).is_some());

        for bad in ["2", "-7"] {
            lines[7] = bad;
            assert!(parse(&lines.join("\n")).is_none(), "{bad} accepted as a flag");
        }
    }
}
