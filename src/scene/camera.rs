use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const ZOOM: f32 = 45.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;
pub const PITCH_LIMIT: f32 = 89.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person fly camera driven by Euler angles (degrees).
///
/// `front`, `right` and `up` are always derived from `yaw`/`pitch`; the only
/// way to set `front` directly is [`Camera::look_along`], which re-derives the
/// angles from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,

    pub yaw: f32,
    pub pitch: f32,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}

impl Camera {
    pub fn new(position: Point3<f32>) -> Self {
        let mut camera = Self {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            right: Vector3::x(),
            world_up: Vector3::y(),
            yaw: YAW,
            pitch: PITCH,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Points the camera along `front`, deriving yaw and pitch from it.
    pub fn look_along(&mut self, front: Vector3<f32>) {
        let Some(dir) = front.try_normalize(1e-6) else {
            return;
        };
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::view(&self.position, &(self.position + self.front), &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4<f32> {
        TransformFactory::perspective(aspect_ratio, self.zoom.to_radians(), NEAR, FAR)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Mouse offsets in screen units; `y_offset` grows upwards.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(Point3::new(0.0, 5.0, 15.0));
        assert_relative_eq!(cam.front, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(cam.right, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn look_along_round_trips_front() {
        let mut cam = Camera::default();
        let front = Vector3::new(0.3, -0.4, -0.8).normalize();
        cam.look_along(front);
        assert_relative_eq!(cam.front, front, epsilon = 1e-5);
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let mut cam = Camera::new(Point3::new(0.0, 5.0, 15.0));
        cam.process_keyboard(CameraMovement::Forward, 0.5);
        assert_relative_eq!(cam.position, Point3::new(0.0, 5.0, 13.75), epsilon = 1e-5);
        cam.process_keyboard(CameraMovement::Right, 0.2);
        assert_relative_eq!(cam.position.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_constrained() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 10_000.0, true);
        assert_relative_eq!(cam.pitch, PITCH_LIMIT);
        assert!(cam.front.y < 1.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse_scroll(-10.0);
        assert_relative_eq!(cam.zoom, MAX_ZOOM);
        cam.process_mouse_scroll(100.0);
        assert_relative_eq!(cam.zoom, MIN_ZOOM);
    }
}
