use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Pointer-driven orbit around the camera target.
///
/// Keeps the camera on a sphere around `camera.target`; drag rotates,
/// scroll dollies. Pitch stays short of the poles so `look_at` never
/// degenerates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Derives yaw, pitch and distance from the camera's current placement.
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.position - camera.target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Positive `delta` moves towards the target.
    pub fn zoom(&mut self, delta: f32) {
        let factor = 1.0 - delta * self.zoom_speed;
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn apply(&self, camera: &mut Camera) {
        let offset = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        ) * self.distance;
        camera.position = camera.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn orbit_round_trips_default_placement() {
        let mut cam = Camera::default();
        let controls = OrbitControls::from_camera(&cam);
        assert!((controls.distance - 5.0).abs() < 1e-5);
        controls.apply(&mut cam);
        assert!((cam.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_pitch() {
        let mut cam = Camera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.rotate(120.0, 100_000.0);
        controls.apply(&mut cam);
        assert!(controls.pitch < 89.5_f32.to_radians());
        assert!(((cam.position - cam.target).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_bounded() {
        let cam = Camera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        for _ in 0..200 {
            controls.zoom(1.0);
        }
        assert_eq!(controls.distance, controls.min_distance);
    }
}
