//! Camera, projection and orbit navigation.
//!
//! The camera orbits a target point. [`OrbitController`] accumulates pointer
//! and wheel input as angular/zoom velocities and applies exponential damping
//! each animation frame; it is advanced unconditionally from the redraw
//! handler, so navigation keeps easing out even when no input arrives.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use instant::Duration;
use winit::event::{MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Eye position plus view direction as yaw/pitch.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Matrix4::look_to_rh(
            self.position,
            Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize(),
            Vector3::unit_y(),
        )
    }
}

/// Perspective projection. `aspect` tracks the viewport exactly; see
/// [`Projection::resize`].
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Aspect becomes exactly `width / height`. Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Inverse of the combined view-projection, used by the picking engine to
/// unproject pointer coordinates into a world-space ray. `None` only for a
/// degenerate projection.
pub fn inverse_view_proj(camera: &Camera, projection: &Projection) -> Option<Matrix4<f32>> {
    (projection.matrix() * camera.view_matrix()).invert()
}

/// Camera uniform data as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 400.0;

/// Orbit-style camera controller with damping.
///
/// Pointer drags and wheel ticks feed velocities; `update` integrates them and
/// decays them exponentially, then writes the resulting eye position and view
/// direction back into the [`Camera`].
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Point3<f32>,
    distance: f32,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    sensitivity: f32,
    damping: f32,
}

impl OrbitController {
    /// `sensitivity` scales pointer input; `damping` is the exponential decay
    /// rate of the accumulated velocities (higher stops sooner).
    pub fn new(sensitivity: f32, damping: f32) -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            distance: 20.0,
            yaw: Rad(0.0),
            pitch: Rad(0.5),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            sensitivity,
            damping,
        }
    }

    /// Place the orbit so the camera sits at `eye` looking at `target`.
    pub fn look_from(&mut self, eye: Point3<f32>, target: Point3<f32>) {
        let offset = eye - target;
        self.target = target;
        self.distance = offset.magnitude().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.pitch = Rad((offset.y / self.distance).asin().clamp(-MAX_PITCH, MAX_PITCH));
        self.yaw = Rad(offset.z.atan2(offset.x));
    }

    /// Pointer drag input (physical pixels).
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.yaw_velocity += dx as f32 * self.sensitivity;
        self.pitch_velocity += dy as f32 * self.sensitivity;
    }

    /// Wheel input zooms towards/away from the target.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            let amount = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
            };
            self.zoom_velocity -= amount;
        }
    }

    /// Advance the orbit by one frame and write the result into `camera`.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        self.yaw += Rad(self.yaw_velocity * dt);
        self.pitch = Rad((self.pitch.0 + self.pitch_velocity * dt).clamp(-MAX_PITCH, MAX_PITCH));
        self.distance =
            (self.distance * (1.0 + self.zoom_velocity * dt)).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let decay = (-self.damping * dt).exp();
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;

        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let offset =
            Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.distance;

        camera.position = self.target + offset;
        camera.pitch = -self.pitch;
        camera.yaw = self.yaw + Rad(std::f32::consts::PI);
    }
}

/// GPU resources backing the camera uniform.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, EuclideanSpace};

    #[test]
    fn resize_sets_exact_aspect() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        projection.resize(1024, 768);
        assert_eq!(projection.aspect(), 1024.0 / 768.0);
    }

    #[test]
    fn resize_ignores_degenerate_dimensions() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        projection.resize(0, 500);
        assert_eq!(projection.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn orbit_keeps_eye_on_sphere_around_target() {
        let mut controller = OrbitController::new(0.005, 6.0);
        controller.look_from(Point3::new(10.0, 0.0, 0.0), Point3::origin());
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        controller.update(&mut camera, Duration::from_millis(16));
        let offset = camera.position - controller.target;
        assert!((offset.magnitude() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn orbit_velocity_decays_to_rest() {
        let mut controller = OrbitController::new(0.005, 6.0);
        controller.look_from(Point3::new(0.0, 5.0, 10.0), Point3::origin());
        controller.handle_mouse(200.0, 0.0);
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        for _ in 0..600 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        let before = camera.position;
        controller.update(&mut camera, Duration::from_millis(16));
        assert!((camera.position - before).magnitude() < 1e-3);
    }
}
