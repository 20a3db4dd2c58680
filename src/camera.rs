//! Orbit camera and screen-to-world ray construction.
//!
//! The controller keeps a target spherical pose and eases the live pose
//! toward it each frame, so pointer input stays responsive while the view
//! glides. Rays are unprojected through the inverse view-projection for
//! picking and drag planes.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// Zoom limits on the orbit radius.
const ZOOM_RANGE: (f32, f32) = (8.0, 50.0);
/// Per-frame easing factor for orbit angles.
const ORBIT_SMOOTHING: f32 = 0.05;
/// Per-frame easing factor for zoom.
const ZOOM_SMOOTHING: f32 = 0.03;
/// Keep the polar angle off the poles to avoid a degenerate up vector.
const POLAR_MARGIN: f32 = 0.05;

/// A world-space picking ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin (the camera eye).
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Parameter `t` at which this ray intersects the sphere at `center`
    /// with radius `radius`, or `None` if it misses or the sphere is
    /// behind the origin.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = -b - discriminant.sqrt();
        (t > 0.0).then_some(t)
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Perspective projection parameters plus the orbit pose.
///
/// The live pose (`yaw`, `pitch`, `radius`) eases toward the target pose
/// set by input; [`update`](Self::update) advances the easing.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Point the camera orbits and looks at.
    pub focus: Vec3,
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clip distance.
    pub znear: f32,
    /// Far clip distance.
    pub zfar: f32,
    yaw: f32,
    pitch: f32,
    radius: f32,
    target_yaw: f32,
    target_pitch: f32,
    target_radius: f32,
}

impl Camera {
    /// Camera orbiting the origin at the default radius.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let radius = 15.0;
        Self {
            focus: Vec3::ZERO,
            fovy: 60f32.to_radians(),
            aspect,
            znear: 0.1,
            zfar: 200.0,
            yaw: 0.0,
            pitch: 0.4,
            radius,
            target_yaw: 0.0,
            target_pitch: 0.4,
            target_radius: radius,
        }
    }

    /// Current eye position in world space.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus
            + Vec3::new(
                self.radius * cos_pitch * sin_yaw,
                self.radius * sin_pitch,
                self.radius * cos_pitch * cos_yaw,
            )
    }

    /// Current orbit radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Apply a pointer orbit delta (radians).
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.target_yaw += delta_yaw;
        self.target_pitch = (self.target_pitch + delta_pitch).clamp(
            -std::f32::consts::FRAC_PI_2 + POLAR_MARGIN,
            std::f32::consts::FRAC_PI_2 - POLAR_MARGIN,
        );
    }

    /// Apply a zoom delta; positive moves the eye outward. Clamped to the
    /// allowed radius range.
    pub fn zoom(&mut self, delta: f32) {
        self.target_radius =
            (self.target_radius + delta).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    /// Ease the live pose toward the target pose. Call once per frame.
    pub fn update(&mut self) {
        self.yaw += (self.target_yaw - self.yaw) * ORBIT_SMOOTHING;
        self.pitch += (self.target_pitch - self.pitch) * ORBIT_SMOOTHING;
        self.radius += (self.target_radius - self.radius) * ZOOM_SMOOTHING;
    }

    /// View matrix for the current pose.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.focus, Vec3::Y)
    }

    /// Projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect.max(1e-3), self.znear, self.zfar)
    }

    /// World-space ray through normalized device coordinates, where both
    /// axes span [-1, 1] and +y is up.
    #[must_use]
    pub fn screen_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let near = inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray {
            origin: near,
            direction: (far - near).normalize(),
        }
    }
}
