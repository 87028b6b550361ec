use crate::sim::math::Vec3;
use crate::sim::FrameInput;
use std::f32::consts::{PI, TAU};

pub const CAMERA_RADIUS: f32 = 4.0;
/// Radians per viewport-normalized pointer unit (azimuth, elevation).
pub const POINTER_SENSITIVITY: (f32, f32) = (5.0, 3.0);
pub const POLAR_EPSILON: f32 = 1e-3;
/// Frames during which the orientation is forced to the default.
pub const BOOTSTRAP_FRAMES: u64 = 4;
pub const DEFAULT_AZIMUTH: f32 = 0.0;
pub const DEFAULT_ELEVATION: f32 = 1.2;

/// Camera state carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRegister {
    pub azimuth: f32,
    /// Polar angle from +Y, kept inside (epsilon, pi - epsilon).
    pub elevation: f32,
    pub pointer: [f32; 2],
    pub pointer_held: bool,
    pub viewport: [u32; 2],
}

impl Default for CameraRegister {
    fn default() -> Self {
        Self {
            azimuth: DEFAULT_AZIMUTH,
            elevation: DEFAULT_ELEVATION,
            pointer: [0.0, 0.0],
            pointer_held: false,
            viewport: [0, 0],
        }
    }
}

impl CameraRegister {
    /// Two RGBA texels, the feedback-buffer form of the register.
    pub fn to_texels(&self) -> [[f32; 4]; 2] {
        [
            [self.azimuth, self.elevation, self.pointer[0], self.pointer[1]],
            [
                if self.pointer_held { 1.0 } else { 0.0 },
                self.viewport[0] as f32,
                self.viewport[1] as f32,
                0.0,
            ],
        ]
    }

    pub fn from_texels(t: [[f32; 4]; 2]) -> Self {
        Self {
            azimuth: t[0][0],
            elevation: t[0][1],
            pointer: [t[0][2], t[0][3]],
            pointer_held: t[1][0] > 0.5,
            viewport: [t[1][1].max(0.0) as u32, t[1][2].max(0.0) as u32],
        }
    }
}

/// Orthonormal look-at basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Basis {
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        Self { right, up, forward }
    }
}

/// Output of the camera pass for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub register: CameraRegister,
    pub position: Vec3,
    pub basis: Basis,
    pub resolution_changed: bool,
}

pub fn spherical_to_cartesian(radius: f32, azimuth: f32, elevation: f32) -> Vec3 {
    let s = elevation.sin();
    Vec3::new(
        radius * s * azimuth.sin(),
        radius * elevation.cos(),
        radius * s * azimuth.cos(),
    )
}

/// Integrate pointer drags into the orbit angles and derive the camera for this frame.
pub fn camera_pass(prev: &CameraRegister, frame: u64, input: &FrameInput) -> CameraFrame {
    let pointer = [input.pointer.x, input.pointer.y];
    let pointer_ok = pointer[0].is_finite() && pointer[1].is_finite();
    if !pointer_ok {
        tracing::warn!(frame, "non-finite pointer sample ignored");
    }
    let held = input.pointer.held && pointer_ok;

    let (mut azimuth, mut elevation) = (prev.azimuth, prev.elevation);
    if frame < BOOTSTRAP_FRAMES {
        azimuth = DEFAULT_AZIMUTH;
        elevation = DEFAULT_ELEVATION;
    } else if held && prev.pointer_held {
        let vw = input.viewport[0].max(1) as f32;
        let vh = input.viewport[1].max(1) as f32;
        let dx = (pointer[0] - prev.pointer[0]) / vw;
        let dy = (pointer[1] - prev.pointer[1]) / vh;
        let next_az = azimuth - dx * POINTER_SENSITIVITY.0;
        let next_el = elevation - dy * POINTER_SENSITIVITY.1;
        if next_az.is_finite() && next_el.is_finite() {
            azimuth = next_az;
            elevation = next_el;
        }
    }

    azimuth = azimuth.rem_euclid(TAU - POLAR_EPSILON);
    // rem_euclid can round a tiny negative input up to the modulus itself.
    if azimuth >= TAU - POLAR_EPSILON {
        azimuth = 0.0;
    }
    elevation = elevation.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    if !azimuth.is_finite() || !elevation.is_finite() {
        azimuth = DEFAULT_AZIMUTH;
        elevation = DEFAULT_ELEVATION;
    }

    let resolution_changed = prev.viewport != input.viewport;
    let position = spherical_to_cartesian(CAMERA_RADIUS, azimuth, elevation);

    CameraFrame {
        register: CameraRegister {
            azimuth,
            elevation,
            pointer: if pointer_ok { pointer } else { prev.pointer },
            pointer_held: held,
            viewport: input.viewport,
        },
        position,
        basis: Basis::look_at(position, Vec3::ZERO),
        resolution_changed,
    }
}
