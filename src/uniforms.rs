//! The fixed parameter set handed to the simulation/rendering passes.

use crate::synth::tables::{
    CONTRAST_RANGE, GRAIN_RANGE, HUE_SHIFT_RANGE, MOTION_DEFAULT, NOISE_SCALE_RANGE, SPEED_RANGE,
    TEXTURE_DEFAULT, WARP_RANGE,
};
use crate::synth::ParameterVector;
use serde::Serialize;

pub use crate::synth::MAX_EXTRA_COLORS;

/// Seeds are wrapped into [0, SEED_WRAP) so they survive the trip to f32.
pub const SEED_WRAP: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    I32,
    Vec3,
    Vec4,
    Vec3Array(usize),
}

impl UniformKind {
    /// Floats occupied in the flat block (vec3 padded to 4).
    pub const fn block_floats(self) -> usize {
        match self {
            Self::F32 | Self::I32 => 1,
            Self::Vec3 | Self::Vec4 => 4,
            Self::Vec3Array(n) => 4 * n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub kind: UniformKind,
}

const fn slot(name: &'static str, kind: UniformKind) -> UniformSlot {
    UniformSlot { name, kind }
}

/// Binding order and names of the uniform set.
pub const UNIFORM_LAYOUT: [UniformSlot; 15] = [
    slot("seed", UniformKind::F32),
    slot("noiseScale", UniformKind::F32),
    slot("warp", UniformKind::F32),
    slot("speed", UniformKind::F32),
    slot("contrast", UniformKind::F32),
    slot("hueShift", UniformKind::F32),
    slot("grain", UniformKind::F32),
    slot("paletteA", UniformKind::Vec3),
    slot("paletteB", UniformKind::Vec3),
    slot("paletteC", UniformKind::Vec3),
    slot("extraColors", UniformKind::Vec3Array(MAX_EXTRA_COLORS)),
    slot("extraCount", UniformKind::I32),
    slot("textureWeights", UniformKind::Vec4),
    slot("textureScale", UniformKind::F32),
    slot("motionWeights", UniformKind::Vec4),
];

pub const fn block_len() -> usize {
    let mut n = 0;
    let mut i = 0;
    while i < UNIFORM_LAYOUT.len() {
        n += UNIFORM_LAYOUT[i].kind.block_floats();
        i += 1;
    }
    n
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uniforms {
    pub seed: f32,
    pub noise_scale: f32,
    pub warp: f32,
    pub speed: f32,
    pub contrast: f32,
    pub hue_shift: f32,
    pub grain: f32,
    pub palette_a: [f32; 3],
    pub palette_b: [f32; 3],
    pub palette_c: [f32; 3],
    pub extra_colors: [[f32; 3]; MAX_EXTRA_COLORS],
    pub extra_count: i32,
    pub texture_weights: [f32; 4],
    pub texture_scale: f32,
    pub motion_weights: [f32; 4],
}

impl Uniforms {
    /// Bind a parameter vector. Every component is forced into range; this cannot fail.
    pub fn bind(params: &ParameterVector) -> Self {
        let s = &params.shading;
        let mut extra_colors = [[0.0f32; 3]; MAX_EXTRA_COLORS];
        let count = params
            .palette
            .extra
            .len()
            .min(params.palette.extra_count)
            .min(MAX_EXTRA_COLORS);
        for (dst, src) in extra_colors.iter_mut().zip(&params.palette.extra[..count]) {
            *dst = clamp_color(*src);
        }

        Self {
            seed: wrap_seed(params.seed),
            noise_scale: clamp_range(s.noise_scale, NOISE_SCALE_RANGE),
            warp: clamp_range(s.warp, WARP_RANGE),
            speed: clamp_range(s.speed, SPEED_RANGE),
            contrast: clamp_range(s.contrast, CONTRAST_RANGE),
            hue_shift: clamp_range(s.hue_shift, HUE_SHIFT_RANGE),
            grain: clamp_range(s.grain, GRAIN_RANGE),
            palette_a: clamp_color(params.palette.anchors[0]),
            palette_b: clamp_color(params.palette.anchors[1]),
            palette_c: clamp_color(params.palette.anchors[2]),
            extra_colors,
            extra_count: count as i32,
            texture_weights: renormalize(params.texture_weights, TEXTURE_DEFAULT),
            texture_scale: clamp_range(params.texture_scale, (0.0, 1.0)),
            motion_weights: renormalize(params.motion_weights, MOTION_DEFAULT),
        }
    }

    /// The active extra colours.
    pub fn extras(&self) -> &[[f32; 3]] {
        let n = (self.extra_count.max(0) as usize).min(MAX_EXTRA_COLORS);
        &self.extra_colors[..n]
    }

    /// Flat float block in `UNIFORM_LAYOUT` order.
    pub fn to_block(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(block_len());
        let vec3 = |out: &mut Vec<f32>, c: [f32; 3]| out.extend_from_slice(&[c[0], c[1], c[2], 0.0]);
        out.extend_from_slice(&[
            self.seed,
            self.noise_scale,
            self.warp,
            self.speed,
            self.contrast,
            self.hue_shift,
            self.grain,
        ]);
        vec3(&mut out, self.palette_a);
        vec3(&mut out, self.palette_b);
        vec3(&mut out, self.palette_c);
        for c in self.extra_colors {
            vec3(&mut out, c);
        }
        out.push(self.extra_count as f32);
        out.extend_from_slice(&self.texture_weights);
        out.push(self.texture_scale);
        out.extend_from_slice(&self.motion_weights);
        out
    }
}

fn clamp_range(v: f32, (lo, hi): (f32, f32)) -> f32 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

fn clamp_color(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| clamp_range(v, (0.0, 1.0)))
}

fn wrap_seed(seed: f64) -> f32 {
    if !seed.is_finite() {
        return 0.0;
    }
    seed.rem_euclid(SEED_WRAP) as f32
}

/// Force a weight vector onto the simplex, or to `default` when it carries no usable mass.
pub fn renormalize(w: [f32; 4], default: [f32; 4]) -> [f32; 4] {
    let w = w.map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 });
    let total: f32 = w.iter().sum();
    if !(total > 1e-6) {
        return default;
    }
    if (total - 1.0).abs() <= 1e-6 {
        return w;
    }
    w.map(|v| v / total)
}
