use crate::sim::camera::CameraFrame;
use crate::sim::math::{hash01, hash_u32, smoothstep, Vec3};
use crate::sim::particles::{Particle, BOUND_RADIUS};
use crate::uniforms::Uniforms;
use std::f32::consts::TAU;

pub const FOCAL_LENGTH: f32 = 1.6;
/// Squared glow core radius at `textureScale = 0.5`.
pub const GLOW_CORE: f32 = 0.0025;
pub const GLOW_GAIN: f32 = 0.12;
pub const FADE_IN_SECONDS: f32 = 0.6;
pub const TRAIL_DECAY: f32 = 0.85;
const BACKGROUND_LEVEL: f32 = 0.035;
/// Share of particles coloured from the extra palette when one exists.
const EXTRA_SHARE: f32 = 0.3;

/// Linear radiance at render resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderTarget {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f32; 3]>,
}

impl RenderTarget {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width.saturating_mul(height)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn reshape(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }
}

/// Resolution policy for the render pass relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downscale {
    /// Viewports with more pixels than this render at `large_divisor`, others at `small_divisor`.
    pub threshold_area: usize,
    pub large_divisor: usize,
    pub small_divisor: usize,
}

impl Default for Downscale {
    fn default() -> Self {
        Self {
            threshold_area: 1280 * 720,
            large_divisor: 2,
            small_divisor: 4,
        }
    }
}

impl Downscale {
    pub const fn full() -> Self {
        Self {
            threshold_area: 0,
            large_divisor: 1,
            small_divisor: 1,
        }
    }

    pub fn target_size(&self, viewport: [u32; 2]) -> (usize, usize) {
        let (w, h) = (viewport[0] as usize, viewport[1] as usize);
        if w == 0 || h == 0 {
            return (0, 0);
        }
        let div = if w.saturating_mul(h) > self.threshold_area {
            self.large_divisor
        } else {
            self.small_divisor
        }
        .max(1);
        ((w / div).max(1), (h / div).max(1))
    }
}

struct Sprite {
    rel: Vec3,
    rel_len2: f32,
    color: [f32; 3],
    speck: f32,
}

// Glow kernels over q = perpendicular distance² / core radius².
fn halo(q: f32) -> f32 {
    let d = 1.0 + 0.25 * q;
    1.0 / (d * d)
}

fn core(q: f32) -> f32 {
    let d = 1.0 + q;
    1.0 / (d * d)
}

fn ring(q: f32) -> f32 {
    q / (1.0 + q * q)
}

fn spike(q: f32) -> f32 {
    1.0 / (1.0 + 4.0 * q * q)
}

pub fn age_fade(age: f32) -> f32 {
    smoothstep(0.0, FADE_IN_SECONDS, age)
}

pub fn distance_falloff(dist: f32) -> f32 {
    1.0 - smoothstep(0.5 * BOUND_RADIUS, BOUND_RADIUS, dist)
}

fn particle_color(index: usize, u: &Uniforms, seed: u32) -> [f32; 3] {
    let i = index as u32;
    let extras = u.extras();
    if !extras.is_empty() && hash01(i, 0x5EED, seed) < EXTRA_SHARE {
        return extras[hash_u32(i, 3, seed) as usize % extras.len()];
    }
    let palette = [u.palette_a, u.palette_b, u.palette_c];
    let h = hash01(i, 1, seed) * 3.0;
    let k = (h.floor() as usize).min(2);
    let f = (h - k as f32) * 0.5;
    let (a, b) = (palette[k], palette[(k + 1) % 3]);
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
    ]
}

/// Rotate hue in YIQ space by `turns` of a full circle.
pub fn rotate_hue(c: [f32; 3], turns: f32) -> [f32; 3] {
    if turns == 0.0 {
        return c;
    }
    let (s, k) = (turns * TAU).sin_cos();
    let y = 0.299 * c[0] + 0.587 * c[1] + 0.114 * c[2];
    let i = 0.596 * c[0] - 0.274 * c[1] - 0.322 * c[2];
    let q = 0.211 * c[0] - 0.523 * c[1] + 0.312 * c[2];
    let (i, q) = (i * k - q * s, i * s + q * k);
    [
        (y + 0.956 * i + 0.621 * q).max(0.0),
        (y - 0.272 * i - 0.647 * q).max(0.0),
        (y - 1.106 * i + 1.703 * q).max(0.0),
    ]
}

pub fn seed_bits(u: &Uniforms) -> u32 {
    u.seed.to_bits()
}

/// Splat every particle onto camera rays, reading `prev` for trails and writing `next`.
#[allow(clippy::too_many_arguments)]
pub fn render_pass(
    prev: &RenderTarget,
    next: &mut RenderTarget,
    size: (usize, usize),
    camera: &CameraFrame,
    particles: &[Particle],
    uniforms: &Uniforms,
    frame: u64,
    trails: bool,
) {
    let (w, h) = size;
    next.reshape(w, h);
    if next.is_empty() {
        return;
    }

    let seed = seed_bits(uniforms);
    let core_r2 = GLOW_CORE * (0.5 + uniforms.texture_scale);
    let inv_core = 1.0 / core_r2;
    let tw = uniforms.texture_weights;

    let sprites: Vec<Sprite> = particles
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let weight = GLOW_GAIN * age_fade(p.age) * distance_falloff(p.position.length());
            if !(weight > 0.0) {
                return None;
            }
            let rel = p.position - camera.position;
            let c = particle_color(i, uniforms, seed);
            Some(Sprite {
                rel,
                rel_len2: rel.length_squared(),
                color: [c[0] * weight, c[1] * weight, c[2] * weight],
                speck: 0.5 + hash01(i as u32, 7, seed),
            })
        })
        .collect();

    let basis = camera.basis;
    let aspect = w as f32 / h as f32;
    let trail_src = (trails && prev.width == w && prev.height == h).then_some(prev);

    for y in 0..h {
        let v = 1.0 - (y as f32 + 0.5) / h as f32 * 2.0;
        for x in 0..w {
            let u = ((x as f32 + 0.5) / w as f32 * 2.0 - 1.0) * aspect;
            let dir = (basis.forward * FOCAL_LENGTH + basis.right * u + basis.up * v)
                .normalize_or_zero();

            let mut acc = [0.0f32; 3];
            for s in &sprites {
                let t = s.rel.dot(dir);
                if t <= 0.0 {
                    continue;
                }
                let q = (s.rel_len2 - t * t).max(0.0) * inv_core;
                let k = tw[0] * halo(q) + tw[1] * core(q) * s.speck + tw[2] * ring(q) + tw[3] * spike(q);
                acc[0] += s.color[0] * k;
                acc[1] += s.color[1] * k;
                acc[2] += s.color[2] * k;
            }

            let bg_t = 0.5 + 0.5 * v;
            for ch in 0..3 {
                let bg = uniforms.palette_b[ch] + (uniforms.palette_c[ch] - uniforms.palette_b[ch]) * bg_t;
                acc[ch] += bg * BACKGROUND_LEVEL;
            }

            let mut c = acc.map(|a| a.max(0.0).powf(uniforms.contrast));
            c = rotate_hue(c, uniforms.hue_shift);
            let n = hash01((y * w + x) as u32, frame as u32, seed) - 0.5;
            let g = (1.0 + uniforms.grain * 2.0 * n).max(0.0);
            c = c.map(|v| v * g);

            if let Some(prev) = trail_src {
                let p = prev.get(x, y);
                for ch in 0..3 {
                    c[ch] += p[ch] * TRAIL_DECAY;
                }
            }

            next.pixels[y * w + x] = c.map(|v| if v.is_finite() { v } else { 0.0 });
        }
    }
}
