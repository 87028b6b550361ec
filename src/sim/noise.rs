use crate::sim::math::{hash01, Vec3};

/// Offset between the two noise channels feeding the curl.
pub const CHANNEL_OFFSET: Vec3 = Vec3::new(97.3, 41.9, 63.1);
/// Central-difference step for the noise gradients.
pub const CURL_EPSILON: f32 = 1e-2;

const CHANNEL_SEEDS: [u32; 2] = [0x51ED_270B, 0xA3C5_9AC3];

fn lattice(x: i32, y: i32, z: i32, channel: u32) -> f32 {
    hash01(x as u32, (y as u32).wrapping_mul(0x27D4_EB2D) ^ z as u32, channel)
}

fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Trilinearly interpolated lattice noise in [0, 1].
pub fn value_noise(p: Vec3, channel: usize) -> f32 {
    let seed = CHANNEL_SEEDS[channel % CHANNEL_SEEDS.len()];
    let (fx, fy, fz) = (p.x.floor(), p.y.floor(), p.z.floor());
    let (ix, iy, iz) = (fx as i32, fy as i32, fz as i32);
    let (tx, ty, tz) = (fade(p.x - fx), fade(p.y - fy), fade(p.z - fz));

    let c = |dx: i32, dy: i32, dz: i32| {
        lattice(ix.wrapping_add(dx), iy.wrapping_add(dy), iz.wrapping_add(dz), seed)
    };
    let x00 = mix(c(0, 0, 0), c(1, 0, 0), tx);
    let x10 = mix(c(0, 1, 0), c(1, 1, 0), tx);
    let x01 = mix(c(0, 0, 1), c(1, 0, 1), tx);
    let x11 = mix(c(0, 1, 1), c(1, 1, 1), tx);
    mix(mix(x00, x10, ty), mix(x01, x11, ty), tz)
}

pub fn gradient(p: Vec3, channel: usize) -> Vec3 {
    let e = CURL_EPSILON;
    let inv = 1.0 / (2.0 * e);
    let dx = Vec3::new(e, 0.0, 0.0);
    let dy = Vec3::new(0.0, e, 0.0);
    let dz = Vec3::new(0.0, 0.0, e);
    Vec3::new(
        (value_noise(p + dx, channel) - value_noise(p - dx, channel)) * inv,
        (value_noise(p + dy, channel) - value_noise(p - dy, channel)) * inv,
        (value_noise(p + dz, channel) - value_noise(p - dz, channel)) * inv,
    )
}

/// Unit-length curl direction: cross product of two independent noise gradients.
pub fn curl(p: Vec3) -> Vec3 {
    let a = gradient(p, 0);
    let b = gradient(p + CHANNEL_OFFSET, 1);
    a.cross(b).normalize_or_zero()
}
