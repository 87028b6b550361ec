use crate::sim::render::RenderTarget;

pub const GAMMA: f32 = 2.2;

/// ACES filmic fit (Narkowicz), clamped to [0, 1].
pub fn filmic(x: f32) -> f32 {
    let x = x.max(0.0);
    let v = (x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14);
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

pub fn encode(x: f32) -> u8 {
    (filmic(x).powf(1.0 / GAMMA) * 255.0 + 0.5) as u8
}

fn sample_bilinear(src: &RenderTarget, fx: f32, fy: f32) -> [f32; 3] {
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;
    let fx = fx.clamp(0.0, max_x);
    let fy = fy.clamp(0.0, max_y);
    let (x0, y0) = (fx.floor() as usize, fy.floor() as usize);
    let (x1, y1) = ((x0 + 1).min(src.width - 1), (y0 + 1).min(src.height - 1));
    let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
    let (a, b, c, d) = (src.get(x0, y0), src.get(x1, y0), src.get(x0, y1), src.get(x1, y1));
    let mut out = [0.0f32; 3];
    for ch in 0..3 {
        let top = a[ch] + (b[ch] - a[ch]) * tx;
        let bot = c[ch] + (d[ch] - c[ch]) * tx;
        out[ch] = top + (bot - top) * ty;
    }
    out
}

/// Upsample radiance to the viewport and encode it as RGBA8.
pub fn tonemap_pass(src: &RenderTarget, width: usize, height: usize, out: &mut Vec<u8>) {
    let n = width.saturating_mul(height).saturating_mul(4);
    out.resize(n, 0);
    if src.is_empty() {
        out.fill(0);
        return;
    }

    let sx = src.width as f32 / width.max(1) as f32;
    let sy = src.height as f32 / height.max(1) as f32;
    for y in 0..height {
        let fy = (y as f32 + 0.5) * sy - 0.5;
        for x in 0..width {
            let fx = (x as f32 + 0.5) * sx - 0.5;
            let c = sample_bilinear(src, fx, fy);
            let i = (y * width + x) * 4;
            out[i] = encode(c[0]);
            out[i + 1] = encode(c[1]);
            out[i + 2] = encode(c[2]);
            out[i + 3] = 255;
        }
    }
}
