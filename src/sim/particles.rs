use crate::sim::math::{hash_u32, Vec3};
use crate::sim::noise::curl;

pub const DEFAULT_PARTICLE_COUNT: usize = 2048;
pub const SPAWN_RADIUS: f32 = 1.0;
pub const BOUND_RADIUS: f32 = 2.4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub age: f32,
}

/// One frame's copy of the particle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffer {
    pub particles: Vec<Particle>,
    /// Host time the buffer was last advanced at.
    pub last_time: Option<f64>,
}

impl ParticleBuffer {
    pub fn with_count(count: usize) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            last_time: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectParams {
    pub speed: f32,
    pub noise_scale: f32,
    /// Domain offset of the noise field at the current time.
    pub flow: Vec3,
    pub seed: u32,
}

/// Elapsed time since the last advance; degenerate or negative gaps are zero.
pub fn elapsed(last: Option<f64>, now: f64) -> f32 {
    let Some(last) = last else {
        return 0.0;
    };
    let dt = now - last;
    if !dt.is_finite() || dt < 0.0 {
        tracing::warn!(now, last, "degenerate frame time, holding particles still");
        return 0.0;
    }
    dt as f32
}

fn spawn_seed(seed: u32, index: usize, time: f64) -> u64 {
    let t = time.to_bits();
    let lo = hash_u32(index as u32, t as u32, seed);
    let hi = hash_u32((t >> 32) as u32, lo, seed ^ 0x85EB_CA6B);
    ((hi as u64) << 32) | lo as u64
}

/// Uniform point inside a ball of `radius`.
pub fn random_in_sphere(rng: &mut fastrand::Rng, radius: f32) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.f32() * 2.0 - 1.0,
            rng.f32() * 2.0 - 1.0,
            rng.f32() * 2.0 - 1.0,
        );
        if p.length_squared() <= 1.0 {
            return p * radius;
        }
    }
}

fn respawn(seed: u32, index: usize, time: f64) -> Particle {
    let mut rng = fastrand::Rng::with_seed(spawn_seed(seed, index, time));
    Particle {
        position: random_in_sphere(&mut rng, SPAWN_RADIUS),
        age: 0.0,
    }
}

/// Advance every particle through the curl field, reading `prev` and writing `next`.
pub fn advect_pass(
    prev: &ParticleBuffer,
    next: &mut ParticleBuffer,
    frame: u64,
    time: f64,
    params: &AdvectParams,
) {
    let count = prev.particles.len();
    next.particles.resize(count, Particle::default());

    if frame == 0 {
        for (i, p) in next.particles.iter_mut().enumerate() {
            *p = respawn(params.seed, i, time);
        }
        next.last_time = time.is_finite().then_some(time);
        return;
    }

    let dt = elapsed(prev.last_time, time);
    let step = params.speed * dt;
    let mut respawned = 0usize;

    for (i, (src, dst)) in prev.particles.iter().zip(next.particles.iter_mut()).enumerate() {
        let pos = src.position;
        if !pos.is_finite() || pos.length() > BOUND_RADIUS {
            *dst = respawn(params.seed, i, time);
            respawned += 1;
            continue;
        }
        let v = curl(pos * params.noise_scale + params.flow);
        let moved = pos + v * step;
        if !moved.is_finite() {
            *dst = respawn(params.seed, i, time);
            respawned += 1;
            continue;
        }
        *dst = Particle {
            position: moved,
            age: src.age + dt,
        };
    }

    next.last_time = match prev.last_time {
        Some(last) if !(time >= last) => Some(last),
        _ if time.is_finite() => Some(time),
        last => last,
    };
    tracing::trace!(frame, dt, respawned, "advected particles");
}
