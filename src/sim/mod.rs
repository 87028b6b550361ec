//! Per-frame simulation: Camera -> Advection -> Render -> Tonemap.
//!
//! Each pass reads last frame's copy of its own state (plus this frame's upstream outputs) and
//! writes this frame's copy; the front/back pairs below are swapped once a pass has run.

pub mod camera;
pub mod math;
pub mod noise;
pub mod particles;
pub mod render;
pub mod tonemap;

use crate::synth::tables::{MOTION_DRIFT, MOTION_FLOW, MOTION_PULSE, MOTION_SWIRL};
use crate::uniforms::Uniforms;
use camera::{camera_pass, CameraFrame, CameraRegister};
use math::Vec3;
use particles::{advect_pass, AdvectParams, ParticleBuffer, DEFAULT_PARTICLE_COUNT};
use render::{render_pass, seed_bits, Downscale, RenderTarget};
use tonemap::tonemap_pass;

/// Rate at which the noise domain scrolls, per unit of `warp`.
pub const FLOW_RATE: f32 = 0.05;

/// Scroll direction of the noise field for each motion bucket.
pub const MOTION_AXES: [Vec3; 4] = {
    let mut axes = [Vec3::ZERO; 4];
    axes[MOTION_FLOW] = Vec3::new(1.0, 0.0, 0.0);
    axes[MOTION_DRIFT] = Vec3::new(0.0, 0.0, 1.0);
    axes[MOTION_PULSE] = Vec3::new(0.0, 1.0, 0.0);
    axes[MOTION_SWIRL] = Vec3::new(-0.577_350_26, 0.577_350_26, 0.577_350_26);
    axes
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub held: bool,
}

/// Host samples for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Monotonic seconds since the session started.
    pub time: f64,
    /// Viewport size in pixels.
    pub viewport: [u32; 2],
    pub pointer: PointerSample,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub particle_count: usize,
    pub trails: bool,
    pub downscale: Downscale,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            trails: false,
            downscale: Downscale::default(),
        }
    }
}

/// Noise-domain offset at time `t`.
pub fn flow_offset(uniforms: &Uniforms, t: f32) -> Vec3 {
    let mut dir = Vec3::ZERO;
    for (w, axis) in uniforms.motion_weights.iter().zip(MOTION_AXES) {
        dir += axis * *w;
    }
    dir * (t * uniforms.warp * FLOW_RATE)
}

pub struct SimulationPipeline {
    uniforms: Uniforms,
    config: PipelineConfig,
    frame: u64,

    camera: CameraRegister,
    last_camera: Option<CameraFrame>,
    particles_front: ParticleBuffer,
    particles_back: ParticleBuffer,
    render_front: RenderTarget,
    render_back: RenderTarget,
    presented: Vec<u8>,
    presented_size: (usize, usize),
}

impl SimulationPipeline {
    pub fn new(uniforms: Uniforms, config: PipelineConfig) -> Self {
        let count = config.particle_count;
        Self {
            uniforms,
            config,
            frame: 0,
            camera: CameraRegister::default(),
            last_camera: None,
            particles_front: ParticleBuffer::with_count(count),
            particles_back: ParticleBuffer::with_count(count),
            render_front: RenderTarget::default(),
            render_back: RenderTarget::default(),
            presented: Vec::new(),
            presented_size: (0, 0),
        }
    }

    /// Drop all feedback state; the next step is frame 0 again.
    pub fn restart(&mut self) {
        *self = Self::new(self.uniforms.clone(), self.config);
    }

    pub fn set_trails(&mut self, on: bool) {
        self.config.trails = on;
    }

    pub fn trails(&self) -> bool {
        self.config.trails
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Index of the next frame to run.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn camera(&self) -> &CameraRegister {
        &self.camera
    }

    pub fn last_camera(&self) -> Option<&CameraFrame> {
        self.last_camera.as_ref()
    }

    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles_front
    }

    pub fn accumulator(&self) -> &RenderTarget {
        &self.render_front
    }

    pub fn presented(&self) -> &[u8] {
        &self.presented
    }

    pub fn presented_size(&self) -> (usize, usize) {
        self.presented_size
    }

    /// Run all four passes once and return the presented RGBA frame.
    pub fn step(&mut self, input: &FrameInput) -> &[u8] {
        let frame = self.frame;

        let cam = camera_pass(&self.camera, frame, input);
        let render_size = self.config.downscale.target_size(input.viewport);
        if cam.resolution_changed {
            tracing::debug!(
                frame,
                viewport = ?input.viewport,
                render = ?render_size,
                "viewport changed"
            );
        }

        let t = if input.time.is_finite() { input.time as f32 } else { 0.0 };
        let params = AdvectParams {
            speed: self.uniforms.speed,
            noise_scale: self.uniforms.noise_scale,
            flow: flow_offset(&self.uniforms, t),
            seed: seed_bits(&self.uniforms),
        };
        advect_pass(&self.particles_front, &mut self.particles_back, frame, input.time, &params);
        std::mem::swap(&mut self.particles_front, &mut self.particles_back);

        let trails = self.config.trails && !cam.resolution_changed;
        render_pass(
            &self.render_front,
            &mut self.render_back,
            render_size,
            &cam,
            &self.particles_front.particles,
            &self.uniforms,
            frame,
            trails,
        );
        std::mem::swap(&mut self.render_front, &mut self.render_back);

        let (vw, vh) = (input.viewport[0] as usize, input.viewport[1] as usize);
        tonemap_pass(&self.render_front, vw, vh, &mut self.presented);
        self.presented_size = (vw, vh);

        self.camera = cam.register;
        self.last_camera = Some(cam);
        self.frame += 1;
        tracing::trace!(frame, "pipeline step");
        &self.presented
    }
}
