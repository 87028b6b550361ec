use seedscape::questionnaire::{AnswerMap, Schema};
use seedscape::sim::camera::{
    camera_pass, CameraRegister, BOOTSTRAP_FRAMES, CAMERA_RADIUS, DEFAULT_AZIMUTH,
    DEFAULT_ELEVATION, POLAR_EPSILON,
};
use seedscape::sim::math::Vec3;
use seedscape::sim::particles::{
    advect_pass, elapsed, AdvectParams, Particle, ParticleBuffer, BOUND_RADIUS, SPAWN_RADIUS,
};
use seedscape::sim::render::{
    age_fade, distance_falloff, render_pass, Downscale, RenderTarget, FADE_IN_SECONDS,
    TRAIL_DECAY,
};
use seedscape::sim::tonemap::{encode, filmic, tonemap_pass};
use seedscape::sim::{FrameInput, PipelineConfig, PointerSample, SimulationPipeline};
use seedscape::synth::synthesize;
use seedscape::uniforms::Uniforms;

fn uniforms() -> Uniforms {
    let answers = AnswerMap::new()
        .with("intent", "Creation")
        .with("textures", ["Glass", "Smoke"])
        .with("motion", ["Spinning galaxies"]);
    Uniforms::bind(&synthesize(&Schema::onboarding(), &answers))
}

fn params() -> AdvectParams {
    AdvectParams {
        speed: 0.5,
        noise_scale: 1.5,
        flow: Vec3::ZERO,
        seed: 7,
    }
}

fn input(time: f64, viewport: [u32; 2], pointer: PointerSample) -> FrameInput {
    FrameInput {
        time,
        viewport,
        pointer,
    }
}

fn held(x: f32, y: f32) -> PointerSample {
    PointerSample { x, y, held: true }
}

fn released(x: f32, y: f32) -> PointerSample {
    PointerSample { x, y, held: false }
}

fn register(azimuth: f32, elevation: f32, pointer: [f32; 2], pointer_held: bool) -> CameraRegister {
    CameraRegister {
        azimuth,
        elevation,
        pointer,
        pointer_held,
        viewport: [100, 100],
    }
}

fn small_pipeline(particles: usize) -> SimulationPipeline {
    SimulationPipeline::new(
        uniforms(),
        PipelineConfig {
            particle_count: particles,
            trails: false,
            downscale: Downscale::default(),
        },
    )
}

// ── Advection ───────────────────────────────────────────────────────────────

#[test]
fn escaped_particle_respawns_inside_spawn_sphere() {
    let prev = ParticleBuffer {
        particles: vec![
            Particle {
                position: Vec3::new(BOUND_RADIUS + 0.5, 0.0, 0.0),
                age: 3.0,
            },
            Particle {
                position: Vec3::new(0.2, 0.1, -0.3),
                age: 1.0,
            },
        ],
        last_time: Some(1.0),
    };
    let mut next = ParticleBuffer::default();
    advect_pass(&prev, &mut next, 10, 1.1, &params());

    let reborn = next.particles[0];
    assert_eq!(reborn.age, 0.0);
    assert!(reborn.position.length() <= SPAWN_RADIUS + 1e-6);

    let moved = next.particles[1];
    assert!((moved.age - 1.1).abs() < 1e-5);
    assert_ne!(moved.position, prev.particles[1].position);
}

#[test]
fn non_finite_particle_respawns() {
    let prev = ParticleBuffer {
        particles: vec![Particle {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            age: 2.0,
        }],
        last_time: Some(0.0),
    };
    let mut next = ParticleBuffer::default();
    advect_pass(&prev, &mut next, 3, 0.1, &params());
    assert!(next.particles[0].position.is_finite());
    assert_eq!(next.particles[0].age, 0.0);
}

#[test]
fn frame_zero_fills_the_spawn_sphere() {
    let prev = ParticleBuffer::with_count(256);
    let mut next = ParticleBuffer::default();
    advect_pass(&prev, &mut next, 0, 0.0, &params());
    assert_eq!(next.len(), 256);
    assert_eq!(next.last_time, Some(0.0));
    for p in &next.particles {
        assert!(p.position.length() <= SPAWN_RADIUS + 1e-6);
        assert_eq!(p.age, 0.0);
    }
    let distinct = next
        .particles
        .iter()
        .filter(|p| p.position != next.particles[0].position)
        .count();
    assert!(distinct > 200);
}

#[test]
fn backwards_or_nan_time_holds_particles_still() {
    let prev = ParticleBuffer {
        particles: vec![Particle {
            position: Vec3::new(0.3, -0.2, 0.1),
            age: 0.5,
        }],
        last_time: Some(2.0),
    };
    for t in [1.5, f64::NAN, f64::NEG_INFINITY] {
        let mut next = ParticleBuffer::default();
        advect_pass(&prev, &mut next, 9, t, &params());
        assert_eq!(next.particles[0], prev.particles[0], "time {t}");
        assert_eq!(next.last_time, Some(2.0), "time {t}");
    }
}

#[test]
fn elapsed_ignores_degenerate_gaps() {
    assert_eq!(elapsed(None, 5.0), 0.0);
    assert_eq!(elapsed(Some(5.0), 4.0), 0.0);
    assert_eq!(elapsed(Some(5.0), f64::NAN), 0.0);
    assert!((elapsed(Some(5.0), 5.25) - 0.25).abs() < 1e-9);
}

// ── Camera ──────────────────────────────────────────────────────────────────

#[test]
fn released_pointer_leaves_angles_unchanged() {
    let prev = register(1.0, 1.5, [10.0, 10.0], false);
    let a = camera_pass(&prev, 20, &input(1.0, [100, 100], released(80.0, 40.0)));
    let b = camera_pass(&a.register, 21, &input(1.1, [100, 100], released(5.0, 95.0)));
    assert_eq!(a.register.azimuth, 1.0);
    assert_eq!(a.register.elevation, 1.5);
    assert_eq!(b.register.azimuth, a.register.azimuth);
    assert_eq!(b.register.elevation, a.register.elevation);
}

#[test]
fn press_frame_does_not_jump() {
    let prev = register(1.0, 1.5, [10.0, 10.0], false);
    let cam = camera_pass(&prev, 20, &input(1.0, [100, 100], held(90.0, 90.0)));
    assert_eq!(cam.register.azimuth, 1.0);
    assert_eq!(cam.register.elevation, 1.5);
    assert!(cam.register.pointer_held);
}

#[test]
fn drag_integrates_scaled_deltas() {
    let prev = register(1.0, 1.5, [50.0, 50.0], true);
    let cam = camera_pass(&prev, 20, &input(1.0, [100, 100], held(60.0, 40.0)));
    // dx = 0.1 of the width, dy = -0.1 of the height.
    assert!((cam.register.azimuth - 0.5).abs() < 1e-5);
    assert!((cam.register.elevation - 1.8).abs() < 1e-5);
    assert!((cam.position.length() - CAMERA_RADIUS).abs() < 1e-4);
}

#[test]
fn elevation_clamps_and_azimuth_wraps() {
    let prev = register(0.1, 0.2, [50.0, 0.0], true);
    let cam = camera_pass(&prev, 20, &input(1.0, [100, 100], held(90.0, 100.0)));
    assert_eq!(cam.register.elevation, POLAR_EPSILON);
    let tau = std::f32::consts::TAU;
    assert!(cam.register.azimuth >= 0.0 && cam.register.azimuth < tau);
    assert!((cam.register.azimuth - (0.1 - 2.0 + tau - POLAR_EPSILON)).abs() < 1e-4);
}

#[test]
fn tiny_negative_azimuth_wraps_to_zero() {
    let tau = std::f32::consts::TAU;
    for az in [-1e-8f32, -f32::MIN_POSITIVE, -0.0] {
        let prev = register(az, 1.5, [0.0, 0.0], false);
        let cam = camera_pass(&prev, 20, &input(1.0, [100, 100], released(0.0, 0.0)));
        assert!(cam.register.azimuth >= 0.0, "{az}");
        assert!(cam.register.azimuth < tau - POLAR_EPSILON, "{az} -> {}", cam.register.azimuth);
    }
}

#[test]
fn bootstrap_frames_force_default_orientation() {
    let prev = register(2.0, 0.7, [0.0, 0.0], true);
    for frame in 0..BOOTSTRAP_FRAMES {
        let cam = camera_pass(&prev, frame, &input(0.0, [100, 100], held(70.0, 70.0)));
        assert_eq!(cam.register.azimuth, DEFAULT_AZIMUTH);
        assert_eq!(cam.register.elevation, DEFAULT_ELEVATION);
    }
}

#[test]
fn non_finite_pointer_is_treated_as_released() {
    let prev = register(1.0, 1.5, [50.0, 50.0], true);
    let cam = camera_pass(&prev, 20, &input(1.0, [100, 100], held(f32::NAN, 10.0)));
    assert!(!cam.register.pointer_held);
    assert_eq!(cam.register.pointer, [50.0, 50.0]);
    assert_eq!(cam.register.azimuth, 1.0);
}

#[test]
fn resolution_change_is_flagged() {
    let prev = register(1.0, 1.5, [0.0, 0.0], false);
    let same = camera_pass(&prev, 20, &input(1.0, [100, 100], released(0.0, 0.0)));
    let grown = camera_pass(&prev, 20, &input(1.0, [200, 100], released(0.0, 0.0)));
    assert!(!same.resolution_changed);
    assert!(grown.resolution_changed);
}

#[test]
fn register_round_trips_through_texels() {
    let reg = register(0.75, 2.0, [12.0, 34.0], true);
    assert_eq!(CameraRegister::from_texels(reg.to_texels()), reg);
}

// ── Pipeline ────────────────────────────────────────────────────────────────

#[test]
fn downscale_picks_divisor_by_area() {
    let d = Downscale::default();
    assert_eq!(d.target_size([1920, 1080]), (960, 540));
    assert_eq!(d.target_size([1280, 720]), (320, 180));
    assert_eq!(d.target_size([64, 36]), (16, 9));
    assert_eq!(d.target_size([2, 2]), (1, 1));
    assert_eq!(d.target_size([0, 10]), (0, 0));
    assert_eq!(Downscale::full().target_size([64, 36]), (64, 36));
}

#[test]
fn step_presents_full_resolution_rgba() {
    let mut pipeline = small_pipeline(128);
    for i in 0..6 {
        pipeline.step(&input(i as f64 / 30.0, [64, 36], PointerSample::default()));
    }
    assert_eq!(pipeline.frame_index(), 6);
    assert_eq!(pipeline.presented_size(), (64, 36));
    let px = pipeline.presented();
    assert_eq!(px.len(), 64 * 36 * 4);
    assert!(px.chunks_exact(4).all(|p| p[3] == 255));
    assert_eq!(
        (pipeline.accumulator().width, pipeline.accumulator().height),
        (16, 9)
    );
    assert!(pipeline
        .accumulator()
        .pixels
        .iter()
        .all(|c| c.iter().all(|v| v.is_finite() && *v >= 0.0)));
}

#[test]
fn identical_inputs_give_identical_frames() {
    let mut a = small_pipeline(64);
    let mut b = small_pipeline(64);
    for i in 0..5 {
        let inp = input(i as f64 * 0.05, [48, 32], held(10.0 + i as f32, 12.0));
        let fa = a.step(&inp).to_vec();
        let fb = b.step(&inp).to_vec();
        assert_eq!(fa, fb, "frame {i}");
    }
}

#[test]
fn degenerate_host_input_keeps_state_finite() {
    let mut pipeline = small_pipeline(64);
    let samples = [
        input(0.0, [40, 20], PointerSample::default()),
        input(f64::NAN, [40, 20], held(f32::INFINITY, 3.0)),
        input(-50.0, [40, 20], held(1.0, f32::NAN)),
        input(1e12, [40, 20], held(1e30, -1e30)),
        input(1e12 + 0.1, [40, 20], held(-1e30, 1e30)),
    ];
    for s in &samples {
        pipeline.step(s);
    }
    let cam = pipeline.camera();
    assert!(cam.azimuth.is_finite() && cam.elevation.is_finite());
    assert!(pipeline
        .particles()
        .particles
        .iter()
        .all(|p| p.position.is_finite() && p.age.is_finite()));
}

#[test]
fn restart_returns_to_frame_zero() {
    let mut pipeline = small_pipeline(32);
    pipeline.set_trails(true);
    for i in 0..3 {
        pipeline.step(&input(i as f64, [16, 16], PointerSample::default()));
    }
    pipeline.restart();
    assert_eq!(pipeline.frame_index(), 0);
    assert!(pipeline.trails());
    assert!(pipeline.presented().is_empty());
}

#[test]
fn viewport_change_flags_the_camera_frame() {
    let mut pipeline = small_pipeline(16);
    pipeline.step(&input(0.0, [32, 16], PointerSample::default()));
    pipeline.step(&input(0.1, [32, 16], PointerSample::default()));
    assert_eq!(pipeline.last_camera().map(|c| c.resolution_changed), Some(false));
    pipeline.step(&input(0.2, [40, 16], PointerSample::default()));
    assert_eq!(pipeline.last_camera().map(|c| c.resolution_changed), Some(true));
    assert_eq!(pipeline.presented().len(), 40 * 16 * 4);
}

#[test]
fn trails_are_off_by_default_and_cleared_on_resize() {
    assert!(!PipelineConfig::default().trails);

    let config = |trails| PipelineConfig {
        particle_count: 24,
        trails,
        downscale: Downscale::full(),
    };
    let mut with = SimulationPipeline::new(uniforms(), config(true));
    let mut without = SimulationPipeline::new(uniforms(), config(false));
    let frames = [
        input(0.0, [24, 12], PointerSample::default()),
        input(0.1, [24, 12], PointerSample::default()),
        input(0.2, [30, 12], PointerSample::default()),
    ];

    with.step(&frames[0]);
    without.step(&frames[0]);
    assert_eq!(with.accumulator(), without.accumulator());

    with.step(&frames[1]);
    without.step(&frames[1]);
    assert_ne!(with.accumulator(), without.accumulator());

    // New size: the previous accumulator no longer feeds back.
    with.step(&frames[2]);
    without.step(&frames[2]);
    assert_eq!(with.accumulator(), without.accumulator());
}

#[test]
fn step_renders_at_half_or_quarter_resolution() {
    let mut pipeline = small_pipeline(1);
    pipeline.step(&input(0.0, [1281, 721], PointerSample::default()));
    let acc = pipeline.accumulator();
    assert_eq!((acc.width, acc.height), (640, 360));
    assert_eq!(pipeline.presented().len(), 1281 * 721 * 4);

    pipeline.step(&input(0.1, [1280, 720], PointerSample::default()));
    let acc = pipeline.accumulator();
    assert_eq!((acc.width, acc.height), (320, 180));
}

// ── Render and tonemap ──────────────────────────────────────────────────────

/// Uniforms with the per-pixel shaping disabled so outputs compare exactly.
fn flat_uniforms() -> Uniforms {
    let mut u = uniforms();
    u.contrast = 1.0;
    u.hue_shift = 0.0;
    u.grain = 0.0;
    u
}

fn default_camera() -> seedscape::sim::camera::CameraFrame {
    camera_pass(&CameraRegister::default(), 0, &input(0.0, [16, 16], released(0.0, 0.0)))
}

fn render(prev: &RenderTarget, particles: &[Particle], size: (usize, usize), trails: bool) -> RenderTarget {
    let mut next = RenderTarget::default();
    render_pass(prev, &mut next, size, &default_camera(), particles, &flat_uniforms(), 3, trails);
    next
}

#[test]
fn filmic_curve_is_anchored_monotonic_and_saturates() {
    assert_eq!(filmic(0.0), 0.0);
    assert_eq!(filmic(-2.0), 0.0);
    assert!((filmic(1.0) - 0.8038).abs() < 1e-3);
    assert_eq!(filmic(100.0), 1.0);
    assert_eq!(filmic(f32::INFINITY), 0.0);

    let mut last = 0.0;
    for i in 1..=200 {
        let v = filmic(i as f32 * 0.05);
        assert!(v >= last, "filmic dipped at {}", i as f32 * 0.05);
        last = v;
    }
}

#[test]
fn encode_applies_display_gamma() {
    assert_eq!(encode(0.0), 0);
    assert_eq!(encode(100.0), 255);
    // filmic(1) = 0.8038, 0.8038^(1/2.2) = 0.9055.
    assert!((230..=232).contains(&encode(1.0)), "{}", encode(1.0));
    // Gamma lifts mid tones above their linear value.
    let x = 0.1;
    assert!(encode(x) as f32 > filmic(x) * 255.0 + 1.0);
}

#[test]
fn tonemap_upsamples_and_fills_alpha() {
    let src = RenderTarget {
        width: 1,
        height: 1,
        pixels: vec![[100.0, 0.0, 1.0]],
    };
    let mut out = Vec::new();
    tonemap_pass(&src, 3, 2, &mut out);
    assert_eq!(out.len(), 3 * 2 * 4);
    for px in out.chunks_exact(4) {
        assert_eq!(px, [255, 0, encode(1.0), 255]);
    }

    tonemap_pass(&RenderTarget::default(), 2, 2, &mut out);
    assert_eq!(out, vec![0u8; 16]);
}

#[test]
fn age_and_distance_fades_bound_visibility() {
    assert_eq!(age_fade(0.0), 0.0);
    assert!((age_fade(FADE_IN_SECONDS * 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(age_fade(FADE_IN_SECONDS), 1.0);
    assert_eq!(age_fade(10.0), 1.0);

    assert_eq!(distance_falloff(0.0), 1.0);
    assert_eq!(distance_falloff(0.5 * BOUND_RADIUS), 1.0);
    assert_eq!(distance_falloff(BOUND_RADIUS), 0.0);
    assert_eq!(distance_falloff(BOUND_RADIUS * 2.0), 0.0);
    let mid = distance_falloff(0.75 * BOUND_RADIUS);
    assert!(mid > 0.0 && mid < 1.0);
}

#[test]
fn newborn_particle_is_invisible_until_it_ages() {
    let empty = render(&RenderTarget::default(), &[], (16, 16), false);
    let newborn = Particle {
        position: Vec3::ZERO,
        age: 0.0,
    };
    let grown = Particle {
        position: Vec3::ZERO,
        age: 1.0,
    };
    assert_eq!(render(&RenderTarget::default(), &[newborn], (16, 16), false), empty);

    let lit = render(&RenderTarget::default(), &[grown], (16, 16), false);
    let mut gained = 0.0;
    for (l, e) in lit.pixels.iter().zip(&empty.pixels) {
        for ch in 0..3 {
            assert!(l[ch] >= e[ch]);
            gained += l[ch] - e[ch];
        }
    }
    assert!(gained > 1e-4, "glow added {gained}");
}

#[test]
fn trails_add_decayed_previous_frame() {
    let particles = [Particle {
        position: Vec3::new(0.1, 0.2, 0.0),
        age: 2.0,
    }];
    let first = render(&RenderTarget::default(), &particles, (12, 8), false);

    let trailed = render(&first, &particles, (12, 8), true);
    for (t, f) in trailed.pixels.iter().zip(&first.pixels) {
        for ch in 0..3 {
            let expect = f[ch] + f[ch] * TRAIL_DECAY;
            assert!((t[ch] - expect).abs() <= 1e-6 * expect.max(1.0));
        }
    }

    assert_eq!(render(&first, &particles, (12, 8), false), first);
    // A previous frame of another size is ignored.
    let other = render(&RenderTarget::default(), &particles, (6, 4), false);
    assert_eq!(render(&other, &particles, (12, 8), true), first);
}
