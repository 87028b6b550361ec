use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use seedscape::session::Session;
use seedscape::sim::particles::DEFAULT_PARTICLE_COUNT;
use seedscape::sim::render::Downscale;
use seedscape::sim::{FrameInput, PipelineConfig, PointerSample, SimulationPipeline};

const DEFAULT_OUTPUT_DIR: &str = "frames";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "export_frames",
    version,
    about = "Offline deterministic export (questionnaire -> PPM frame sequence)"
)]
pub(crate) struct Cli {
    #[arg(long, value_name = "JSON")]
    pub(crate) answers: Option<PathBuf>,

    #[arg(long, value_name = "JSON")]
    pub(crate) schema: Option<PathBuf>,

    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub(crate) out: PathBuf,

    #[arg(long, default_value_t = 640)]
    pub(crate) width: u32,

    #[arg(long, default_value_t = 360)]
    pub(crate) height: u32,

    #[arg(long, default_value_t = 30)]
    pub(crate) fps: u32,

    #[arg(long, default_value_t = 120)]
    pub(crate) frames: usize,

    #[arg(long, default_value_t = DEFAULT_PARTICLE_COUNT)]
    pub(crate) particles: usize,

    #[arg(long, default_value_t = false)]
    pub(crate) trails: bool,

    #[arg(long, default_value_t = false)]
    pub(crate) full_res: bool,

    #[arg(long)]
    pub(crate) seed: Option<f64>,

    #[arg(long)]
    pub(crate) seed_phrase: Option<String>,

    /// Simulated horizontal drag in pixels per frame (0 keeps the camera still).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub(crate) orbit: f32,

    #[arg(long, value_name = "PATH")]
    pub(crate) log_file: Option<PathBuf>,
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be >= 1");
    }
    if args.height == 0 {
        bail!("--height must be >= 1");
    }
    if args.fps == 0 {
        bail!("--fps must be >= 1");
    }
    if args.frames == 0 {
        bail!("--frames must be >= 1");
    }
    if args.particles == 0 {
        bail!("--particles must be >= 1");
    }
    if !args.orbit.is_finite() {
        bail!("--orbit must be finite");
    }
    Ok(())
}

/// Synthetic session time for frame `index`.
pub(crate) fn frame_time(index: usize, fps: u32) -> f64 {
    index as f64 / fps.max(1) as f64
}

pub(crate) fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.ppm"))
}

/// Pointer for frame `index`: held from frame 0, moving `orbit` pixels per frame from the centre.
pub(crate) fn orbit_pointer(index: usize, orbit: f32, viewport: [u32; 2]) -> PointerSample {
    if orbit == 0.0 {
        return PointerSample::default();
    }
    PointerSample {
        x: viewport[0] as f32 * 0.5 + orbit * index as f32,
        y: viewport[1] as f32 * 0.5,
        held: true,
    }
}

/// Binary PPM (P6); alpha is dropped.
pub(crate) fn write_ppm(sink: &mut dyn Write, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    let needed = width * height * 4;
    if rgba.len() < needed {
        bail!("frame has {} bytes, need {needed}", rgba.len());
    }
    write!(sink, "P6\n{width} {height}\n255\n")?;
    let mut row = Vec::with_capacity(width * 3);
    for y in 0..height {
        row.clear();
        for px in rgba[y * width * 4..(y + 1) * width * 4].chunks_exact(4) {
            row.extend_from_slice(&px[..3]);
        }
        sink.write_all(&row)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    seedscape::logging::init(args.log_file.as_deref(), "warn")?;
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;

    let session = Session::load(
        args.schema.as_deref(),
        args.answers.as_deref(),
        args.seed,
        args.seed_phrase.as_deref(),
    )
    .context("load questionnaire")?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output directory {}", args.out.display()))?;

    let config = PipelineConfig {
        particle_count: args.particles,
        trails: args.trails,
        downscale: if args.full_res {
            Downscale::full()
        } else {
            Downscale::default()
        },
    };
    let mut pipeline = SimulationPipeline::new(session.uniforms.clone(), config);
    let viewport = [args.width, args.height];
    let (w, h) = (args.width as usize, args.height as usize);

    let start = Instant::now();
    for index in 0..args.frames {
        let input = FrameInput {
            time: frame_time(index, args.fps),
            viewport,
            pointer: orbit_pointer(index, args.orbit, viewport),
        };
        let pixels = pipeline.step(&input);

        let path = frame_path(&args.out, index);
        let file = fs::File::create(&path)
            .with_context(|| format!("create {}", path.display()))?;
        let mut sink = BufWriter::new(file);
        write_ppm(&mut sink, w, h, pixels).with_context(|| format!("write {}", path.display()))?;
        sink.flush().with_context(|| format!("flush {}", path.display()))?;
    }
    tracing::info!(
        frames = args.frames,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "export done"
    );

    println!(
        "exported {} frames @ {} fps ({}x{}, intent {}) -> {}",
        args.frames,
        args.fps,
        args.width,
        args.height,
        session.intent_label(),
        args.out.display()
    );
    Ok(())
}
