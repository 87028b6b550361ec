use crate::questionnaire::LoadError;
use crate::session::Session;
use crate::sim::particles::DEFAULT_PARTICLE_COUNT;
use crate::sim::render::Downscale;
use crate::sim::PipelineConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "seedscape",
    version,
    about = "Questionnaire-seeded curl-noise particle visual for the terminal"
)]
pub struct Config {
    /// Questionnaire answers (JSON object of field -> value).
    #[arg(long, value_name = "JSON")]
    pub answers: Option<PathBuf>,

    /// Field schema (JSON); the built-in onboarding schema when omitted.
    #[arg(long, value_name = "JSON")]
    pub schema: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<f64>,

    #[arg(long)]
    pub seed_phrase: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PARTICLE_COUNT)]
    pub particles: usize,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = false)]
    pub trails: bool,

    /// Render at terminal resolution instead of the downscaled accumulator.
    #[arg(long, default_value_t = false)]
    pub full_res: bool,

    /// Print the bound uniform set as JSON and exit.
    #[arg(long, default_value_t = false)]
    pub print_uniforms: bool,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
}

impl Config {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            particle_count: self.particles.max(1),
            trails: self.trails,
            downscale: if self.full_res {
                Downscale::full()
            } else {
                Downscale::default()
            },
        }
    }

    pub fn load_session(&self) -> Result<Session, LoadError> {
        Session::load(
            self.schema.as_deref(),
            self.answers.as_deref(),
            self.seed,
            self.seed_phrase.as_deref(),
        )
    }
}
