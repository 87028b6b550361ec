use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cfg = seedscape::config::Config::parse();
    // The preview owns the screen, so it only logs when given a file.
    if cfg.print_uniforms || cfg.log_file.is_some() {
        seedscape::logging::init(cfg.log_file.as_deref(), "warn")?;
    }

    let session = cfg.load_session().context("load questionnaire")?;
    if cfg.print_uniforms {
        let json = serde_json::to_string_pretty(&session.uniforms).context("encode uniforms")?;
        println!("{json}");
        return Ok(());
    }

    seedscape::app::run(cfg, session)
}
