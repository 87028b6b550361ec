use crate::config::{Config, RendererMode};
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::session::Session;
use crate::sim::{FrameInput, PointerSample, SimulationPipeline};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::io::BufWriter;
use std::time::{Duration, Instant};

pub fn run(cfg: Config, session: Session) -> anyhow::Result<()> {
    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let (px_w, px_h) = renderer.cell_pixels();

    let mut pipeline = SimulationPipeline::new(session.uniforms.clone(), cfg.pipeline_config());
    tracing::info!(
        renderer = renderer.name(),
        particles = pipeline.config().particle_count,
        intent = session.intent_label(),
        "preview start"
    );

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let start = Instant::now();
    let mut fps = FpsCounter::new();
    let mut pointer = PointerState::default();

    loop {
        let now = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match key_action(k.code, k.modifiers) {
                        KeyAction::Quit => {
                            tracing::info!(frames = pipeline.frame_index(), "preview quit");
                            return Ok(());
                        }
                        KeyAction::ToggleTrails => {
                            let on = !pipeline.trails();
                            pipeline.set_trails(on);
                            tracing::debug!(trails = on, "trails toggled");
                        }
                        KeyAction::Restart => {
                            pipeline.restart();
                            tracing::debug!("simulation restarted");
                        }
                        KeyAction::None => {}
                    }
                }
                Event::Mouse(m) => pointer.apply(&m, px_w, px_h),
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }

        let (term_cols, term_rows) = last_size;
        let hud_rows = hud_rows_for_size(last_size);
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = term_cols as usize * px_w;
        let h = visual_rows as usize * px_h;

        let input = FrameInput {
            time: start.elapsed().as_secs_f64(),
            viewport: [w as u32, h as u32],
            pointer: pointer.sample(),
        };
        pipeline.step(&input);

        let hud = hud_text(&session, &pipeline, fps.fps(), renderer.name());
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pipeline.presented(),
            hud: &hud,
            hud_rows,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    None,
    Quit,
    ToggleTrails,
    Restart,
}

fn key_action(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('t') => KeyAction::ToggleTrails,
        KeyCode::Char('r') => KeyAction::Restart,
        _ => KeyAction::None,
    }
}

/// Left-button drag state in accumulator pixels.
#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    x: f32,
    y: f32,
    held: bool,
}

impl PointerState {
    fn apply(&mut self, m: &MouseEvent, px_w: usize, px_h: usize) {
        let x = (m.column as f32 + 0.5) * px_w as f32;
        let y = (m.row as f32 + 0.5) * px_h as f32;
        match m.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.held = true;
                self.x = x;
                self.y = y;
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.x = x;
                self.y = y;
            }
            MouseEventKind::Up(MouseButton::Left) => self.held = false,
            _ => {}
        }
    }

    fn sample(&self) -> PointerSample {
        PointerSample {
            x: self.x,
            y: self.y,
            held: self.held,
        }
    }
}

fn hud_rows_for_size(size: (u16, u16)) -> u16 {
    if size.1 <= 1 { 0 } else { 1 }
}

fn hud_text(session: &Session, pipeline: &SimulationPipeline, fps: f32, renderer: &str) -> String {
    let cam = pipeline.camera();
    format!(
        "Intent: {} | Seed: {:.3} | Particles: {} | Trails: {} | Cam: {:>5.2}/{:>4.2} | {} | FPS: {:>4.1} | drag orbit, t trails, r restart, q quit",
        session.intent_label(),
        pipeline.uniforms().seed,
        pipeline.particles().len(),
        if pipeline.trails() { "on" } else { "off" },
        cam.azimuth,
        cam.elevation,
        renderer,
        fps,
    )
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quit_keys() {
        assert_eq!(key_action(KeyCode::Char('q'), KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Esc, KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Char('c'), KeyModifiers::NONE), KeyAction::None);
        assert_eq!(key_action(KeyCode::Char('t'), KeyModifiers::NONE), KeyAction::ToggleTrails);
        assert_eq!(key_action(KeyCode::Char('r'), KeyModifiers::NONE), KeyAction::Restart);
    }

    #[test]
    fn pointer_tracks_left_drag() {
        let mut p = PointerState::default();
        p.apply(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 2), 1, 2);
        assert!(p.held);
        assert_eq!((p.x, p.y), (3.5, 5.0));

        p.apply(&mouse(MouseEventKind::Drag(MouseButton::Left), 10, 2), 1, 2);
        assert!(p.sample().held);
        assert_eq!(p.sample().x, 10.5);

        p.apply(&mouse(MouseEventKind::Up(MouseButton::Left), 10, 2), 1, 2);
        assert!(!p.sample().held);

        p.apply(&mouse(MouseEventKind::Down(MouseButton::Right), 0, 0), 1, 2);
        assert!(!p.held);
    }

    #[test]
    fn hud_needs_two_rows() {
        assert_eq!(hud_rows_for_size((80, 1)), 0);
        assert_eq!(hud_rows_for_size((80, 24)), 1);
    }
}
