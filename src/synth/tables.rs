//! Fixed lookup data for parameter synthesis. Everything here is plain immutable data so the
//! mappings can be audited and tested without running the synthesizer.

use super::{Axes, Axis};

pub const FIELD_INTENT: &str = "intent";
pub const FIELD_RHYTHM: &str = "rhythm";
pub const FIELD_TEXTURES: &str = "textures";
pub const FIELD_MOTION: &str = "motion";
pub const FIELD_COLORS: &str = "colors";
pub const FIELD_TEMPO: &str = "tempo";
pub const FIELD_DETAIL: &str = "detail";
pub const FIELD_NIGHT_OWL: &str = "night_owl";
pub const FIELD_ACCENT: &str = "accent";

/// Reserved answer keys outside the questionnaire schema.
pub const KEY_SEED: &str = "seed";
pub const KEY_SEED_PHRASE: &str = "seed_phrase";

const fn rgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

const fn axes(
    energy: f32,
    calm: f32,
    novelty: f32,
    focus: f32,
    warmth: f32,
    structure: f32,
) -> Axes {
    Axes {
        energy,
        calm,
        novelty,
        focus,
        warmth,
        structure,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentPreset {
    pub name: &'static str,
    pub axes: Axes,
    pub palette: [[f32; 3]; 3],
}

pub const INTENT_PRESETS: [IntentPreset; 5] = [
    IntentPreset {
        name: "Exploration",
        axes: axes(0.6, 0.5, 0.9, 0.4, 0.55, 0.35),
        palette: [rgb8(0xf0, 0x6d, 0x45), rgb8(0x3a, 0x86, 0x9d), rgb8(0xf6, 0xd9, 0x9a)],
    },
    IntentPreset {
        name: "Focus",
        axes: axes(0.45, 0.6, 0.35, 0.9, 0.45, 0.75),
        palette: [rgb8(0x3c, 0x65, 0xce), rgb8(0x1e, 0x30, 0x5c), rgb8(0xc7, 0xda, 0xf4)],
    },
    IntentPreset {
        name: "Restoration",
        axes: axes(0.2, 0.9, 0.35, 0.5, 0.6, 0.5),
        palette: [rgb8(0x6f, 0xb3, 0x97), rgb8(0x44, 0x76, 0x8a), rgb8(0xed, 0xe6, 0xd1)],
    },
    IntentPreset {
        name: "Play",
        axes: axes(0.85, 0.35, 0.75, 0.35, 0.7, 0.3),
        palette: [rgb8(0xfc, 0x5d, 0x93), rgb8(0xfe, 0xc4, 0x32), rgb8(0x4f, 0xcc, 0xde)],
    },
    IntentPreset {
        name: "Creation",
        axes: axes(0.7, 0.45, 0.8, 0.55, 0.65, 0.45),
        palette: [rgb8(0x9e, 0x4f, 0xe3), rgb8(0xf2, 0x74, 0x5a), rgb8(0xfe, 0xe0, 0xb3)],
    },
];

/// Axes used when the intent answer is absent or unknown.
pub const FALLBACK_AXES: Axes = axes(0.55, 0.55, 0.55, 0.55, 0.55, 0.55);

pub fn intent_preset(answer: &str) -> Option<&'static IntentPreset> {
    let needle = answer.trim();
    INTENT_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Density(&'static str),
    Variety(&'static str),
    /// Normalized answer minus normalized default.
    Offset(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    pub axis: Axis,
    pub coeff: f32,
    pub term: Term,
}

const fn p(axis: Axis, coeff: f32, term: Term) -> Perturbation {
    Perturbation { axis, coeff, term }
}

pub const AXIS_PERTURBATIONS: &[Perturbation] = &[
    p(Axis::Energy, 0.25, Term::Density(FIELD_RHYTHM)),
    p(Axis::Energy, 0.15, Term::Density(FIELD_MOTION)),
    p(Axis::Energy, 0.20, Term::Offset(FIELD_TEMPO)),
    p(Axis::Calm, -0.20, Term::Density(FIELD_RHYTHM)),
    p(Axis::Calm, -0.10, Term::Density(FIELD_MOTION)),
    p(Axis::Calm, -0.20, Term::Offset(FIELD_TEMPO)),
    p(Axis::Calm, 0.10, Term::Offset(FIELD_NIGHT_OWL)),
    p(Axis::Novelty, 0.20, Term::Variety(FIELD_TEXTURES)),
    p(Axis::Novelty, 0.15, Term::Variety(FIELD_MOTION)),
    p(Axis::Novelty, 0.10, Term::Density(FIELD_COLORS)),
    p(Axis::Focus, 0.25, Term::Offset(FIELD_DETAIL)),
    p(Axis::Focus, -0.10, Term::Density(FIELD_RHYTHM)),
    p(Axis::Warmth, 0.15, Term::Density(FIELD_COLORS)),
    p(Axis::Warmth, 0.10, Term::Variety(FIELD_COLORS)),
    p(Axis::Warmth, -0.10, Term::Offset(FIELD_NIGHT_OWL)),
    p(Axis::Structure, 0.20, Term::Density(FIELD_TEXTURES)),
    p(Axis::Structure, 0.20, Term::Offset(FIELD_DETAIL)),
    p(Axis::Structure, -0.15, Term::Variety(FIELD_RHYTHM)),
];

pub const WARM_ANCHORS: [[f32; 3]; 3] = [[0.96, 0.55, 0.30], [0.91, 0.32, 0.38], [0.99, 0.83, 0.52]];
pub const COOL_ANCHORS: [[f32; 3]; 3] = [[0.26, 0.52, 0.92], [0.36, 0.30, 0.78], [0.55, 0.86, 0.90]];

/// Brightness range applied to anchor A (indexed by `1 - calm`) when no accent colour is given.
pub const ANCHOR_BRIGHTNESS: (f32, f32) = (0.85, 1.15);
/// How far the accent colour pulls anchors A and B.
pub const ACCENT_BLEND: [f32; 2] = [0.6, 0.3];
/// Share of the intent palette in the final anchors.
pub const INTENT_PALETTE_BLEND: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketEntry {
    pub label: &'static str,
    pub buckets: &'static [(usize, f32)],
}

const fn b(label: &'static str, buckets: &'static [(usize, f32)]) -> BucketEntry {
    BucketEntry { label, buckets }
}

pub const TEXTURE_SMOOTH: usize = 0;
pub const TEXTURE_GRAIN: usize = 1;
pub const TEXTURE_ORGANIC: usize = 2;
pub const TEXTURE_CRYSTAL: usize = 3;

pub const TEXTURE_BUCKETS: &[BucketEntry] = &[
    b("Silk", &[(TEXTURE_SMOOTH, 1.0)]),
    b("Linen", &[(TEXTURE_SMOOTH, 0.5), (TEXTURE_GRAIN, 1.0)]),
    b("Stone", &[(TEXTURE_GRAIN, 1.0), (TEXTURE_CRYSTAL, 0.5)]),
    b("Moss", &[(TEXTURE_ORGANIC, 1.0), (TEXTURE_GRAIN, 0.5)]),
    b("Glass", &[(TEXTURE_CRYSTAL, 1.0), (TEXTURE_SMOOTH, 0.5)]),
    b("Smoke", &[(TEXTURE_SMOOTH, 1.0), (TEXTURE_ORGANIC, 0.5)]),
    b("Sand", &[(TEXTURE_GRAIN, 1.0)]),
    b("Metal", &[(TEXTURE_CRYSTAL, 1.0)]),
];
pub const TEXTURE_DEFAULT: [f32; 4] = [0.35, 0.25, 0.2, 0.2];

pub const MOTION_FLOW: usize = 0;
pub const MOTION_DRIFT: usize = 1;
pub const MOTION_PULSE: usize = 2;
pub const MOTION_SWIRL: usize = 3;

pub const MOTION_BUCKETS: &[BucketEntry] = &[
    b("Ocean waves", &[(MOTION_FLOW, 1.0), (MOTION_PULSE, 0.5)]),
    b("Drifting clouds", &[(MOTION_DRIFT, 1.0)]),
    b("Flickering fire", &[(MOTION_PULSE, 1.0), (MOTION_SWIRL, 0.5)]),
    b("Falling rain", &[(MOTION_FLOW, 1.0), (MOTION_DRIFT, 0.5)]),
    b("Spinning galaxies", &[(MOTION_SWIRL, 1.0)]),
    b("Heartbeat", &[(MOTION_PULSE, 1.0)]),
];
pub const MOTION_DEFAULT: [f32; 4] = [0.5, 0.2, 0.15, 0.15];

/// Saturation/value of the per-label extra palette colours.
pub const EXTRA_COLOR_SV: (f32, f32) = (0.55, 0.92);

// (lo, hi) ranges for the derived shading scalars.
pub const NOISE_SCALE_RANGE: (f32, f32) = (0.6, 4.2);
pub const WARP_RANGE: (f32, f32) = (0.0, 1.4);
pub const SPEED_RANGE: (f32, f32) = (0.05, 0.75);
pub const CONTRAST_RANGE: (f32, f32) = (0.8, 1.6);
pub const HUE_SHIFT_RANGE: (f32, f32) = (-0.25, 0.25);
pub const GRAIN_RANGE: (f32, f32) = (0.0, 0.25);

pub const SEED_HASH_SCALE: f64 = 1000.0;
