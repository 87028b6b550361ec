pub mod tables;

use crate::questionnaire::{
    fnv1a_unit, normalize, offset, selected_labels, selection, unit_f32, AnswerMap, AnswerValue,
    Schema, Selection,
};
use serde::Serialize;
use tables::{
    BucketEntry, IntentPreset, Term, ACCENT_BLEND, ANCHOR_BRIGHTNESS, AXIS_PERTURBATIONS,
    CONTRAST_RANGE, COOL_ANCHORS, EXTRA_COLOR_SV, FALLBACK_AXES, FIELD_ACCENT, FIELD_COLORS,
    FIELD_INTENT, FIELD_MOTION, FIELD_TEXTURES, GRAIN_RANGE, HUE_SHIFT_RANGE, INTENT_PALETTE_BLEND,
    KEY_SEED, KEY_SEED_PHRASE, MOTION_BUCKETS, MOTION_DEFAULT, NOISE_SCALE_RANGE, SEED_HASH_SCALE,
    SPEED_RANGE, TEXTURE_BUCKETS, TEXTURE_DEFAULT, WARM_ANCHORS, WARP_RANGE,
};

pub const MAX_EXTRA_COLORS: usize = 21;

/// Below this accumulated bucket mass a weight vector falls back to its default.
const WEIGHT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Energy,
    Calm,
    Novelty,
    Focus,
    Warmth,
    Structure,
}

/// The six semantic axes, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Axes {
    pub energy: f32,
    pub calm: f32,
    pub novelty: f32,
    pub focus: f32,
    pub warmth: f32,
    pub structure: f32,
}

impl Axes {
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Energy => self.energy,
            Axis::Calm => self.calm,
            Axis::Novelty => self.novelty,
            Axis::Focus => self.focus,
            Axis::Warmth => self.warmth,
            Axis::Structure => self.structure,
        }
    }

    fn get_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::Energy => &mut self.energy,
            Axis::Calm => &mut self.calm,
            Axis::Novelty => &mut self.novelty,
            Axis::Focus => &mut self.focus,
            Axis::Warmth => &mut self.warmth,
            Axis::Structure => &mut self.structure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub anchors: [[f32; 3]; 3],
    pub extra: Vec<[f32; 3]>,
    pub extra_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shading {
    pub noise_scale: f32,
    pub warp: f32,
    pub speed: f32,
    pub contrast: f32,
    pub hue_shift: f32,
    pub grain: f32,
}

/// Everything the questionnaire decides about the visual. Built once per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterVector {
    pub seed: f64,
    pub intent: Option<&'static str>,
    pub axes: Axes,
    pub palette: Palette,
    pub texture_weights: [f32; 4],
    pub motion_weights: [f32; 4],
    pub texture_scale: f32,
    pub shading: Shading,
}

/// Map a schema and answer set to a parameter vector. Pure: identical input, identical output.
pub fn synthesize(schema: &Schema, answers: &AnswerMap) -> ParameterVector {
    let intent = match answers.get(FIELD_INTENT) {
        Some(AnswerValue::Text(s)) => tables::intent_preset(s),
        _ => None,
    };
    let axes = perturb_axes(intent, schema, answers);

    let accent = normalize(schema, answers, FIELD_ACCENT).color;
    let palette = Palette {
        anchors: palette_anchors(&axes, accent, intent),
        ..extra_palette(&selected_labels(schema, answers, FIELD_COLORS))
    };

    let textures = selected_labels(schema, answers, FIELD_TEXTURES);
    let motion = selected_labels(schema, answers, FIELD_MOTION);
    let texture_weights = bucket_weights(&textures, TEXTURE_BUCKETS, TEXTURE_DEFAULT);
    let motion_weights = bucket_weights(&motion, MOTION_BUCKETS, MOTION_DEFAULT);

    let texture_sel = selection(schema, answers, FIELD_TEXTURES);
    let motion_sel = selection(schema, answers, FIELD_MOTION);
    let shading = derive_shading(&axes, texture_sel, motion_sel);
    let texture_scale = (0.2 + 0.8 * texture_sel.density).clamp(0.0, 1.0);

    let seed = derive_seed(answers);

    tracing::info!(
        seed,
        intent = intent.map(|p| p.name).unwrap_or("<fallback>"),
        extra_colors = palette.extra_count,
        "synthesized session parameters"
    );

    ParameterVector {
        seed,
        intent: intent.map(|p| p.name),
        axes,
        palette,
        texture_weights,
        motion_weights,
        texture_scale,
        shading,
    }
}

fn perturb_axes(intent: Option<&IntentPreset>, schema: &Schema, answers: &AnswerMap) -> Axes {
    let base = intent.map(|p| p.axes).unwrap_or(FALLBACK_AXES);
    let mut delta = Axes {
        energy: 0.0,
        calm: 0.0,
        novelty: 0.0,
        focus: 0.0,
        warmth: 0.0,
        structure: 0.0,
    };
    for pert in AXIS_PERTURBATIONS {
        let term = match pert.term {
            Term::Density(field) => selection(schema, answers, field).density,
            Term::Variety(field) => selection(schema, answers, field).variety,
            Term::Offset(field) => offset(schema, answers, field),
        };
        *delta.get_mut(pert.axis) += pert.coeff * term;
    }

    let mut out = base;
    for axis in [
        Axis::Energy,
        Axis::Calm,
        Axis::Novelty,
        Axis::Focus,
        Axis::Warmth,
        Axis::Structure,
    ] {
        *out.get_mut(axis) = (base.get(axis) + delta.get(axis)).clamp(0.0, 1.0);
    }
    out
}

fn palette_anchors(
    axes: &Axes,
    accent: Option<[f32; 3]>,
    intent: Option<&IntentPreset>,
) -> [[f32; 3]; 3] {
    let mut anchors = [[0.0f32; 3]; 3];
    for (i, anchor) in anchors.iter_mut().enumerate() {
        *anchor = mix3(COOL_ANCHORS[i], WARM_ANCHORS[i], axes.warmth);
    }

    match accent {
        None => {
            let k = lerp(ANCHOR_BRIGHTNESS.0, ANCHOR_BRIGHTNESS.1, 1.0 - axes.calm);
            anchors[0] = scale3(anchors[0], k);
        }
        Some(c) => {
            anchors[0] = mix3(anchors[0], c, ACCENT_BLEND[0]);
            anchors[1] = mix3(anchors[1], c, ACCENT_BLEND[1]);
        }
    }

    if let Some(preset) = intent {
        for (anchor, target) in anchors.iter_mut().zip(preset.palette) {
            *anchor = mix3(*anchor, target, INTENT_PALETTE_BLEND);
        }
    }

    anchors.map(clamp3)
}

fn extra_palette(labels: &[&str]) -> Palette {
    let extra: Vec<[f32; 3]> = labels
        .iter()
        .take(MAX_EXTRA_COLORS)
        .map(|label| label_color(label))
        .collect();
    Palette {
        anchors: [[0.0; 3]; 3],
        extra_count: extra.len(),
        extra,
    }
}

/// Deterministic colour for a free-form label.
pub fn label_color(label: &str) -> [f32; 3] {
    let hue = unit_f32(fnv1a_unit(label));
    hsv_to_rgb(hue, EXTRA_COLOR_SV.0, EXTRA_COLOR_SV.1)
}

/// Accumulate a 4-bucket histogram and normalize it, or return `default` when nothing landed.
pub fn bucket_weights(labels: &[&str], map: &[BucketEntry], default: [f32; 4]) -> [f32; 4] {
    let mut acc = [0.0f32; 4];
    for label in labels {
        let Some(entry) = map.iter().find(|e| e.label.eq_ignore_ascii_case(label.trim())) else {
            continue;
        };
        for &(bucket, w) in entry.buckets {
            if let Some(slot) = acc.get_mut(bucket) {
                *slot += w;
            }
        }
    }
    let total: f32 = acc.iter().sum();
    if total <= WEIGHT_EPSILON {
        return default;
    }
    acc.map(|v| v / total)
}

fn derive_shading(axes: &Axes, texture: Selection, motion: Selection) -> Shading {
    let texture_blend = (0.4 + 0.3 * texture.variety + 0.3 * motion.variety).clamp(0.0, 1.0);
    let ranged = |range: (f32, f32), t: f32| lerp(range.0, range.1, t.clamp(0.0, 1.0));
    Shading {
        noise_scale: ranged(NOISE_SCALE_RANGE, 0.35 * axes.structure + 0.65 * axes.novelty),
        warp: ranged(WARP_RANGE, 0.6 * axes.novelty + 0.4 * axes.energy),
        speed: ranged(SPEED_RANGE, axes.energy),
        contrast: ranged(CONTRAST_RANGE, 0.5 * axes.focus + 0.5 * axes.structure),
        hue_shift: ranged(HUE_SHIFT_RANGE, axes.warmth),
        grain: ranged(GRAIN_RANGE, 0.5 * axes.novelty + 0.5 * texture_blend),
    }
}

fn derive_seed(answers: &AnswerMap) -> f64 {
    if let Some(AnswerValue::Number(n)) = answers.get(KEY_SEED) {
        if n.is_finite() {
            return *n;
        }
        tracing::warn!("explicit seed is not finite, deriving one instead");
    }
    if let Some(AnswerValue::Text(phrase)) = answers.get(KEY_SEED_PHRASE) {
        if !phrase.trim().is_empty() {
            return fnv1a_unit(phrase) * SEED_HASH_SCALE;
        }
    }
    fnv1a_unit(&answers.canonical_json()) * SEED_HASH_SCALE
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

fn scale3(c: [f32; 3], k: f32) -> [f32; 3] {
    [c[0] * k, c[1] * k, c[2] * k]
}

fn clamp3(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = (h - h.floor()) * 6.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    clamp3([r, g, b])
}
