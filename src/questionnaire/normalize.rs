use crate::questionnaire::schema::{AnswerMap, AnswerValue, FieldSchema, Schema};
use std::collections::BTreeSet;

pub const NEUTRAL: f32 = 0.5;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

const DENSITY_WEIGHT: f32 = 0.65;
const VARIETY_WEIGHT: f32 = 0.35;

/// A field answer reduced to a unit scalar, plus the parsed colour for colour fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedField {
    pub value: f32,
    pub color: Option<[f32; 3]>,
}

impl NormalizedField {
    pub const fn neutral() -> Self {
        Self {
            value: NEUTRAL,
            color: None,
        }
    }

    fn scalar(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            color: None,
        }
    }
}

/// Density and variety of a multi-select answer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Selection {
    pub density: f32,
    pub variety: f32,
}

impl Selection {
    pub fn combined(self) -> f32 {
        (DENSITY_WEIGHT * self.density + VARIETY_WEIGHT * self.variety).clamp(0.0, 1.0)
    }
}

/// 32-bit FNV-1a over UTF-16 code units, mapped to [0, 1).
pub fn fnv1a_unit(text: &str) -> f64 {
    let mut h = FNV_OFFSET_BASIS;
    for unit in text.encode_utf16() {
        h ^= unit as u32;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h as f64 / 4_294_967_296.0
}

/// Narrow a [0, 1) hash to f32 without rounding up to 1.0.
pub fn unit_f32(v: f64) -> f32 {
    (v as f32).clamp(0.0, 1.0 - f32::EPSILON)
}

/// Parse `#rrggbb` / `rrggbb` into unit RGB.
pub fn parse_hex_color(raw: &str) -> Option<[f32; 3]> {
    let hex = raw.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ])
}

/// Distinct selections in sorted order.
pub fn distinct_sorted(selected: &[String]) -> Vec<&str> {
    selected
        .iter()
        .map(|s| s.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn selection_stats(choices: &[String], selected: &[String]) -> Selection {
    let distinct = distinct_sorted(selected);
    if distinct.is_empty() {
        return Selection::default();
    }
    let density = if choices.is_empty() {
        0.0
    } else {
        (distinct.len() as f32 / choices.len() as f32).clamp(0.0, 1.0)
    };
    let variety = unit_f32(fnv1a_unit(&distinct.join("|")));
    Selection { density, variety }
}

fn normalize_range(min: f64, max: f64, value: f64) -> f32 {
    if !(max > min) || !value.is_finite() {
        return NEUTRAL;
    }
    ((value.clamp(min, max) - min) / (max - min)) as f32
}

fn normalize_choice(choices: &[String], selected: Option<&str>) -> f32 {
    if choices.len() <= 1 {
        return NEUTRAL;
    }
    let idx = selected
        .and_then(|s| choices.iter().position(|c| c == s))
        .unwrap_or(0);
    idx as f32 / (choices.len() - 1) as f32
}

fn normalize_color(raw: Option<&str>) -> NormalizedField {
    match raw.and_then(parse_hex_color) {
        Some(rgb) => NormalizedField {
            value: (rgb[0] + rgb[1] + rgb[2]) / 3.0,
            color: Some(rgb),
        },
        None => NormalizedField::neutral(),
    }
}

/// The value a field takes when it has no usable answer.
pub fn schema_default(schema: &FieldSchema) -> NormalizedField {
    match schema {
        FieldSchema::Range { min, max, default } => {
            NormalizedField::scalar(normalize_range(*min, *max, *default))
        }
        FieldSchema::Choice { choices, default } => {
            NormalizedField::scalar(normalize_choice(choices, default.as_deref()))
        }
        FieldSchema::MultiSelect { choices, default } => {
            NormalizedField::scalar(selection_stats(choices, default).combined())
        }
        FieldSchema::Boolean { default } => {
            NormalizedField::scalar(if *default { 1.0 } else { 0.0 })
        }
        FieldSchema::Color { default } => normalize_color(default.as_deref()),
    }
}

/// Normalize one answer against its schema entry. Never fails: missing schema yields the neutral
/// value, a missing or mismatched answer yields the schema default.
pub fn normalize_field(schema: Option<&FieldSchema>, answer: Option<&AnswerValue>) -> NormalizedField {
    let Some(schema) = schema else {
        return NormalizedField::neutral();
    };
    let Some(answer) = answer else {
        return schema_default(schema);
    };

    match (schema, answer) {
        (FieldSchema::Range { min, max, .. }, AnswerValue::Number(v)) => {
            NormalizedField::scalar(normalize_range(*min, *max, *v))
        }
        (FieldSchema::Choice { choices, .. }, AnswerValue::Text(s)) => {
            NormalizedField::scalar(normalize_choice(choices, Some(s)))
        }
        (FieldSchema::MultiSelect { choices, .. }, AnswerValue::List(items)) => {
            NormalizedField::scalar(selection_stats(choices, items).combined())
        }
        (FieldSchema::Boolean { .. }, AnswerValue::Bool(b)) => {
            NormalizedField::scalar(if *b { 1.0 } else { 0.0 })
        }
        (FieldSchema::Color { .. }, AnswerValue::Text(s)) => {
            let parsed = normalize_color(Some(s));
            if parsed.color.is_none() {
                tracing::warn!(raw = %s, "unparseable colour answer, using neutral value");
            }
            parsed
        }
        (schema, answer) => {
            tracing::warn!(
                expected = schema.kind(),
                got = answer.kind(),
                "answer type does not match schema, using default"
            );
            schema_default(schema)
        }
    }
}

pub fn normalize(schema: &Schema, answers: &AnswerMap, field: &str) -> NormalizedField {
    let entry = schema.get(field);
    if entry.is_none() {
        tracing::warn!(field, "no schema entry for field, using neutral value");
    }
    normalize_field(entry, answers.get(field))
}

/// Density/variety of a multi-select field: the answer when it is a list, else the schema default.
/// Fields that are absent or not multi-select contribute nothing.
pub fn selection(schema: &Schema, answers: &AnswerMap, field: &str) -> Selection {
    let Some(FieldSchema::MultiSelect { choices, default }) = schema.get(field) else {
        return Selection::default();
    };
    match answers.get(field) {
        Some(AnswerValue::List(items)) => selection_stats(choices, items),
        Some(other) => {
            tracing::warn!(field, got = other.kind(), "multi-select answer is not a list");
            selection_stats(choices, default)
        }
        None => selection_stats(choices, default),
    }
}

/// Normalized answer minus normalized default. Zero for unanswered fields.
pub fn offset(schema: &Schema, answers: &AnswerMap, field: &str) -> f32 {
    let Some(entry) = schema.get(field) else {
        return 0.0;
    };
    normalize_field(Some(entry), answers.get(field)).value - schema_default(entry).value
}

/// Selected labels of a multi-select field, distinct, in answer order. Same source as
/// [`selection`]: the answer when it is a list, else the schema default.
pub fn selected_labels<'a>(schema: &'a Schema, answers: &'a AnswerMap, field: &str) -> Vec<&'a str> {
    let items: &[String] = match (answers.get(field), schema.get(field)) {
        (Some(AnswerValue::List(items)), _) => items,
        (_, Some(FieldSchema::MultiSelect { default, .. })) => default,
        _ => return Vec::new(),
    };
    let mut seen = BTreeSet::new();
    items
        .iter()
        .map(|s| s.as_str())
        .filter(|s| seen.insert(*s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_of_empty_string_is_offset_basis() {
        assert_eq!(fnv1a_unit(""), 2_166_136_261.0 / 4_294_967_296.0);
    }

    #[test]
    fn fnv_matches_reference_vector() {
        // FNV-1a 32 of "a" is 0xe40c292c.
        assert_eq!(fnv1a_unit("a"), 0xe40c_292c_u32 as f64 / 4_294_967_296.0);
    }

    #[test]
    fn hex_rejects_signs_and_short_strings() {
        assert_eq!(parse_hex_color("+f0000"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
        assert_eq!(parse_hex_color("000000"), Some([0.0, 0.0, 0.0]));
    }
}
