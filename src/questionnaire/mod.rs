mod normalize;
mod schema;

pub use normalize::{
    distinct_sorted, fnv1a_unit, normalize, normalize_field, offset, parse_hex_color,
    schema_default, selected_labels, selection, selection_stats, unit_f32, NormalizedField,
    Selection, NEUTRAL,
};
pub use schema::{AnswerMap, AnswerValue, FieldSchema, LoadError, Schema};
