use crate::questionnaire::{AnswerMap, LoadError, Schema};
use crate::synth::tables::{KEY_SEED, KEY_SEED_PHRASE};
use crate::synth::{synthesize, ParameterVector};
use crate::uniforms::Uniforms;
use std::path::Path;

/// A questionnaire result turned into bound uniforms. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct Session {
    pub schema: Schema,
    pub answers: AnswerMap,
    pub params: ParameterVector,
    pub uniforms: Uniforms,
}

impl Session {
    pub fn new(schema: Schema, answers: AnswerMap) -> Self {
        let params = synthesize(&schema, &answers);
        let uniforms = Uniforms::bind(&params);
        Self {
            schema,
            answers,
            params,
            uniforms,
        }
    }

    /// Load schema and answers from JSON files (built-in onboarding schema and an empty answer set
    /// when not given), apply seed overrides, and synthesize.
    pub fn load(
        schema_path: Option<&Path>,
        answers_path: Option<&Path>,
        seed: Option<f64>,
        seed_phrase: Option<&str>,
    ) -> Result<Self, LoadError> {
        let schema = match schema_path {
            Some(p) => Schema::load(p)?,
            None => Schema::onboarding(),
        };
        let mut answers = match answers_path {
            Some(p) => AnswerMap::load(p)?,
            None => AnswerMap::new(),
        };
        if let Some(seed) = seed {
            answers.insert(KEY_SEED, seed);
        }
        if let Some(phrase) = seed_phrase {
            answers.insert(KEY_SEED_PHRASE, phrase);
        }
        Ok(Self::new(schema, answers))
    }

    pub fn intent_label(&self) -> &'static str {
        self.params.intent.unwrap_or("Open")
    }
}
