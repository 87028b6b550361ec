pub mod app;
pub mod config;
pub mod logging;
pub mod questionnaire;
pub mod render;
pub mod session;
pub mod sim;
pub mod synth;
pub mod terminal;
pub mod uniforms;
