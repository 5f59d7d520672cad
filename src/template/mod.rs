//! Template banks and the `{dotted.path}` renderer.

pub mod bank;
pub mod render;

pub use bank::{
    BankRegistry, Block, ConfigError, IntentBank, Persona, RejectedBank, SubsetRange,
    TemplateBank,
};
pub use render::{placeholder, render, render_text, Rendered, MISSING_SUFFIX};
