//! Workflow engine (spec §4.9): resolves a template's declared parameters,
//! then runs its steps strictly in order, interpolating each step's input
//! against resolved parameters and prior step outputs before invoking the
//! named skill from a [`codesearch_skills::SkillRegistry`].

pub mod engine;
pub mod error;
pub mod interpolation;
pub mod templates;

pub use engine::WorkflowEngine;
pub use error::WorkflowError;
pub use templates::{referenced_skills, TemplateStore};
