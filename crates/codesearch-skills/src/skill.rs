//! The uniform skill contract (§4.8).

use async_trait::async_trait;
use codesearch_core::{SkillDescriptor, StepValue};

use crate::error::SkillExecutionError;

/// A composable capability: declares its schema via [`descriptor`] and runs
/// via [`execute`]. Implementations are expected to call
/// [`crate::validation::validate_input`] against their own
/// `descriptor().input_schema` as the first step of `execute`.
#[async_trait]
pub trait Skill: Send + Sync {
    fn descriptor(&self) -> &SkillDescriptor;

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError>;
}
