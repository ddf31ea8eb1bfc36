//! Prompt document assembly.
//!
//! The handoff prompt has a fixed outer shape: an instruction block, a
//! workspace-context block holding up to four optional sections, and a
//! mission-brief block the user fills in before submission.

mod assembler;
mod brief;

pub use assembler::{
    assemble, Inclusion, PromptBudget, PromptDocument, PromptInputs, Section,
    DEFAULT_MAX_PROMPT_LENGTH, DEFAULT_TRUNCATION_THRESHOLD,
};
pub use brief::{derive_title, extract_mission_brief, validate_prompt};

pub const INSTRUCTION: &str = "You are taking over work in progress from a developer's local editor. \
The workspace context below was captured at handoff time and reflects exactly the code pushed to the \
starting branch. Sections appear in priority order: the file under the cursor (with the enclosing symbol), \
current compiler errors, the full text of every changed file, and planning artifacts from earlier agent \
sessions. Sections may be truncated to fit. Treat the mission brief at the end as the task to complete; use the \
context to stay consistent with the developer's in-flight changes.";

/// Text left in the mission brief until the user replaces it.
pub const MISSION_PLACEHOLDER: &str =
    "[Describe what the agent should do next. Replace this line before sending.]";
