use super::MISSION_PLACEHOLDER;
use crate::error::{HandoffError, HandoffResult};

const MAX_TITLE_CHARS: usize = 80;

/// Return the text inside the last `<mission_brief>` block, if the user kept it.
pub fn extract_mission_brief(prompt: &str) -> Option<&str> {
    let open = "<mission_brief>";
    let start = prompt.rfind(open)? + open.len();
    let end = prompt[start..].find("</mission_brief>")? + start;
    Some(prompt[start..end].trim())
}

/// Reject prompts that are empty, unedited or far over the configured budget.
///
/// The reviewed prompt may legitimately grow past `max_length` while the
/// user writes the brief, so only twice the budget is treated as an error.
pub fn validate_prompt(prompt: &str, max_length: usize) -> HandoffResult<()> {
    if prompt.trim().is_empty() {
        return Err(HandoffError::validation("prompt", "prompt is empty"));
    }

    if let Some(brief) = extract_mission_brief(prompt) {
        if brief.is_empty() || brief == MISSION_PLACEHOLDER {
            return Err(HandoffError::validation(
                "mission brief",
                "describe the task before sending",
            ));
        }
    }

    let len = prompt.chars().count();
    let ceiling = max_length.saturating_mul(2);
    if len > ceiling {
        return Err(HandoffError::validation(
            "prompt",
            format!("{} characters exceeds the limit of {}", len, ceiling),
        ));
    }
    Ok(())
}

/// Session title: the first meaningful line of the brief, else a repo/branch label.
pub fn derive_title(prompt: &str, repo: &str, branch: &str) -> String {
    let brief = extract_mission_brief(prompt).unwrap_or_default();
    brief
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty() && *line != MISSION_PLACEHOLDER)
        .map(|line| {
            if line.chars().count() > MAX_TITLE_CHARS {
                let cut: String = line.chars().take(MAX_TITLE_CHARS - 3).collect();
                format!("{}...", cut.trim_end())
            } else {
                line.to_string()
            }
        })
        .unwrap_or_else(|| format!("Handoff: {} @ {}", repo, branch))
}
