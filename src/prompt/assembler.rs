use tracing::debug;

use super::{INSTRUCTION, MISSION_PLACEHOLDER};
use crate::domain::ActiveFile;

pub const DEFAULT_MAX_PROMPT_LENGTH: usize = 50_000;

/// Remaining budget at or below which a section is dropped instead of truncated.
pub const DEFAULT_TRUNCATION_THRESHOLD: usize = 50;

pub const TRUNCATION_MARKER: &str = "\n[... truncated to fit the prompt budget ...]";

/// Wrapper tags that must appear exactly once in the document.
const RESERVED_TAGS: &[&str] = &["instruction", "workspace_context", "mission_brief"];

/// Length limits for one assembly, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    pub max_length: usize,
    pub truncation_threshold: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_PROMPT_LENGTH,
            truncation_threshold: DEFAULT_TRUNCATION_THRESHOLD,
        }
    }
}

/// Everything the assembler consumes. Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInputs<'a> {
    pub diff: &'a str,
    pub errors: Option<&'a str>,
    pub symbol_context: Option<&'a str>,
    pub active_file: Option<&'a ActiveFile>,
    pub artifacts: Option<&'a str>,
}

/// Optional sections in priority order, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ActiveFile,
    ActiveErrors,
    GitDiff,
    Artifacts,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ActiveFile,
        Section::ActiveErrors,
        Section::GitDiff,
        Section::Artifacts,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Section::ActiveFile => "active_file",
            Section::ActiveErrors => "active_errors",
            Section::GitDiff => "git_diff",
            Section::Artifacts => "artifacts",
        }
    }
}

/// What happened to a section during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    Included,
    Truncated,
    Skipped,
    Absent,
}

/// The assembled prompt and how each section fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument {
    pub text: String,
    pub sections: Vec<(Section, Inclusion)>,
}

impl PromptDocument {
    pub fn inclusion(&self, section: Section) -> Inclusion {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, i)| *i)
            .unwrap_or(Inclusion::Absent)
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

struct SectionText {
    open: String,
    body: String,
    close: String,
}

impl SectionText {
    fn new(tag: &str, attributes: &str, body: &str) -> Self {
        Self {
            open: format!("<{}{}>\n", tag, attributes),
            body: neutralize_reserved_tags(body),
            close: format!("\n</{}>\n", tag),
        }
    }

    fn len(&self) -> usize {
        char_len(&self.open) + char_len(&self.body) + char_len(&self.close)
    }

    fn render(&self) -> String {
        format!("{}{}{}", self.open, self.body, self.close)
    }

    /// Keep the tags whole and cut the body so the result fits `budget`.
    fn render_truncated(&self, budget: usize) -> Option<String> {
        let frame = char_len(&self.open) + char_len(TRUNCATION_MARKER) + char_len(&self.close);
        let keep = budget.checked_sub(frame).filter(|k| *k > 0)?;
        let prefix: String = self.body.chars().take(keep).collect();
        Some(format!(
            "{}{}{}{}",
            self.open, prefix, TRUNCATION_MARKER, self.close
        ))
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Defuse copies of the document's own wrapper tags inside section bodies.
fn neutralize_reserved_tags(body: &str) -> String {
    let mut out = body.to_string();
    for tag in RESERVED_TAGS {
        out = out
            .replace(&format!("<{}>", tag), &format!("&lt;{}>", tag))
            .replace(&format!("</{}>", tag), &format!("&lt;/{}>", tag));
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn build_sections(inputs: &PromptInputs<'_>) -> Vec<(Section, Option<SectionText>)> {
    let active_file = inputs.active_file.map(|file| {
        let mut attributes = format!(
            " path=\"{}\" cursor_line=\"{}\"",
            escape_attribute(&file.path),
            file.cursor_line
        );
        if let Some(symbol) = non_empty(inputs.symbol_context) {
            attributes.push_str(&format!(" symbol=\"{}\"", escape_attribute(symbol)));
        }
        SectionText::new(Section::ActiveFile.tag(), &attributes, &file.content)
    });

    let text_section = |section: Section, value: Option<&str>| {
        non_empty(value).map(|v| SectionText::new(section.tag(), "", v))
    };

    vec![
        (Section::ActiveFile, active_file),
        (
            Section::ActiveErrors,
            text_section(Section::ActiveErrors, inputs.errors),
        ),
        (
            Section::GitDiff,
            text_section(Section::GitDiff, Some(inputs.diff)),
        ),
        (
            Section::Artifacts,
            text_section(Section::Artifacts, inputs.artifacts),
        ),
    ]
}

/// Assemble the prompt within `budget`.
///
/// Sections are taken greedily in priority order. A section that fits is
/// included whole; one that does not fit is truncated if more than the
/// threshold remains, which exhausts the budget; otherwise it is skipped.
pub fn assemble(inputs: &PromptInputs<'_>, budget: &PromptBudget) -> PromptDocument {
    let head = format!(
        "<instruction>\n{}\n</instruction>\n\n<workspace_context>\n",
        INSTRUCTION
    );
    let tail = format!(
        "</workspace_context>\n\n<mission_brief>\n{}\n</mission_brief>\n",
        MISSION_PLACEHOLDER
    );

    let overhead = char_len(&head) + char_len(&tail);
    let mut remaining = budget.max_length.saturating_sub(overhead);
    if remaining == 0 {
        debug!(
            "Prompt budget {} does not cover the fixed overhead of {} chars",
            budget.max_length, overhead
        );
    }

    let mut body = String::new();
    let mut outcomes = Vec::new();

    for (section, text) in build_sections(inputs) {
        let Some(text) = text else {
            outcomes.push((section, Inclusion::Absent));
            continue;
        };

        let len = text.len();
        if len <= remaining {
            body.push_str(&text.render());
            remaining -= len;
            outcomes.push((section, Inclusion::Included));
        } else if remaining > budget.truncation_threshold {
            match text.render_truncated(remaining) {
                Some(truncated) => {
                    debug!(
                        "Truncating <{}> from {} to {} chars",
                        section.tag(),
                        len,
                        remaining
                    );
                    body.push_str(&truncated);
                    outcomes.push((section, Inclusion::Truncated));
                }
                None => outcomes.push((section, Inclusion::Skipped)),
            }
            remaining = 0;
        } else {
            debug!("Skipping <{}> ({} chars, {} left)", section.tag(), len, remaining);
            outcomes.push((section, Inclusion::Skipped));
        }
    }

    PromptDocument {
        text: format!("{}{}{}", head, body, tail),
        sections: outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(content: &str) -> ActiveFile {
        ActiveFile {
            path: "src/user.ts".to_string(),
            cursor_line: 12,
            content: content.to_string(),
        }
    }

    fn skeleton_len() -> usize {
        assemble(&PromptInputs::default(), &PromptBudget::default()).char_len()
    }

    #[test]
    fn test_empty_inputs_still_well_formed() {
        let doc = assemble(&PromptInputs::default(), &PromptBudget::default());
        assert_eq!(doc.text.matches("<instruction>").count(), 1);
        assert_eq!(doc.text.matches("<mission_brief>").count(), 1);
        assert!(doc.text.contains("<workspace_context>\n</workspace_context>"));
        assert!(doc.text.contains(MISSION_PLACEHOLDER));
        assert!(doc.sections.iter().all(|(_, i)| *i == Inclusion::Absent));
    }

    #[test]
    fn test_all_sections_fit_in_priority_order() {
        let file = active("class UserManager {}");
        let inputs = PromptInputs {
            diff: "--- user.ts ---\nclass UserManager {}",
            errors: Some("File: src/user.ts Line 3: bad"),
            symbol_context: Some("Class: UserManager > Method: validateSession"),
            active_file: Some(&file),
            artifacts: Some("=== CURRENT TASK CHECKLIST ===\n- [ ] a"),
        };
        let doc = assemble(&inputs, &PromptBudget::default());

        let positions: Vec<usize> = ["<active_file", "<active_errors>", "<git_diff>", "<artifacts>"]
            .iter()
            .map(|tag| doc.text.find(tag).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(doc.text.contains(
            "<active_file path=\"src/user.ts\" cursor_line=\"12\" symbol=\"Class: UserManager > Method: validateSession\">"
        ));
        assert!(doc.sections.iter().all(|(_, i)| *i == Inclusion::Included));
    }

    #[test]
    fn test_low_priority_sections_truncate_first() {
        let file = active(&"a".repeat(500));
        let diff = "d".repeat(2_000);
        let artifacts = "x".repeat(2_000);
        let inputs = PromptInputs {
            diff: &diff,
            errors: Some("File: a Line 1: e"),
            symbol_context: None,
            active_file: Some(&file),
            artifacts: Some(&artifacts),
        };
        let budget = PromptBudget {
            max_length: skeleton_len() + 1_500,
            truncation_threshold: 50,
        };
        let doc = assemble(&inputs, &budget);

        assert_eq!(doc.inclusion(Section::ActiveFile), Inclusion::Included);
        assert_eq!(doc.inclusion(Section::ActiveErrors), Inclusion::Included);
        assert_eq!(doc.inclusion(Section::GitDiff), Inclusion::Truncated);
        assert_eq!(doc.inclusion(Section::Artifacts), Inclusion::Skipped);
        assert!(doc.text.contains(&"a".repeat(500)));
        assert!(doc.text.contains(TRUNCATION_MARKER));
        assert!(doc.text.contains("</git_diff>"));
        assert!(!doc.text.contains("<artifacts>"));
        assert!(doc.char_len() <= budget.max_length);
    }

    #[test]
    fn test_length_never_exceeds_budget() {
        let file = active(&"f".repeat(3_000));
        let diff = "d".repeat(5_000);
        let artifacts = "x".repeat(5_000);
        let inputs = PromptInputs {
            diff: &diff,
            errors: Some("File: a Line 1: e"),
            symbol_context: Some("Function: main"),
            active_file: Some(&file),
            artifacts: Some(&artifacts),
        };
        let base = skeleton_len();
        for extra in [0, 10, 49, 50, 51, 80, 200, 2_999, 3_100, 8_000, 20_000] {
            let budget = PromptBudget {
                max_length: base + extra,
                truncation_threshold: 50,
            };
            let doc = assemble(&inputs, &budget);
            assert!(
                doc.char_len() <= budget.max_length,
                "extra={} len={} max={}",
                extra,
                doc.char_len(),
                budget.max_length
            );
            assert_eq!(doc.text.matches("<instruction>").count(), 1);
            assert_eq!(doc.text.matches("<mission_brief>").count(), 1);

            // The active file is whole, truncated with its tags intact, or absent.
            match doc.inclusion(Section::ActiveFile) {
                Inclusion::Included => assert!(doc.text.contains(&"f".repeat(3_000))),
                Inclusion::Truncated => {
                    assert!(doc.text.contains("</active_file>"));
                    assert_eq!(doc.inclusion(Section::ActiveErrors), Inclusion::Skipped);
                }
                Inclusion::Skipped => assert!(!doc.text.contains("<active_file")),
                Inclusion::Absent => unreachable!(),
            }
        }
    }

    #[test]
    fn test_threshold_skips_instead_of_truncating() {
        let diff = "d".repeat(1_000);
        let inputs = PromptInputs {
            diff: &diff,
            ..Default::default()
        };
        let budget = PromptBudget {
            max_length: skeleton_len() + 50,
            truncation_threshold: 50,
        };
        let doc = assemble(&inputs, &budget);
        assert_eq!(doc.inclusion(Section::GitDiff), Inclusion::Skipped);
        assert!(!doc.text.contains("<git_diff>"));
    }

    #[test]
    fn test_reserved_tags_in_content_are_defused() {
        let file = active("const s = '<mission_brief>oops</mission_brief>';");
        let inputs = PromptInputs {
            active_file: Some(&file),
            ..Default::default()
        };
        let doc = assemble(&inputs, &PromptBudget::default());
        assert_eq!(doc.text.matches("<mission_brief>").count(), 1);
        assert_eq!(doc.text.matches("</mission_brief>").count(), 1);
    }

    #[test]
    fn test_each_wrapper_tag_appears_once() {
        for tag in RESERVED_TAGS {
            assert!(!INSTRUCTION.contains(&format!("<{}>", tag)));
            assert!(!INSTRUCTION.contains(&format!("</{}>", tag)));
        }

        let file = active("fn main() {}");
        let inputs = PromptInputs {
            diff: "--- main.rs ---\nfn main() {}",
            active_file: Some(&file),
            ..Default::default()
        };
        for doc in [
            assemble(&PromptInputs::default(), &PromptBudget::default()),
            assemble(&inputs, &PromptBudget::default()),
        ] {
            for tag in RESERVED_TAGS {
                assert_eq!(doc.text.matches(&format!("<{}>", tag)).count(), 1, "{}", tag);
                assert_eq!(doc.text.matches(&format!("</{}>", tag)).count(), 1, "{}", tag);
            }
        }
    }

    #[test]
    fn test_empty_diff_is_absent() {
        let inputs = PromptInputs {
            diff: "   ",
            errors: Some(""),
            ..Default::default()
        };
        let doc = assemble(&inputs, &PromptBudget::default());
        assert_eq!(doc.inclusion(Section::GitDiff), Inclusion::Absent);
        assert_eq!(doc.inclusion(Section::ActiveErrors), Inclusion::Absent);
    }
}
