//! Split a model response into the improved prompt and the explanation of the changes.
//!
//! Strategies are tried in a fixed priority order and the first one that
//! recognizes the response wins. A strategy that does not recognize the shape
//! of the text returns `None`; none of them can fail.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROMPT_START: &str = "---PROMPT_START---";
pub const PROMPT_END: &str = "---PROMPT_END---";
pub const REASON_START: &str = "---REASON_START---";
pub const REASON_END: &str = "---REASON_END---";

/// A blank-line split needs a trailing segment longer than this (in chars).
const MIN_TRAILING_CHARS: usize = 20;

/// Improved prompt plus the optional explanation that came with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentedResponse {
    pub main_artifact: String,
    pub rationale: Option<String>,
}

impl SegmentedResponse {
    fn split(main: &str, rationale: Option<&str>) -> Self {
        Self {
            main_artifact: main.trim().to_string(),
            rationale: rationale
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
        }
    }

    fn whole(text: &str) -> Self {
        Self {
            main_artifact: text.to_string(),
            rationale: None,
        }
    }

    /// Marker-delimited text that segments back to this artifact and rationale.
    pub fn to_canonical(&self) -> String {
        match &self.rationale {
            Some(rationale) => format!(
                "{PROMPT_START}\n{}\n{PROMPT_END}\n\n{REASON_START}\n{}\n{REASON_END}",
                self.main_artifact, rationale
            ),
            None => format!("{PROMPT_START}\n{}\n{PROMPT_END}", self.main_artifact),
        }
    }
}

type Strategy = fn(&str) -> Option<SegmentedResponse>;

const STRATEGIES: [(&str, Strategy); 5] = [
    ("markers", by_markers),
    ("headers", by_headers),
    ("payload", by_payload),
    ("keywords", by_keywords),
    ("blank-line", by_blank_line),
];

/// Segment a raw model response. Absent or empty input gives an empty artifact.
pub fn segment(raw: Option<&str>) -> SegmentedResponse {
    let Some(text) = raw.filter(|t| !t.is_empty()) else {
        return SegmentedResponse::default();
    };
    for (name, strategy) in STRATEGIES {
        if let Some(found) = strategy(text) {
            log::debug!("Response segmented by {} strategy", name);
            return found;
        }
    }
    SegmentedResponse::whole(text)
}

/// `---PROMPT_START---` … `---PROMPT_END---` / `---REASON_START---` … `---REASON_END---`.
fn by_markers(text: &str) -> Option<SegmentedResponse> {
    let start = text.find(PROMPT_START)? + PROMPT_START.len();
    let body = &text[start..];
    let end = [PROMPT_END, REASON_START]
        .iter()
        .filter_map(|marker| body.find(marker))
        .min()
        .unwrap_or(body.len());
    let main = body[..end].trim();
    if main.is_empty() {
        return None;
    }

    let rationale = text.find(REASON_START).map(|pos| {
        let rest = &text[pos + REASON_START.len()..];
        let end = rest.find(REASON_END).unwrap_or(rest.len());
        &rest[..end]
    });
    Some(SegmentedResponse::split(main, rationale))
}

fn role_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)\*\*\[\s*(?:role|goal|task|persona|역할|목표|작업)\s*\]\*\*|^[ \t]*#{1,6}[ \t]*(?:role|goal|task|persona|역할|목표|작업)\b",
        )
        .expect("role header pattern is valid")
    })
}

fn rationale_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        const LABEL: &str =
            r"(?:rationale|reasons?|explanation|improvements?|changes|개선\s*이유|이유|설명|변경\s*사항)";
        Regex::new(&format!(
            r"(?im)\*\*\[\s*{LABEL}\s*\]\*\*|^[ \t]*#{{1,6}}[ \t]*{LABEL}\b|^[ \t]*\*\*{LABEL}[ \t]*:?[ \t]*\*\*[ \t]*:?[ \t]*$"
        ))
        .expect("rationale header pattern is valid")
    })
}

/// `**[Role]**` / `## Goal` structured prompts, split at a rationale header when one follows.
fn by_headers(text: &str) -> Option<SegmentedResponse> {
    let role = role_header().find(text)?;
    match rationale_header().find(text) {
        None => Some(SegmentedResponse::whole(text.trim())),
        Some(rationale) if role.start() < rationale.start() => Some(SegmentedResponse::split(
            &text[..rationale.start()],
            Some(&text[rationale.start()..]),
        )),
        Some(_) => None,
    }
}

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[\w-]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    })
}

/// JSON record inside a fenced block.
#[derive(Debug, Deserialize)]
struct EnhancedPayload {
    #[serde(
        rename = "enhancedPrompt",
        alias = "enhanced_prompt",
        alias = "improvedPrompt",
        alias = "improved_prompt",
        alias = "prompt"
    )]
    enhanced_prompt: String,
    #[serde(default, alias = "reason", alias = "rationale")]
    explanation: Option<Value>,
}

fn explanation_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}

/// ```json {"enhancedPrompt": …, "explanation": …} ``` anywhere in the response.
fn by_payload(text: &str) -> Option<SegmentedResponse> {
    fenced_block().captures_iter(text).find_map(|caps| {
        let payload: EnhancedPayload = serde_json::from_str(caps[1].trim()).ok()?;
        if payload.enhanced_prompt.trim().is_empty() {
            return None;
        }
        let explanation = payload.explanation.and_then(explanation_text);
        Some(SegmentedResponse::split(
            &payload.enhanced_prompt,
            explanation.as_deref(),
        ))
    })
}

fn rationale_keywords() -> &'static [String] {
    static KEYWORDS: OnceLock<Vec<String>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        let json = include_str!("../../../config/rationale-keywords.json");
        serde_json::from_str(json).expect("rationale-keywords.json must be valid")
    })
}

fn starts_word(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric())
}

/// Byte offset of the earliest rationale keyword. ASCII case is ignored, so
/// offsets in the lowered copy match the original text.
fn find_keyword(text: &str) -> Option<usize> {
    let haystack = text.to_ascii_lowercase();
    rationale_keywords()
        .iter()
        .filter_map(|keyword| {
            let needle = keyword.to_ascii_lowercase();
            haystack
                .match_indices(needle.as_str())
                .map(|(pos, _)| pos)
                .find(|&pos| starts_word(text, pos))
        })
        .min()
}

/// "Reason:", "설명:", … : everything from the earliest keyword on is the rationale.
fn by_keywords(text: &str) -> Option<SegmentedResponse> {
    let pos = find_keyword(text)?;
    let main = text[..pos].trim();
    if main.is_empty() {
        return None;
    }
    Some(SegmentedResponse::split(main, Some(&text[pos..])))
}

fn blank_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("blank line pattern is valid"))
}

/// First paragraph break, if it falls in the first two thirds and leaves a real tail.
fn by_blank_line(text: &str) -> Option<SegmentedResponse> {
    let body = text.trim();
    let brk = blank_line().find(body)?;

    let total = body.chars().count();
    let offset = body[..brk.start()].chars().count();
    if offset * 3 >= total * 2 {
        return None;
    }

    let tail = body[brk.end()..].trim();
    if tail.chars().count() <= MIN_TRAILING_CHARS {
        return None;
    }
    Some(SegmentedResponse::split(&body[..brk.start()], Some(tail)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_extract_prompt_and_reason() {
        let text = "Intro\n---PROMPT_START---\nWrite a haiku.\n---PROMPT_END---\n---REASON_START---\nMore specific.\n---REASON_END---\nBye";
        let seg = by_markers(text).unwrap();
        assert_eq!(seg.main_artifact, "Write a haiku.");
        assert_eq!(seg.rationale.as_deref(), Some("More specific."));
    }

    #[test]
    fn markers_without_end_marker_stop_at_reason_start() {
        let text = "---PROMPT_START---\nDo X\n---REASON_START---\nBecause Y";
        let seg = by_markers(text).unwrap();
        assert_eq!(seg.main_artifact, "Do X");
        assert_eq!(seg.rationale.as_deref(), Some("Because Y"));
    }

    #[test]
    fn markers_run_to_end_of_text() {
        let seg = by_markers("---PROMPT_START---\n  Do X  ").unwrap();
        assert_eq!(seg.main_artifact, "Do X");
        assert_eq!(seg.rationale, None);
    }

    #[test]
    fn markers_with_empty_prompt_fall_through() {
        assert!(by_markers("---PROMPT_START---\n\n---PROMPT_END---\nrest").is_none());
        assert!(by_markers("no markers here").is_none());
    }

    #[test]
    fn headers_without_rationale_keep_whole_text() {
        let text = "**[Role]**\nYou are a chef.\n\n**[Goal]**\nWrite a recipe.";
        let seg = by_headers(text).unwrap();
        assert_eq!(seg.main_artifact, text);
        assert_eq!(seg.rationale, None);
    }

    #[test]
    fn headers_split_at_rationale_header() {
        let text = "## Role\nYou are a chef.\n\n## Rationale\nA role focuses the answer.";
        let seg = by_headers(text).unwrap();
        assert_eq!(seg.main_artifact, "## Role\nYou are a chef.");
        assert_eq!(
            seg.rationale.as_deref(),
            Some("## Rationale\nA role focuses the answer.")
        );
    }

    #[test]
    fn headers_accept_korean_labels() {
        let text = "**[역할]**\n당신은 요리사입니다.\n\n**[개선 이유]**\n역할을 명확히 했습니다.";
        let seg = by_headers(text).unwrap();
        assert_eq!(seg.main_artifact, "**[역할]**\n당신은 요리사입니다.");
        assert!(seg.rationale.unwrap().starts_with("**[개선 이유]**"));
    }

    #[test]
    fn headers_bold_label_line_is_a_rationale_header() {
        let text = "**[Task]**\nSummarize the report.\n**Explanation:**\nNamed the task.";
        let seg = by_headers(text).unwrap();
        assert_eq!(seg.main_artifact, "**[Task]**\nSummarize the report.");
        assert_eq!(
            seg.rationale.as_deref(),
            Some("**Explanation:**\nNamed the task.")
        );
    }

    #[test]
    fn headers_rationale_before_role_falls_through() {
        let text = "## Explanation\nfirst\n\n## Role\nsecond";
        assert!(by_headers(text).is_none());
        assert!(by_headers("plain text only").is_none());
    }

    #[test]
    fn payload_reads_fenced_json() {
        let text = "Here you go:\n```json\n{\"enhancedPrompt\": \"Write a poem\", \"explanation\": \"Clearer\"}\n```";
        let seg = by_payload(text).unwrap();
        assert_eq!(seg.main_artifact, "Write a poem");
        assert_eq!(seg.rationale.as_deref(), Some("Clearer"));
    }

    #[test]
    fn payload_accepts_aliases_and_reason_lists() {
        let text = "```\n{\"improved_prompt\": \"Do it\", \"reason\": [\"one\", \"two\"]}\n```";
        let seg = by_payload(text).unwrap();
        assert_eq!(seg.main_artifact, "Do it");
        assert_eq!(seg.rationale.as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn payload_skips_malformed_blocks() {
        let text = "```json\n{not json\n```\n```json\n{\"prompt\": \"Second\"}\n```";
        let seg = by_payload(text).unwrap();
        assert_eq!(seg.main_artifact, "Second");
        assert_eq!(seg.rationale, None);
        assert!(by_payload("```json\n{\"other\": 1}\n```").is_none());
    }

    #[test]
    fn keywords_split_at_earliest_match() {
        let text = "Write a story about cats.\nNote: keep it short.\nReason: clarity.";
        let seg = by_keywords(text).unwrap();
        assert_eq!(seg.main_artifact, "Write a story about cats.");
        assert_eq!(
            seg.rationale.as_deref(),
            Some("Note: keep it short.\nReason: clarity.")
        );
    }

    #[test]
    fn keywords_ignore_case_and_require_word_start() {
        let seg = by_keywords("Plan the trip.\nexplanation: more detail").unwrap();
        assert_eq!(seg.main_artifact, "Plan the trip.");
        assert!(by_keywords("See the keynote: tomorrow").is_none());
    }

    #[test]
    fn keywords_match_korean_markers() {
        let seg = by_keywords("여행 계획을 세워줘.\n\n개선 이유: 구체적입니다.").unwrap();
        assert_eq!(seg.main_artifact, "여행 계획을 세워줘.");
        assert_eq!(seg.rationale.as_deref(), Some("개선 이유: 구체적입니다."));
    }

    #[test]
    fn keywords_at_start_fall_through() {
        assert!(by_keywords("Reason: nothing before").is_none());
    }

    #[test]
    fn blank_line_splits_early_break_with_long_tail() {
        let text = "Write a limerick.\n\nThis adds form and a clear length limit.";
        let seg = by_blank_line(text).unwrap();
        assert_eq!(seg.main_artifact, "Write a limerick.");
        assert_eq!(
            seg.rationale.as_deref(),
            Some("This adds form and a clear length limit.")
        );
    }

    #[test]
    fn blank_line_requires_tail_over_twenty_chars() {
        assert!(by_blank_line("Short prompt.\n\nTwenty chars exactly").is_none());
    }

    #[test]
    fn blank_line_late_break_does_not_split() {
        let head = "x".repeat(90);
        let text = format!("{head}\n\n{}", "y".repeat(8));
        assert!(by_blank_line(&text).is_none());
    }

    #[test]
    fn canonical_form_segments_back() {
        let seg = SegmentedResponse {
            main_artifact: "**[Role]**\nYou are a tutor.".to_string(),
            rationale: Some("Role added.".to_string()),
        };
        assert_eq!(segment(Some(&seg.to_canonical())), seg);

        let bare = SegmentedResponse {
            main_artifact: "Just a prompt".to_string(),
            rationale: None,
        };
        assert_eq!(segment(Some(&bare.to_canonical())), bare);
    }
}
