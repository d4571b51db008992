//! Inline markup: emphasis, escaped markers, line-break tokens, and paragraphs.
//!
//! Output of this module is valid input to it: HTML it produced, and table
//! fragments produced by the table normalizer, pass through unchanged.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Block-level tags that mark a paragraph as already rendered.
const BLOCK_TAGS: [&str; 14] = [
    "<p>", "<p ", "<div", "<table", "<ul", "<ol", "<pre", "<blockquote", "<h1", "<h2", "<h3",
    "<h4", "<h5", "<h6",
];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("inline pattern is valid"))
        }
    };
}

static_regex!(table_fragment, r#"(?s)<div class="table-responsive">.*?</div>"#);
static_regex!(excess_blank_lines, r"\n(?:[ \t]*\n){3,}");
static_regex!(paragraph_break, r"\n[ \t]*\n");
static_regex!(strong_em_stars, r"\*\*\*(\S(?:.*?\S)?)\*\*\*");
static_regex!(strong_em_underscores, r"___(\S(?:.*?\S)?)___");
static_regex!(strong_stars, r"\*\*(\S(?:.*?\S)?)\*\*");
static_regex!(strong_underscores, r"__(\S(?:.*?\S)?)__");
static_regex!(em_stars, r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*");
static_regex!(em_underscores, r"_([^\s_](?:[^_\n]*?[^\s_])?)_");

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Wrap matches of `re` in `open`/`close` only when they stand outside a word,
/// so `snake_case_names` and `__dunder__` identifiers survive.
fn wrap_outside_words(re: &Regex, text: &str, open: &str, close: &str) -> String {
    re.replace_all(text, |caps: &Captures| {
        let Some(whole) = caps.get(0) else {
            return String::new();
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if is_word_char(before) || is_word_char(after) {
            whole.as_str().to_string()
        } else {
            format!("{open}{}{close}", &caps[1])
        }
    })
    .into_owned()
}

/// Inline pass on a single span: escapes, strong, emphasis, `\n` tokens.
pub fn render_emphasis(text: &str) -> String {
    let s = text.replace("\\*", "&#42;").replace("\\_", "&#95;");
    let s = strong_em_stars().replace_all(&s, "<strong><em>$1</em></strong>");
    let s = wrap_outside_words(strong_em_underscores(), &s, "<strong><em>", "</em></strong>");
    let s = strong_stars().replace_all(&s, "<strong>$1</strong>");
    let s = wrap_outside_words(strong_underscores(), &s, "<strong>", "</strong>");
    let s = em_stars().replace_all(&s, "<em>$1</em>");
    let s = wrap_outside_words(em_underscores(), &s, "<em>", "</em>");
    s.replace("\\n", "<br>")
}

fn is_rendered_block(paragraph: &str) -> bool {
    let lower = paragraph
        .get(..paragraph.len().min(12))
        .unwrap_or(paragraph)
        .to_ascii_lowercase();
    BLOCK_TAGS.iter().any(|tag| lower.starts_with(tag))
}

fn push_paragraphs(blocks: &mut Vec<String>, span: &str) {
    let span = span.replace("\r\n", "\n");
    let span = excess_blank_lines().replace_all(&span, "\n\n");
    for paragraph in paragraph_break().split(&span) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if is_rendered_block(paragraph) {
            blocks.push(paragraph.to_string());
        } else {
            blocks.push(format!("<p>{}</p>", render_emphasis(paragraph)));
        }
    }
}

/// Render plain text as HTML paragraphs, skipping table fragments.
pub fn render_inline(text: &str) -> String {
    let mut blocks = Vec::new();
    let mut last = 0;
    for fragment in table_fragment().find_iter(text) {
        push_paragraphs(&mut blocks, &text[last..fragment.start()]);
        blocks.push(fragment.as_str().to_string());
        last = fragment.end();
    }
    push_paragraphs(&mut blocks, &text[last..]);
    blocks.join("\n")
}
