//! Text wrapping for terminal output.

/// Split text into lines of max width (columns). Uses textwrap for correct UTF-8 handling.
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    textwrap::wrap(s, width)
        .into_iter()
        .map(|cow| cow.into_owned())
        .collect()
}

/// Wrap every line of `msg` to `width`, keeping blank lines and indentation
/// of list items.
pub fn wrap_message(msg: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in msg.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if indent == 0 || indent >= width {
            out.extend(wrap_text(line, width));
        } else {
            let pad = " ".repeat(indent);
            let opts = textwrap::Options::new(width)
                .initial_indent(&pad)
                .subsequent_indent(&pad);
            out.extend(
                textwrap::wrap(line.trim_start(), opts)
                    .into_iter()
                    .map(|cow| cow.into_owned()),
            );
        }
    }
    out
}
