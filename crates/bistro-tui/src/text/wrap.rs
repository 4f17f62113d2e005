//! Text wrapping for chat bubbles.

/// Wrap `text` to `width` columns.
///
/// Line breaks in the input are kept as hard breaks and blank lines survive,
/// so message content is shown verbatim apart from soft wrapping. Always
/// returns at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    if width == 0 {
        return text.split('\n').map(str::to_owned).collect();
    }

    let lines: Vec<String> = textwrap::wrap(&text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
