// ABOUTME: Pulls a JSON object out of free-form model output.
// ABOUTME: Tolerates prose and code fences around the object.

/// Return the first balanced `{...}` object in `text`, if any.
///
/// Braces inside JSON strings are ignored. Nothing is validated beyond
/// brace balance; callers deserialize and fall back on failure.
pub(crate) fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
