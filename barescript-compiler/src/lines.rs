//! Line splitting and continuation joining (§4.3, §6).

/// One logical source line: joined physical lines with the trailing
/// backslash removed, plus the byte offset and 1-based line number of the
/// physical line it *starts* on (used to anchor [`barescript_core::Span`]s).
pub struct LogicalLine {
    pub text: String,
    pub offset: usize,
    pub line_no: usize,
}

/// Split `source` on `\r?\n`, joining any line ending in `\` (optionally
/// followed by trailing whitespace) to the next physical line with the
/// backslash removed. Lines that are blank or comment-only
/// (`^\s*(//.*)?$`) are dropped entirely — they never reach the parser.
pub fn split_logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut physical = Vec::new();
    let mut offset = 0usize;
    for raw in source.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        physical.push((line, offset));
        offset += raw.len() + 1; // account for the '\n' we split on
    }

    let mut out = Vec::new();
    let mut i = 0usize;
    while i < physical.len() {
        let (first_text, first_offset) = physical[i];
        let line_no = i + 1;
        let mut joined = String::new();
        let mut cur = first_text;
        let mut cur_offset = first_offset;
        let mut j = i;
        loop {
            let trimmed_end = cur.trim_end();
            if let Some(stripped) = trimmed_end.strip_suffix('\\') {
                joined.push_str(stripped);
                j += 1;
                if j >= physical.len() {
                    break;
                }
                let (next_text, next_offset) = physical[j];
                cur = next_text;
                cur_offset = next_offset;
            } else {
                joined.push_str(cur);
                break;
            }
        }
        let _ = cur_offset;

        if !is_blank_or_comment(&joined) {
            out.push(LogicalLine {
                text: joined,
                offset: first_offset,
                line_no,
            });
        }
        i = j + 1;
    }
    out
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_backslash_continuations() {
        let lines = split_logical_lines("a = 1 + \\\n    2\nb = 3");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text.trim(), "a = 1 +     2");
        assert_eq!(lines[1].text, "b = 3");
    }

    #[test]
    fn drops_comment_and_blank_lines() {
        let lines = split_logical_lines("// hi\n\na = 1\n   \n// another");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "a = 1");
    }
}
