// Command directive extraction from reply text
//
// Replies may carry one embedded `[RUN:<command>]` (or `[RUN <command>]`)
// tag asking the client to run a shell command. The closing `]` only counts
// when followed by end-of-text, a space, or a newline, so command bodies may
// contain brackets of their own. An unterminated tag captures through the
// end of the text rather than failing.

/// Literal marker that opens a command directive.
const MARKER: &str = "[RUN";

/// Byte span of one directive occurrence within a reply.
struct Span {
    start: usize,
    end: usize,
    body_start: usize,
    body_end: usize,
}

/// Find the first directive span at or after `from`. Occurrences whose
/// command body trims to nothing are skipped, matching how a later
/// well-formed tag wins over a degenerate `[RUN:]`.
fn find_span(text: &str, mut from: usize) -> Option<Span> {
    while let Some(offset) = text[from..].find(MARKER) {
        let start = from + offset;
        let span = scan_span(text, start);
        if !text[span.body_start..span.body_end].trim().is_empty() {
            return Some(span);
        }
        from = start + 1;
    }
    None
}

fn scan_span(text: &str, start: usize) -> Span {
    let bytes = text.as_bytes();
    let mut cursor = start + MARKER.len();

    if bytes.get(cursor) == Some(&b':') {
        cursor += 1;
    }
    for c in text[cursor..].chars() {
        if !c.is_whitespace() {
            break;
        }
        cursor += c.len_utf8();
    }

    let body_start = cursor;
    let mut pos = cursor;
    while pos < bytes.len() {
        if bytes[pos] == b']' {
            let closes = match bytes.get(pos + 1) {
                None | Some(&b' ') | Some(&b'\n') => true,
                _ => false,
            };
            if closes {
                return Span {
                    start,
                    end: pos + 1,
                    body_start,
                    body_end: pos,
                };
            }
        }
        pos += 1;
    }

    // No terminating bracket: fail open and capture through end of text.
    Span {
        start,
        end: text.len(),
        body_start,
        body_end: text.len(),
    }
}

/// Extract the command named by the first directive in `text`, trimmed.
/// Returns `None` when no directive is present.
pub fn extract_command(text: &str) -> Option<String> {
    find_span(text, 0).map(|span| text[span.body_start..span.body_end].trim().to_string())
}

/// True when `text` carries at least one extractable directive.
pub fn contains_directive(text: &str) -> bool {
    find_span(text, 0).is_some()
}

/// Remove every directive-shaped span from `text` and trim the result.
/// Spans are the exact ranges `extract_command` would match, so stripping
/// and extraction can never disagree about where a directive ends.
pub fn strip_directives(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(span) = find_span(text, cursor) {
        out.push_str(&text[cursor..span.start]);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out.trim().to_string()
}
