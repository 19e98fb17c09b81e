/// Drop literal backslash escapes the model leaves around markdown
/// characters (`\*`, `\_`) and trim the result.
///
/// Each backslash is removed together with any backslashes that directly
/// follow the escaped character; the escaped character itself is kept. A
/// backslash before a line break is dropped and the break kept.
pub fn strip_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        if let Some(&next) = chars.peek()
            && !is_line_break(next)
        {
            out.push(next);
            chars.next();
        }
        while chars.peek() == Some(&'\\') {
            chars.next();
        }
    }

    out.trim().to_string()
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
