//! Comment stripping for JSON documents.
//!
//! Manifests are allowed to carry `//` and `/* */` comments. They are blanked
//! out (not removed) so that `serde_json` line/column positions still point
//! at the original text.

/// Replace every comment outside string literals with whitespace.
///
/// Newlines inside block comments are kept.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                chars.next();
                out.push_str("  ");
                while let Some(&next) = chars.peek() {
                    if next == '\n' || next == '\r' {
                        break;
                    }
                    chars.next();
                    out.push(' ');
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        out.push(' ');
                        break;
                    }
                    out.push(if next == '\n' || next == '\r' { next } else { ' ' });
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}
