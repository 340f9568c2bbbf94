//! String literal bodies, cooked the way each language's own parser
//! reports a literal's value.

const REPLACEMENT: char = '\u{FFFD}';

/// Escape rules of a literal body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escapes {
    /// ECMAScript string literals.
    JavaScript,
    /// C# regular strings and character literals.
    CSharp,
    /// C# `@"..."`: only `""` is special.
    CSharpVerbatim,
    /// PHP double-quoted strings.
    PhpDouble,
    /// PHP single-quoted strings: only `\\` and `\'`.
    PhpSingle,
}

/// Body between one pair of matching `'` or `"` delimiters.
pub fn strip_quotes(raw: &str) -> Option<&str> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'') => {
            Some(&raw[1..raw.len() - 1])
        }
        _ => None,
    }
}

/// Replace escape sequences in a literal body by the characters they denote.
///
/// Sequences a language does not recognise are kept verbatim.
pub fn unescape(body: &str, escapes: Escapes) -> String {
    if escapes == Escapes::CSharpVerbatim {
        return body.replace("\"\"", "\"");
    }

    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(at) = rest.find('\\') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];
        let Some(c) = tail.chars().next() else {
            out.push('\\');
            return out;
        };

        let step = match escapes {
            Escapes::JavaScript => javascript(tail, c),
            Escapes::CSharp => csharp(tail, c),
            Escapes::PhpDouble => php_double(tail, c),
            Escapes::PhpSingle | Escapes::CSharpVerbatim => php_single(c),
        };
        match step {
            Some((cooked, used)) => {
                if let Some(ch) = cooked {
                    out.push(ch);
                }
                rest = &tail[used..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// One escape: the character produced (none for a line continuation) and
/// the bytes consumed after the backslash. `None` leaves the backslash in.
type Step = Option<(Option<char>, usize)>;

fn javascript(tail: &str, c: char) -> Step {
    let ch = match c {
        'n' => '\n',
        't' => '\t',
        '\r' if tail[1..].starts_with('\n') => return Some((None, 2)),
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'v' => '\u{b}',
        '0' if !tail[1..].starts_with(|d: char| d.is_ascii_digit()) => '\0',
        'x' => return hex_prefix(&tail[1..], 2, 2).map(|(v, n)| (char::from_u32(v), 1 + n)),
        'u' => {
            let after = &tail[1..];
            if let Some(braced) = after.strip_prefix('{') {
                let end = braced.find('}')?;
                let code = u32::from_str_radix(&braced[..end], 16).ok()?;
                return Some((Some(char::from_u32(code).unwrap_or(REPLACEMENT)), end + 3));
            }
            return utf16_unit(after).map(|(ch, n)| (Some(ch), 1 + n));
        }
        '\r' | '\n' | '\u{2028}' | '\u{2029}' => return Some((None, c.len_utf8())),
        _ => c,
    };
    Some((Some(ch), c.len_utf8()))
}

fn csharp(tail: &str, c: char) -> Step {
    let ch = match c {
        '\'' | '"' | '\\' => c,
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'e' => '\u{1b}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        'x' => {
            return hex_prefix(&tail[1..], 1, 4)
                .map(|(v, n)| (Some(char::from_u32(v).unwrap_or(REPLACEMENT)), 1 + n))
        }
        'u' => return utf16_unit(&tail[1..]).map(|(ch, n)| (Some(ch), 1 + n)),
        'U' => {
            return hex_prefix(&tail[1..], 8, 8)
                .map(|(v, n)| (Some(char::from_u32(v).unwrap_or(REPLACEMENT)), 1 + n))
        }
        _ => return None,
    };
    Some((Some(ch), 1))
}

fn php_double(tail: &str, c: char) -> Step {
    let ch = match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'v' => '\u{b}',
        'e' => '\u{1b}',
        'f' => '\u{c}',
        '\\' | '$' | '"' => c,
        '0'..='7' => {
            let len = tail
                .bytes()
                .take(3)
                .take_while(|b| (b'0'..=b'7').contains(b))
                .count();
            let code = u32::from_str_radix(&tail[..len], 8).ok()? & 0xFF;
            return Some((char::from_u32(code), len));
        }
        'x' => return hex_prefix(&tail[1..], 1, 2).map(|(v, n)| (char::from_u32(v), 1 + n)),
        'u' if tail[1..].starts_with('{') => {
            let braced = &tail[2..];
            let end = braced.find('}')?;
            let code = u32::from_str_radix(&braced[..end], 16).ok()?;
            return Some((Some(char::from_u32(code).unwrap_or(REPLACEMENT)), end + 3));
        }
        _ => return None,
    };
    Some((Some(ch), 1))
}

fn php_single(c: char) -> Step {
    matches!(c, '\\' | '\'').then_some((Some(c), 1))
}

/// A `XXXX` UTF-16 unit, joined with a following `\uXXXX` low surrogate.
fn utf16_unit(s: &str) -> Option<(char, usize)> {
    let (high, n) = hex_prefix(s, 4, 4)?;
    if (0xD800..0xDC00).contains(&high) {
        let low = s[n..]
            .strip_prefix("\\u")
            .and_then(|r| hex_prefix(r, 4, 4))
            .filter(|(low, _)| (0xDC00..0xE000).contains(low));
        if let Some((low, _)) = low {
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return Some((char::from_u32(code).unwrap_or(REPLACEMENT), n + 6));
        }
    }
    Some((char::from_u32(high).unwrap_or(REPLACEMENT), n))
}

/// Up to `max` leading hex digits of `s`, if at least `min` are present.
fn hex_prefix(s: &str, min: usize, max: usize) -> Option<(u32, usize)> {
    let len = s
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_hexdigit)
        .count();
    if len < min {
        return None;
    }
    u32::from_str_radix(&s[..len], 16).ok().map(|v| (v, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'abc'"), Some("abc"));
        assert_eq!(strip_quotes("\"\""), Some(""));
        assert_eq!(strip_quotes("\"a'"), None);
        assert_eq!(strip_quotes("x"), None);
    }

    #[test]
    fn test_javascript() {
        assert_eq!(unescape(r#"a\"b"#, Escapes::JavaScript), "a\"b");
        assert_eq!(unescape(r"tab\there", Escapes::JavaScript), "tab\there");
        assert_eq!(unescape(r"\x41\u0042\u{1F600}", Escapes::JavaScript), "AB\u{1F600}");
        assert_eq!(unescape(r"\uD83D\uDE00", Escapes::JavaScript), "\u{1F600}");
        assert_eq!(unescape("a\\\nb", Escapes::JavaScript), "ab");
        assert_eq!(unescape(r"\q\\", Escapes::JavaScript), "q\\");
    }

    #[test]
    fn test_csharp() {
        assert_eq!(unescape(r#"say \"hi\""#, Escapes::CSharp), "say \"hi\"");
        assert_eq!(unescape(r"\'", Escapes::CSharp), "'");
        assert_eq!(unescape(r"\x41\u0042\U0001F600", Escapes::CSharp), "AB\u{1F600}");
        assert_eq!(unescape(r#"c:\dir "" x"#, Escapes::CSharpVerbatim), r#"c:\dir " x"#);
    }

    #[test]
    fn test_php() {
        assert_eq!(unescape(r"it\'s \n", Escapes::PhpSingle), r"it's \n");
        assert_eq!(unescape(r"a\\b", Escapes::PhpSingle), r"a\b");
        assert_eq!(unescape(r#"say \"hi\"\n"#, Escapes::PhpDouble), "say \"hi\"\n");
        assert_eq!(unescape(r"\$x \101\x42\u{43}", Escapes::PhpDouble), "$x ABC");
        assert_eq!(unescape(r"\q", Escapes::PhpDouble), r"\q");
    }
}
