//! Literal decoding with per-character source positions.

use sqlbind_core::callsite::{LiteralForm, LiteralFragment};
use sqlbind_core::Location;

/// One decoded character and the source position of its first raw character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedChar {
    pub ch: char,
    pub line: u32,
    pub column: u32,
}

/// Decode a literal's escapes, tracking where each output character came from.
///
/// `interpolated` collapses doubled braces, as in the text parts of an
/// interpolated literal.
pub fn decode_fragment(fragment: &LiteralFragment, interpolated: bool) -> Vec<DecodedChar> {
    let chars: Vec<char> = fragment.text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut line = fragment.start.line;
    let mut column = fragment.start.column;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let (decoded, consumed) = match (fragment.form, c) {
            (_, '{' | '}') if interpolated && chars.get(i + 1) == Some(&c) => (Some(c), 2),
            (LiteralForm::Regular, '\\') => {
                let (decoded, used) = decode_escape(&chars[i + 1..]);
                (decoded, used + 1)
            }
            (LiteralForm::Verbatim, '"') if chars.get(i + 1) == Some(&'"') => (Some('"'), 2),
            _ => (Some(c), 1),
        };

        if let Some(ch) = decoded {
            out.push(DecodedChar { ch, line, column });
        }
        for raw in &chars[i..(i + consumed).min(chars.len())] {
            if *raw == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        i += consumed;
    }

    out
}

/// Decimal text of an integer constant placed at `at`.
pub fn decode_number(value: i64, at: &Location) -> Vec<DecodedChar> {
    value
        .to_string()
        .chars()
        .enumerate()
        .map(|(i, ch)| DecodedChar {
            ch,
            line: at.line,
            column: at.column + i as u32,
        })
        .collect()
}

/// Decode the escape following a backslash. Returns the decoded character
/// and how many characters after the backslash were consumed.
fn decode_escape(rest: &[char]) -> (Option<char>, usize) {
    let Some(&first) = rest.first() else {
        return (Some('\\'), 0);
    };
    let simple = match first {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '0' => Some('\0'),
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'v' => Some('\u{0B}'),
        '\\' | '"' | '\'' => Some(first),
        _ => None,
    };
    if let Some(ch) = simple {
        return (Some(ch), 1);
    }

    let (min, max) = match first {
        'u' => (4, 4),
        'U' => (8, 8),
        'x' => (1, 4),
        _ => return (Some(first), 1),
    };
    let digits: String = rest[1..]
        .iter()
        .take(max)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    if digits.len() < min {
        return (Some(first), 1);
    }
    let decoded = u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    (Some(decoded), 1 + digits.len())
}
