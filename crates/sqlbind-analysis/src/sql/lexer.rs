//! A lightweight SQL tokenizer.
//!
//! Only what classification and placeholder extraction need: words,
//! placeholders, parentheses, commas and statement separators. Comments,
//! quoted strings, and quoted identifiers are skipped so placeholders inside
//! them are never reported.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlTokenKind {
    Word,
    /// `@name` or `$name`; the token text excludes the prefix.
    Parameter { prefix: char },
    /// `@@name`, a server variable.
    SystemVariable,
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlToken<'a> {
    pub kind: SqlTokenKind,
    pub text: &'a str,
    /// Byte offset of the token (of the prefix, for placeholders).
    pub offset: usize,
}

impl SqlToken<'_> {
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == SqlTokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }
}

pub fn lex(sql: &str) -> Vec<SqlToken<'_>> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        i = match b {
            b'-' if next == Some(b'-') => skip_line(bytes, i + 2),
            b'/' if next == Some(b'*') => skip_block_comment(bytes, i + 2),
            b'\'' => skip_quoted(bytes, i + 1, b'\''),
            b'"' => skip_quoted(bytes, i + 1, b'"'),
            b'`' => skip_quoted(bytes, i + 1, b'`'),
            b'[' => skip_quoted(bytes, i + 1, b']'),
            b'(' | b')' | b',' | b';' => {
                let kind = match b {
                    b'(' => SqlTokenKind::OpenParen,
                    b')' => SqlTokenKind::CloseParen,
                    b',' => SqlTokenKind::Comma,
                    _ => SqlTokenKind::Semicolon,
                };
                tokens.push(SqlToken {
                    kind,
                    text: &sql[i..i + 1],
                    offset: i,
                });
                i + 1
            }
            b'@' if next == Some(b'@') => {
                let end = ident_end(bytes, i + 2);
                tokens.push(SqlToken {
                    kind: SqlTokenKind::SystemVariable,
                    text: &sql[i..end],
                    offset: i,
                });
                end
            }
            b'@' if next.is_some_and(is_ident_start) => {
                let end = ident_end(bytes, i + 1);
                tokens.push(SqlToken {
                    kind: SqlTokenKind::Parameter { prefix: '@' },
                    text: &sql[i + 1..end],
                    offset: i,
                });
                end
            }
            b'$' if next == Some(b'$') => skip_dollar_quoted(bytes, i + 2, b"$$"),
            b'$' if next.is_some_and(is_ident_start) => {
                let end = ident_end(bytes, i + 1);
                if bytes.get(end) == Some(&b'$') {
                    skip_dollar_quoted(bytes, end + 1, &bytes[i..=end])
                } else {
                    tokens.push(SqlToken {
                        kind: SqlTokenKind::Parameter { prefix: '$' },
                        text: &sql[i + 1..end],
                        offset: i,
                    });
                    end
                }
            }
            _ if is_ident_start(b) => {
                let end = ident_end(bytes, i);
                tokens.push(SqlToken {
                    kind: SqlTokenKind::Word,
                    text: &sql[i..end],
                    offset: i,
                });
                end
            }
            // Numbers (and `$1`-style positional markers) are not interesting.
            _ if b.is_ascii_digit() => ident_end(bytes, i),
            _ => i + 1,
        };
    }

    tokens
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_char(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_line(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1usize;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    i
}

/// Skip to just past `close`; a doubled closer is an escaped one.
fn skip_quoted(bytes: &[u8], mut i: usize, close: u8) -> usize {
    while i < bytes.len() {
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

fn skip_dollar_quoted(bytes: &[u8], start: usize, tag: &[u8]) -> usize {
    bytes[start.min(bytes.len())..]
        .windows(tag.len())
        .position(|w| w == tag)
        .map_or(bytes.len(), |at| start + at + tag.len())
}
