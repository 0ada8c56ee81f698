//! Lexical masking shared by every scanner.
//!
//! Patterns run over a copy of the source where comments and the contents of
//! string/char literals are blanked out. Byte offsets are identical in both
//! texts, so a match in the masked copy maps straight back onto the original
//! and literal values are looked up by the offset of their opening quote.

use crate::model::Language;

/// A string literal found while masking.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Offset of the opening quote (after any prefix such as `f` or `r`).
    pub start: usize,
    /// Offset one past the closing quote.
    pub end: usize,
    /// Unescaped contents.
    pub value: String,
    /// Interpolated at runtime (f-string, template literal with `${`).
    pub formatted: bool,
}

#[derive(Debug)]
pub struct SourceView<'a> {
    source: &'a str,
    code: String,
    literals: Vec<Literal>,
}

impl<'a> SourceView<'a> {
    pub fn new(source: &'a str, lang: Language) -> Self {
        let (code, literals) = mask(source, lang);
        Self {
            source,
            code,
            literals,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Source with comments and literal contents replaced by spaces.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Original text of a byte range, clamped to the source.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.source.len());
        self.source.get(start.min(end)..end).unwrap_or("")
    }

    pub fn literal_at(&self, quote_offset: usize) -> Option<&Literal> {
        self.literals
            .binary_search_by_key(&quote_offset, |l| l.start)
            .ok()
            .map(|i| &self.literals[i])
    }

    /// Reads a range made only of string literals (adjacent literals are
    /// concatenated, as C does). Returns `None` when anything else appears or
    /// a literal is interpolated at runtime.
    pub fn literal_text(&self, start: usize, end: usize) -> Option<String> {
        let bytes = self.code.as_bytes();
        let end = end.min(bytes.len());
        let mut pos = start;
        let mut text = String::new();
        let mut seen = false;

        while pos < end {
            let b = bytes[pos];
            if b.is_ascii_whitespace() {
                pos += 1;
                continue;
            }
            let literal = self
                .literal_at(pos)
                .or_else(|| self.prefixed_literal(pos))?;
            if literal.formatted || literal.end > end {
                return None;
            }
            text.push_str(&literal.value);
            pos = literal.end;
            seen = true;
        }

        seen.then_some(text)
    }

    /// A literal behind a one- or two-letter prefix (`r"..."`, `L"..."`).
    fn prefixed_literal(&self, pos: usize) -> Option<&Literal> {
        let bytes = self.code.as_bytes();
        (1..=2)
            .take_while(|k| bytes.get(pos + k - 1).is_some_and(u8::is_ascii_alphanumeric))
            .find_map(|k| self.literal_at(pos + k))
    }
}

/// Finds the offset one past the parenthesis closing the one at `open`.
pub fn matching_paren(code: &str, open: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return if b == b')' { Some(i + 1) } else { None };
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `code[start..end]` on top-level commas. Ranges are trimmed.
pub fn split_args(code: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let bytes = code.as_bytes();
    let end = end.min(bytes.len());
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut arg_start = start;

    for i in start..end {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                args.push(trim_range(code, arg_start, i));
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    let last = trim_range(code, arg_start, end);
    if last.0 < last.1 || !args.is_empty() {
        args.push(last);
    }
    args
}

pub fn trim_range(code: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    let bytes = code.as_bytes();
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    (start, end)
}

/// End of the statement starting at `from`: the offset of the first `;`,
/// `{` or unmatched closing bracket at depth zero, or the end of the code.
pub fn statement_end(code: &str, from: usize) -> usize {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' | b'}' if depth == 0 => return i,
            b')' | b']' => depth -= 1,
            b';' | b'{' if depth == 0 => return i,
            _ => {}
        }
    }
    bytes.len()
}

/// Splits `code[start..end]` on a two-byte operator (`<<`, `>>`) appearing at
/// bracket depth zero. Ranges are trimmed.
pub fn split_operator(code: &str, start: usize, end: usize, op: &[u8; 2]) -> Vec<(usize, usize)> {
    let bytes = code.as_bytes();
    let end = end.min(bytes.len());
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut part_start = start;
    let mut i = start;

    while i < end {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b if depth == 0 && b == op[0] && bytes.get(i + 1) == Some(&op[1]) && i + 1 < end => {
                parts.push(trim_range(code, part_start, i));
                i += 2;
                part_start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(trim_range(code, part_start, end));
    parts
}

/// Start of the statement containing `offset`: just after the previous `;`,
/// `{`, `}` or, for Python, line break.
pub fn statement_start(code: &str, offset: usize, lang: Language) -> usize {
    let bytes = code.as_bytes();
    let mut i = offset.min(bytes.len());
    while i > 0 {
        let b = bytes[i - 1];
        let boundary = match lang {
            Language::Python => b == b'\n' || b == b';',
            _ => matches!(b, b';' | b'{' | b'}'),
        };
        if boundary {
            break;
        }
        i -= 1;
    }
    i
}

fn mask(source: &str, lang: Language) -> (String, Vec<Literal>) {
    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let mut literals = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        let comment_end = match (lang, b, next) {
            (Language::Python, b'#', _) => Some(line_end(bytes, i)),
            (l, b'/', Some(b'/')) if l != Language::Python => Some(line_end(bytes, i)),
            (l, b'/', Some(b'*')) if l != Language::Python => Some(block_end(bytes, i + 2)),
            _ => None,
        };
        if let Some(end) = comment_end {
            blank(&mut out, i, end);
            i = end;
            continue;
        }

        let quoted = match b {
            b'\'' if lang == Language::Cpp && digit_separator(bytes, i) => false,
            b'"' | b'\'' => true,
            b'`' => lang == Language::JavaScript,
            _ => false,
        };
        if !quoted {
            i += 1;
            continue;
        }

        let (prefix_raw, prefix_formatted) = python_prefix(lang, bytes, i);
        let triple = match lang {
            Language::Python => true,
            Language::Java => b == b'"',
            _ => false,
        };
        let literal = if triple && next == Some(b) && bytes.get(i + 2) == Some(&b) {
            read_literal(bytes, i, 3, prefix_raw)
        } else {
            read_literal(bytes, i, 1, prefix_raw)
        };

        let delim = literal.delim;
        blank(&mut out, i + delim, literal.body_end);
        let formatted = prefix_formatted || (b == b'`' && literal.value.contains("${"));
        literals.push(Literal {
            start: i,
            end: literal.end,
            value: literal.value,
            formatted,
        });
        i = literal.end;
    }

    let code = String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    (code, literals)
}

struct RawLiteral {
    delim: usize,
    body_end: usize,
    end: usize,
    value: String,
}

fn read_literal(bytes: &[u8], start: usize, delim: usize, raw: bool) -> RawLiteral {
    let quote = bytes[start];
    let body_start = start + delim;
    let mut i = body_start;
    let mut value = Vec::new();

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && i + 1 < bytes.len() {
            if raw {
                value.extend_from_slice(&bytes[i..i + 2]);
            } else {
                push_escape(&mut value, bytes[i + 1]);
            }
            i += 2;
            continue;
        }
        if b == quote && (delim == 1 || bytes[i..].starts_with(&[quote; 3])) {
            return RawLiteral {
                delim,
                body_end: i,
                end: i + delim,
                value: String::from_utf8_lossy(&value).into_owned(),
            };
        }
        // single-line literals never span a raw newline
        if b == b'\n' && delim == 1 && quote != b'`' {
            break;
        }
        value.push(b);
        i += 1;
    }

    RawLiteral {
        delim,
        body_end: i,
        end: i,
        value: String::from_utf8_lossy(&value).into_owned(),
    }
}

fn push_escape(value: &mut Vec<u8>, escaped: u8) {
    match escaped {
        b'n' => value.push(b'\n'),
        b't' => value.push(b'\t'),
        b'r' => value.push(b'\r'),
        b'0' => value.push(0),
        b'\n' => {}
        other => value.push(other),
    }
}

/// Python string prefixes (`f`, `r`, `rb`, `Rf` ...) directly before a quote.
fn python_prefix(lang: Language, bytes: &[u8], quote: usize) -> (bool, bool) {
    if lang != Language::Python {
        return (false, false);
    }
    let mut raw = false;
    let mut formatted = false;
    let mut i = quote;
    while i > 0 && quote - i < 2 {
        match bytes[i - 1].to_ascii_lowercase() {
            b'r' => raw = true,
            b'f' => formatted = true,
            b'b' | b'u' => {}
            _ => break,
        }
        i -= 1;
    }
    // an identifier ending in `r`/`f` is not a prefix
    if i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_') {
        return (false, false);
    }
    (raw, formatted)
}

/// C++14 `1'000`: a quote inside a numeric literal.
fn digit_separator(bytes: &[u8], quote: usize) -> bool {
    if !bytes.get(quote + 1).is_some_and(u8::is_ascii_hexdigit) {
        return false;
    }
    let token_start = bytes[..quote]
        .iter()
        .rposition(|&b| !(b.is_ascii_alphanumeric() || b == b'\''))
        .map_or(0, |p| p + 1);
    token_start < quote && bytes[token_start].is_ascii_digit()
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| from + p)
}

fn block_end(bytes: &[u8], from: usize) -> usize {
    bytes[from.min(bytes.len())..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| from + p + 2)
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    let stop = end.min(out.len());
    for b in &mut out[start.min(stop)..stop] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}
