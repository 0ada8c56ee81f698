//! C and C++ scanners.
//!
//! C: `scanf`/`fscanf(stdin, ...)`, `gets`, `fgets(.., stdin)` and assigned
//! `getchar()`. C++ adds `cin >> ...` chains and `getline(cin, ..)`.
//!
//! A whole `cin >> a >> b;` statement is one group with one field per target,
//! joined by spaces. A bare `getchar();` is the usual idiom for discarding the
//! newline left behind by `scanf`, so only assigned `getchar()` calls count.

use super::lexer::{self, SourceView};
use super::{Detection, PromptSource};
use crate::model::{Field, FieldType, InputGroup, Language};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static SCANF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(f?scanf)\s*\(").unwrap());
static GETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(f?gets)\s*\(").unwrap());
static GETCHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_]\w*(?:\[[^\]]*\])?)\s*=\s*(?:\(\s*\w+\s*\)\s*)?getchar\s*\(\s*\)").unwrap()
});
static CIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:std::)?cin\s*>>").unwrap());
static GETLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:std::)?getline\s*\(\s*(?:std::)?cin\s*,|\bcin\s*\.\s*getline\s*\(").unwrap()
});
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:const\s+|unsigned\s+|signed\s+)*(long\s+long|long\s+double|long|int|short|unsigned|float|double|char|bool|size_t|std::string|string)\s+([^;(){}]+)",
    )
    .unwrap()
});
static LVALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.:]*(?:\[[^\]]*\])*").unwrap());
static DECLARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s*&]*([A-Za-z_]\w*)\s*(\[)?").unwrap());

/// Stream manipulators that may sit in a `>>` chain without consuming input.
const MANIPULATORS: &[&str] = &["ws", "skipws", "noskipws", "hex", "dec", "oct"];

pub(crate) fn scan_c(view: &SourceView<'_>) -> Vec<Detection> {
    let mut found = scan_scanf(view, Language::C);
    found.extend(scan_gets(view, Language::C));
    found.extend(scan_getchar(view, Language::C));
    found
}

pub(crate) fn scan_cpp(view: &SourceView<'_>) -> Vec<Detection> {
    let mut found = scan_scanf(view, Language::Cpp);
    found.extend(scan_gets(view, Language::Cpp));
    found.extend(scan_getchar(view, Language::Cpp));
    found.extend(scan_cin(view));
    found.extend(scan_getline(view));
    found
}

fn scan_scanf(view: &SourceView<'_>, lang: Language) -> Vec<Detection> {
    let code = view.code();
    SCANF
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let from_file = caps.get(1)?.as_str() == "fscanf";
            let open = whole.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let mut args = lexer::split_args(code, open + 1, close - 1).into_iter();

            if from_file {
                let (s, e) = args.next()?;
                if code[s..e].trim() != "stdin" {
                    return None;
                }
            }
            let (fmt_start, fmt_end) = args.next()?;
            let format = view.literal_text(fmt_start, fmt_end)?;
            let fields = parse_format(&format);
            if fields.is_empty() {
                return None;
            }
            let vars = args
                .map(|(s, e)| target_name(view.slice(s, e)))
                .collect::<Vec<_>>();

            let raw = view.slice(whole.start(), close);
            let group = InputGroup::new(lang, whole.start(), raw, format)
                .tokens(fields)
                .with_vars(vars);
            Some(Detection {
                group,
                prompt: PromptSource::Preceding,
                end: close,
            })
        })
        .collect()
}

/// Fields consumed by one scanf format, in order.
///
/// `%*d` discards its value but still consumes input from the user, so it
/// keeps a field. `%%` and `%n` consume nothing.
pub(crate) fn parse_format(format: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            continue;
        }
        if chars.peek() == Some(&'*') {
            chars.next();
        }
        let mut conversion = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() || matches!(c, 'h' | 'l' | 'L' | 'j' | 'z' | 't' | 'q') {
                conversion.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let Some(spec) = chars.next() else {
            break;
        };
        if spec == 'n' {
            continue;
        }
        if spec == '[' {
            // a `]` right after `[` or `[^` belongs to the set
            let mut first = true;
            for c in chars.by_ref() {
                if c == ']' && !first {
                    break;
                }
                if c != '^' {
                    first = false;
                }
            }
            conversion.push(']');
        } else {
            conversion.push(spec);
        }
        fields.push(Field::new(FieldType::from_conversion(&conversion)));
    }
    fields
}

fn scan_gets(view: &SourceView<'_>, lang: Language) -> Vec<Detection> {
    let code = view.code();
    GETS.captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let open = whole.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            let target = match (name, args.as_slice()) {
                ("gets", [(s, e)]) => target_name(view.slice(*s, *e)),
                ("fgets", [(s, e), _, (fs, fe)]) if code[*fs..*fe].trim() == "stdin" => {
                    target_name(view.slice(*s, *e))
                }
                _ => return None,
            };
            let raw = view.slice(whole.start(), close);
            let group = InputGroup::new(lang, whole.start(), raw, format!("{name}()"))
                .line(FieldType::String.into())
                .with_vars(vec![target]);
            Some(Detection {
                group,
                prompt: PromptSource::Preceding,
                end: close,
            })
        })
        .collect()
}

fn scan_getchar(view: &SourceView<'_>, lang: Language) -> Vec<Detection> {
    GETCHAR
        .captures_iter(view.code())
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(1)?.as_str().to_string();
            let raw = view.slice(whole.start(), whole.end());
            let group = InputGroup::new(lang, whole.start(), raw, "getchar()")
                .single(FieldType::Char.into())
                .with_vars(vec![target]);
            Some(Detection {
                group,
                prompt: PromptSource::Preceding,
                end: whole.end(),
            })
        })
        .collect()
}

fn scan_cin(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    let declarations = declared_types(view);

    CIN.find_iter(code)
        .filter_map(|m| {
            let end = lexer::statement_end(code, m.end());
            let targets = chain_targets(view, m.end(), end);
            if targets.is_empty() {
                return None;
            }

            let fields = targets
                .iter()
                .map(|t| Field::new(declared_kind(&declarations, t, m.start())))
                .collect();
            let spec = format!("cin>>{}", targets.join(">>"));
            let group = InputGroup::new(Language::Cpp, m.start(), view.slice(m.start(), end), spec)
                .tokens(fields)
                .with_vars(targets);
            Some(Detection {
                group,
                prompt: PromptSource::Preceding,
                end,
            })
        })
        .collect()
}

fn scan_getline(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    GETLINE
        .find_iter(code)
        .filter_map(|m| {
            let open = code[..m.end()].rfind('(')?;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            // getline(cin, s) names the target second, cin.getline(buf, n) first
            let target = if code[open + 1..m.end()].contains("cin") {
                args.get(1)
            } else {
                args.first()
            };
            let (s, e) = *target?;
            let raw = view.slice(m.start(), close);
            let group = InputGroup::new(Language::Cpp, m.start(), raw, "getline()")
                .line(FieldType::String.into())
                .with_vars(vec![target_name(view.slice(s, e))]);
            Some(Detection {
                group,
                prompt: PromptSource::Preceding,
                end: close,
            })
        })
        .collect()
}

/// Targets of a `>>` chain. The chain stops at the first operand that is not
/// a plain lvalue, as in `while (cin >> n && n > 0)`.
fn chain_targets(view: &SourceView<'_>, start: usize, end: usize) -> Vec<String> {
    let mut targets = Vec::new();
    for (s, e) in lexer::split_operator(view.code(), start, end, b">>") {
        let operand = view.slice(s, e).trim();
        let Some(lvalue) = LVALUE.find(operand) else {
            break;
        };
        let name = lvalue.as_str();
        if !MANIPULATORS.contains(&name.trim_start_matches("std::")) {
            targets.push(name.to_string());
        }
        if lvalue.end() != operand.len() {
            break;
        }
    }
    targets
}

/// Declared variables with the offset of their declaration.
fn declared_types(view: &SourceView<'_>) -> HashMap<String, Vec<(usize, FieldType)>> {
    let mut types: HashMap<String, Vec<(usize, FieldType)>> = HashMap::new();
    for caps in DECLARATION.captures_iter(view.code()) {
        let (Some(type_name), Some(list)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        for declarator in lexer::split_args(view.code(), list.start(), list.end()) {
            let text = &view.code()[declarator.0..declarator.1];
            let Some(d) = DECLARATOR.captures(text) else {
                continue;
            };
            let Some(name) = d.get(1) else {
                continue;
            };
            let array = d.get(2).is_some() || text.trim_start().starts_with('*');
            let kind = match type_name.as_str() {
                "char" if array => FieldType::String,
                t if t.contains("double") => FieldType::Double,
                t if t.starts_with("long") => FieldType::Int,
                t => FieldType::from_declared(t),
            };
            types
                .entry(name.as_str().to_string())
                .or_default()
                .push((declarator.0, kind));
        }
    }
    types
}

/// Type of a `>>` target: the closest declaration before the read, or any
/// declaration if the variable is declared later (globals, members).
fn declared_kind(
    declarations: &HashMap<String, Vec<(usize, FieldType)>>,
    target: &str,
    offset: usize,
) -> FieldType {
    let name = target
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|s| !s.is_empty())
        .unwrap_or(target);
    let Some(candidates) = declarations.get(name) else {
        return FieldType::Unknown;
    };
    let indexed = target.contains('[');
    let kind = candidates
        .iter()
        .filter(|(at, _)| *at < offset)
        .last()
        .or_else(|| candidates.first())
        .map_or(FieldType::Unknown, |(_, kind)| *kind);
    // reading one element of a char array is still a single char
    if indexed && kind == FieldType::String {
        FieldType::Char
    } else {
        kind
    }
}

/// Variable written through an out-argument: `&a` → `a`, `&arr[i]` → `arr[i]`.
fn target_name(arg: &str) -> String {
    arg.trim().trim_start_matches('&').trim().to_string()
}
