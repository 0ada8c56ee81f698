use super::lexer::{self, SourceView};
use super::{Detection, PromptSource};
use crate::model::{InputGroup, Language};
use regex::Regex;
use std::sync::LazyLock;

static C_PRINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(printf|puts)\s*\(|\b(?:std::)?(cout)\s*<<").unwrap());
static JAVA_PRINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSystem\.out\.(print|println|printf)\s*\(").unwrap());
static PYTHON_PRINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(print)\s*\(").unwrap());
static JS_PRINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bconsole\.(log)\s*\(|\bprocess\.stdout\.(write)\s*\(").unwrap()
});
static PYTHON_KWARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*\s*=[^=]").unwrap());

/// One print-like statement and, when statically known, what it prints.
#[derive(Debug, Clone, PartialEq)]
struct PrintCall {
    start: usize,
    end: usize,
    text: Option<String>,
}

/// Attaches prompts to ordered detections and returns the final groups.
///
/// A read that prints its own argument keeps that argument. Any other read
/// takes the nearest print statement between the previous read and itself.
pub(crate) fn resolve(
    view: &SourceView<'_>,
    lang: Language,
    detections: Vec<Detection>,
) -> Vec<InputGroup> {
    let prints = print_calls(view, lang);
    let mut window_start = 0;

    detections
        .into_iter()
        .map(|detection| {
            let offset = detection.group.offset;
            let prompt = match detection.prompt {
                PromptSource::Argument(text) => text,
                PromptSource::Preceding => prints
                    .iter()
                    .filter(|p| p.start >= window_start && p.end <= offset)
                    .last()
                    .and_then(|p| p.text.clone()),
            };
            window_start = detection.end;
            detection.group.with_prompt(prompt.and_then(normalize))
        })
        .collect()
}

/// Drops the line break a print statement ends with; the terminal already
/// starts the input on a fresh line.
pub(crate) fn normalize(text: String) -> Option<String> {
    let trimmed = text.trim_end_matches(&['\n', '\r'][..]);
    if trimmed.trim().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn print_calls(view: &SourceView<'_>, lang: Language) -> Vec<PrintCall> {
    let pattern: &Regex = match lang {
        Language::C | Language::Cpp => &*C_PRINT,
        Language::Java => &*JAVA_PRINT,
        Language::Python => &*PYTHON_PRINT,
        Language::JavaScript => &*JS_PRINT,
    };
    let code = view.code();

    pattern
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.iter().skip(1).flatten().next()?.as_str();
            if name == "cout" {
                return Some(cout_call(view, whole.start(), whole.end()));
            }
            if lang == Language::Python && preceded_by_dot(code, whole.start()) {
                return None;
            }
            let open = whole.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            let text = match (lang, name) {
                (_, "printf") => single_literal(view, &args)
                    .and_then(|t| fold_printf(&t, lang == Language::Java)),
                (Language::Python, _) => python_print(view, &args),
                _ => single_literal(view, &args),
            };
            Some(PrintCall {
                start: whole.start(),
                end: close,
                text,
            })
        })
        .collect()
}

fn single_literal(view: &SourceView<'_>, args: &[(usize, usize)]) -> Option<String> {
    match args {
        [(start, end)] => view.literal_text(*start, *end),
        _ => None,
    }
}

fn python_print(view: &SourceView<'_>, args: &[(usize, usize)]) -> Option<String> {
    let code = view.code();
    let positional = args
        .iter()
        .filter(|(s, e)| !PYTHON_KWARG.is_match(&code[*s..*e]))
        .copied()
        .collect::<Vec<_>>();
    single_literal(view, &positional)
}

/// `cout << "a" << x;` is only known statically when every operand is a
/// literal or a stream manipulator.
fn cout_call(view: &SourceView<'_>, start: usize, operands_start: usize) -> PrintCall {
    let code = view.code();
    let end = lexer::statement_end(code, operands_start);
    let mut text = Some(String::new());

    for (s, e) in lexer::split_operator(code, operands_start, end, b"<<") {
        let piece = &code[s..e];
        let part = match piece {
            "endl" | "std::endl" => Some("\n".to_string()),
            "flush" | "std::flush" => Some(String::new()),
            _ => view.literal_text(s, e),
        };
        text = match (text, part) {
            (Some(mut acc), Some(part)) => {
                acc.push_str(&part);
                Some(acc)
            }
            _ => None,
        };
    }

    PrintCall { start, end, text }
}

/// printf text with no runtime conversions. `%%` prints a percent sign and
/// Java's `%n` a newline; anything else depends on arguments.
fn fold_printf(text: &str, java: bool) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('n') if java => out.push('\n'),
            _ => return None,
        }
    }
    Some(out)
}

fn preceded_by_dot(code: &str, offset: usize) -> bool {
    code[..offset].trim_end().ends_with('.')
}
