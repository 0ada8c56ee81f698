use super::lexer::{self, SourceView};
use super::{assigned_name, Detection, PromptSource};
use crate::model::{Field, FieldType, InputGroup, Language};
use regex::Regex;
use std::sync::LazyLock;

static INPUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\binput\s*\(").unwrap());
static READLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:sys\s*\.\s*)?stdin\s*\.\s*readline\s*\(\s*\)").unwrap());
static SPLIT_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\.\s*strip\s*\(\s*\)\s*)?\.\s*split\s*\(").unwrap());
static CAST_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(int|float|str|bool|eval)\s*\(\s*$").unwrap());
static MAP_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmap\s*\(\s*(int|float|str)\s*,\s*$").unwrap());
static UNPACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(?\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)+)\s*,?\s*\)?\s*=\s*").unwrap()
});

pub(crate) fn scan(view: &SourceView<'_>) -> Vec<Detection> {
    let mut found = scan_input(view);
    found.extend(scan_readline(view));
    found
}

fn scan_input(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    INPUT
        .find_iter(code)
        .filter_map(|m| {
            if is_attribute_or_definition(code, m.start()) {
                return None;
            }
            let open = m.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            let prompt = match args.as_slice() {
                [] => PromptSource::Preceding,
                [(s, e)] => PromptSource::Argument(view.literal_text(*s, *e)),
                _ => return None,
            };

            let raw = view.slice(m.start(), close);
            let before = &code[lexer::statement_start(code, m.start(), Language::Python)..m.start()];
            let split = SPLIT_AFTER.is_match(&code[close..]);
            let assigned = assigned_name(view, m.start(), Language::Python)
                .into_iter()
                .collect::<Vec<_>>();

            let group = match (split, unpacked_targets(before)) {
                (true, Some(targets)) => {
                    let kind = MAP_BEFORE
                        .captures(before)
                        .and_then(|c| c.get(1))
                        .map_or(FieldType::String, |k| cast_type(k.as_str()));
                    let fields = vec![Field::new(kind); targets.len()];
                    InputGroup::new(Language::Python, m.start(), raw, "input().split()")
                        .tokens(fields)
                        .with_vars(targets)
                }
                (true, None) => InputGroup::new(Language::Python, m.start(), raw, "input().split()")
                    .line(FieldType::String.into())
                    .with_vars(assigned),
                (false, _) => {
                    let kind = CAST_BEFORE
                        .captures(before)
                        .and_then(|c| c.get(1))
                        .map_or(FieldType::String, |k| cast_type(k.as_str()));
                    InputGroup::new(Language::Python, m.start(), raw, "input()")
                        .line(kind.into())
                        .with_vars(assigned)
                }
            };

            Some(Detection {
                group,
                prompt,
                end: close,
            })
        })
        .collect()
}

fn scan_readline(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    READLINE
        .find_iter(code)
        .filter(|m| !code[..m.start()].trim_end().ends_with('.'))
        .map(|m| {
            let before = &code[lexer::statement_start(code, m.start(), Language::Python)..m.start()];
            let kind = CAST_BEFORE
                .captures(before)
                .and_then(|c| c.get(1))
                .map_or(FieldType::String, |k| cast_type(k.as_str()));
            let vars = assigned_name(view, m.start(), Language::Python)
                .into_iter()
                .collect();
            let raw = view.slice(m.start(), m.end());
            let group = InputGroup::new(Language::Python, m.start(), raw, "stdin.readline()")
                .line(kind.into())
                .with_vars(vars);
            Detection {
                group,
                prompt: PromptSource::Preceding,
                end: m.end(),
            }
        })
        .collect()
}

/// `a, b = ...` → `["a", "b"]`; a single target is not an unpacking.
fn unpacked_targets(before: &str) -> Option<Vec<String>> {
    let caps = UNPACK.captures(before)?;
    let names = caps
        .get(1)?
        .as_str()
        .split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>();
    (names.len() > 1).then_some(names)
}

fn cast_type(name: &str) -> FieldType {
    match name {
        "int" => FieldType::Int,
        "float" => FieldType::Float,
        "bool" => FieldType::Boolean,
        "eval" => FieldType::Unknown,
        _ => FieldType::String,
    }
}

/// `obj.input(` and `def input(` are not calls to the builtin.
fn is_attribute_or_definition(code: &str, start: usize) -> bool {
    let before = code[..start].trim_end();
    before.ends_with('.') || before.ends_with("def")
}
