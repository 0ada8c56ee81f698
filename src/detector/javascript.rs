use super::lexer::{self, SourceView};
use super::{assigned_name, Detection, PromptSource};
use crate::model::{FieldType, InputGroup, Language};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(prompt|readline)\s*\(").unwrap());
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_$][\w$]*)\s*=\s*(?:readline\s*\.\s*)?createInterface\s*\(").unwrap()
});
static QUESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_$][\w$]*)\s*\.\s*question\s*\(").unwrap());
static NUMBER_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(parseInt|parseFloat|Number)\s*\(\s*$").unwrap());

pub(crate) fn scan(view: &SourceView<'_>) -> Vec<Detection> {
    let mut found = scan_prompt(view);
    found.extend(scan_question(view));
    found
}

fn scan_prompt(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    PROMPT
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let before = code[..whole.start()].trim_end();
            if before.ends_with('.') || before.ends_with("function") {
                return None;
            }
            let open = whole.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            let prompt = match (name, args.as_slice()) {
                ("readline" | "prompt", []) => PromptSource::Preceding,
                ("prompt", [(s, e), ..]) => PromptSource::Argument(view.literal_text(*s, *e)),
                _ => return None,
            };

            let kind = match NUMBER_WRAPPER.captures(before).and_then(|c| c.get(1)) {
                Some(w) if w.as_str() == "parseInt" => FieldType::Int,
                Some(_) => FieldType::Double,
                None => FieldType::String,
            };
            let vars = assigned_name(view, whole.start(), Language::JavaScript)
                .into_iter()
                .collect();
            let raw = view.slice(whole.start(), close);
            let group = InputGroup::new(Language::JavaScript, whole.start(), raw, format!("{name}()"))
                .line(kind.into())
                .with_vars(vars);
            Some(Detection { group, prompt, end: close })
        })
        .collect()
}

fn scan_question(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    let interfaces = INTERFACE
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect::<HashSet<_>>();

    QUESTION
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if !interfaces.contains(caps.get(1)?.as_str()) {
                return None;
            }
            let open = whole.end() - 1;
            let close = lexer::matching_paren(code, open)?;
            let args = lexer::split_args(code, open + 1, close - 1);
            let (s, e) = *args.first()?;
            let raw = view.slice(whole.start(), close);
            let group = InputGroup::new(Language::JavaScript, whole.start(), raw, "question()")
                .line(FieldType::String.into());
            Some(Detection {
                group,
                prompt: PromptSource::Argument(view.literal_text(s, e)),
                end: close,
            })
        })
        .collect()
}
