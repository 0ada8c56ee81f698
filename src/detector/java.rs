use super::lexer::{self, SourceView};
use super::{assigned_name, Detection, PromptSource};
use crate::model::{FieldType, InputGroup, Language};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static SCANNER_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*)\s*=\s*new\s+(?:java\.util\.)?Scanner\s*\(\s*System\.in\s*\)").unwrap()
});
static READER_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Za-z_]\w*)\s*=\s*new\s+(?:java\.io\.)?BufferedReader\s*\(\s*new\s+(?:java\.io\.)?InputStreamReader\s*\(\s*System\.in\s*\)",
    )
    .unwrap()
});
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\b[A-Za-z_]\w*|new\s+(?:java\.util\.)?Scanner\s*\(\s*System\.in\s*\))\s*\.\s*(nextInt|nextLong|nextShort|nextByte|nextDouble|nextFloat|nextBoolean|nextBigInteger|nextBigDecimal|nextLine|next|readLine)\s*\(\s*\)",
    )
    .unwrap()
});
static PARSE_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Integer\.parseInt|Long\.parseLong|Short\.parseShort|Double\.parseDouble|Float\.parseFloat|Boolean\.parseBoolean)\s*\(\s*$").unwrap()
});

pub(crate) fn scan(view: &SourceView<'_>) -> Vec<Detection> {
    let code = view.code();
    let scanners = receivers(&SCANNER_DECL, code);
    let readers = receivers(&READER_DECL, code);

    CALL.captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let receiver = caps.get(1)?.as_str();
            let method = caps.get(2)?.as_str();

            let inline_scanner = receiver.starts_with("new");
            let trusted = match method {
                "readLine" => readers.contains(receiver),
                _ => inline_scanner || scanners.contains(receiver),
            };
            if !trusted || (method == "nextLine" && discarded(code, whole.start(), whole.end())) {
                return None;
            }

            let raw = view.slice(whole.start(), whole.end());
            let spec = format!("{method}()");
            let base = InputGroup::new(Language::Java, whole.start(), raw, spec);
            let group = match method {
                "nextLine" => base.line(FieldType::String.into()),
                "readLine" => {
                    let wrapped = wrapper_type(code, whole.start());
                    base.line(wrapped.unwrap_or(FieldType::String).into())
                }
                _ => base.single(method_type(method).into()),
            };
            let vars = assigned_name(view, whole.start(), Language::Java)
                .into_iter()
                .collect();
            Some(Detection {
                group: group.with_vars(vars),
                prompt: PromptSource::Preceding,
                end: whole.end(),
            })
        })
        .collect()
}

fn discarded(code: &str, start: usize, end: usize) -> bool {
    let statement = lexer::statement_start(code, start, Language::Java);
    code[statement..start].trim().is_empty() && code[end..].trim_start().starts_with(';')
}

fn receivers(pattern: &Regex, code: &str) -> HashSet<String> {
    pattern
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn method_type(method: &str) -> FieldType {
    match method {
        "nextInt" | "nextLong" | "nextShort" | "nextByte" | "nextBigInteger" => FieldType::Int,
        "nextDouble" | "nextBigDecimal" => FieldType::Double,
        "nextFloat" => FieldType::Float,
        "nextBoolean" => FieldType::Boolean,
        _ => FieldType::String,
    }
}

/// `Integer.parseInt(br.readLine())` reads a line holding one int.
fn wrapper_type(code: &str, call_start: usize) -> Option<FieldType> {
    let caps = PARSE_WRAPPER.captures(&code[..call_start])?;
    let kind = match caps.get(1)?.as_str() {
        "Integer.parseInt" | "Long.parseLong" | "Short.parseShort" => FieldType::Int,
        "Double.parseDouble" => FieldType::Double,
        "Float.parseFloat" => FieldType::Float,
        _ => FieldType::Boolean,
    };
    Some(kind)
}
