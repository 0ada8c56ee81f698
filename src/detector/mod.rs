//! Input detector: finds every blocking stdin read in a program, in source
//! order, without compiling it.
//!
//! Each supported language has one scanner function; [`scanner_for`] is the
//! single dispatch table. Scanners work on a [`SourceView`] whose comments and
//! literal contents are masked, so reads mentioned inside strings or comments
//! are never reported. Anything a scanner cannot classify with confidence is
//! left out rather than guessed.

pub mod lexer;
pub mod prompt;

mod c_family;
mod java;
mod javascript;
mod python;

pub use lexer::SourceView;

use crate::model::{InputGroup, Language};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

static WRAPPERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[A-Za-z_][\w.]*\s*\(\s*)+$").unwrap());
static ASSIGN_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][\w.]*(?:\[[^\]]*\])?)\s*(?:\+|-|\*|/)?=\s*$").unwrap()
});

/// Where a group's prompt text comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PromptSource {
    /// The read call prints its own argument (`input("Age: ")`). `None` when
    /// that argument is not a plain literal.
    Argument(Option<String>),
    /// Look for the nearest print-like statement before the call.
    Preceding,
}

/// A scanner hit before ordering and prompt resolution.
#[derive(Debug, Clone)]
pub(crate) struct Detection {
    pub group: InputGroup,
    pub prompt: PromptSource,
    /// Offset one past the end of the read call.
    pub end: usize,
}

type ScanFn = fn(&SourceView<'_>) -> Vec<Detection>;

fn scanner_for(lang: Language) -> ScanFn {
    match lang {
        Language::C => c_family::scan_c,
        Language::Cpp => c_family::scan_cpp,
        Language::Java => java::scan,
        Language::Python => python::scan,
        Language::JavaScript => javascript::scan,
    }
}

/// Detects reads for a sandbox language id. Unknown ids yield no groups.
pub fn detect(source: &str, language_id: u32) -> Vec<InputGroup> {
    match Language::from_judge0_id(language_id) {
        Some(lang) => detect_for(source, lang),
        None => {
            debug!(language_id, "No scanner for language id, running non-interactively");
            Vec::new()
        }
    }
}

#[instrument(skip(source), fields(source_len = source.len()))]
pub fn detect_for(source: &str, lang: Language) -> Vec<InputGroup> {
    let view = SourceView::new(source, lang);
    let mut detections = scanner_for(lang)(&view);

    detections.sort_by_key(|d| d.group.offset);
    detections.dedup_by_key(|d| d.group.offset);

    let groups = prompt::resolve(&view, lang, detections)
        .into_iter()
        .enumerate()
        .map(|(i, mut group)| {
            group.id = format!("{}-{}", lang.tag(), i);
            group
        })
        .collect::<Vec<_>>();

    debug!(groups = groups.len(), "Input detection completed");
    groups
}

/// Name assigned by the statement containing a call, e.g. `n` for
/// `int n = Integer.parseInt(br.readLine())` or `x = int(input())`.
pub(crate) fn assigned_name(
    view: &SourceView<'_>,
    call_start: usize,
    lang: Language,
) -> Option<String> {
    let code = view.code();
    let start = lexer::statement_start(code, call_start, lang);
    let prefix = code.get(start..call_start)?;
    let prefix = WRAPPERS.replace(prefix, "");
    ASSIGN_TARGET
        .captures(&prefix)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
