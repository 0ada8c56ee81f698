use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Prompt,
    Input,
    Output,
    Error,
    Notice,
    Meta,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: LineKind,
    pub text: String,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(TranscriptLine {
            kind,
            text: text.into(),
        });
    }

    pub fn prompt(&mut self, text: impl Into<String>) {
        self.push(LineKind::Prompt, text);
    }

    pub fn input(&mut self, text: impl Into<String>) {
        self.push(LineKind::Input, text);
    }

    pub fn output(&mut self, text: impl Into<String>) {
        self.push(LineKind::Output, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(LineKind::Error, text);
    }

    pub fn notice(&mut self, text: impl Into<String>) {
        self.push(LineKind::Notice, text);
    }

    pub fn meta(&mut self, text: impl Into<String>) {
        self.push(LineKind::Meta, text);
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Lines appended at or after `from`.
    pub fn since(&self, from: usize) -> &[TranscriptLine] {
        self.lines.get(from..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptLine> {
        self.lines.last()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_order_and_kind() {
        let mut t = Transcript::new();
        t.prompt("Enter n: ");
        t.input("5");
        t.output("25");
        t.meta("Accepted · 0.01 s · 1024 KB");

        let kinds = t.lines().iter().map(|l| l.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![LineKind::Prompt, LineKind::Input, LineKind::Output, LineKind::Meta]
        );
        assert_eq!(t.last().map(|l| l.text.as_str()), Some("Accepted · 0.01 s · 1024 KB"));
    }

    #[test]
    fn since_returns_tail() {
        let mut t = Transcript::new();
        t.notice("a");
        t.notice("b");
        assert_eq!(t.since(1).len(), 1);
        assert!(t.since(2).is_empty());
        assert!(t.since(10).is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let line = TranscriptLine {
            kind: LineKind::Notice,
            text: "x".into(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["kind"], "notice");
    }
}
