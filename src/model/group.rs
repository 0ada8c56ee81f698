use super::{Field, Language};
use serde::{Deserialize, Serialize};

/// How the fields of one group are joined on the composed stdin.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    Space,
    Newline,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Newline => "\n",
        }
    }
}

/// One detected blocking-read call site.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputGroup {
    pub id: String,
    pub lang: Language,
    pub raw_call: String,
    pub spec: String,
    pub vars: Vec<String>,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub separator: Separator,
    /// The call consumes a whole line, so a submitted line is one answer.
    #[serde(default)]
    pub whole_line: bool,
    pub offset: usize,
}

impl InputGroup {
    /// Starts a group with no fields; `id` is assigned once detection has
    /// ordered every group of the pass.
    pub fn new(lang: Language, offset: usize, raw_call: &str, spec: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            lang,
            raw_call: raw_call.to_string(),
            spec: spec.into(),
            vars: Vec::new(),
            fields: Vec::new(),
            prompt: None,
            separator: Separator::Space,
            whole_line: false,
            offset,
        }
    }

    pub fn line(mut self, field: Field) -> Self {
        self.fields = vec![field];
        self.separator = Separator::Newline;
        self.whole_line = true;
        self
    }

    pub fn single(mut self, field: Field) -> Self {
        self.fields = vec![field];
        self.separator = Separator::Newline;
        self
    }

    pub fn tokens(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self.separator = Separator::Space;
        self
    }

    pub fn with_vars(mut self, vars: Vec<String>) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Non-whitespace text a scanf format expects between its conversions,
    /// e.g. `,` for `%d,%d`. `None` for other calls.
    pub fn format_literals(&self) -> Option<String> {
        if !self.spec.contains('%') {
            return None;
        }
        let mut literals = String::new();
        let mut chars = self.spec.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                if !c.is_whitespace() {
                    literals.push(c);
                }
                continue;
            }
            if chars.next_if_eq(&'%').is_some() {
                literals.push('%');
                continue;
            }
            while chars.next_if(|c| *c == '*' || c.is_ascii_digit() || "hlLjztq".contains(*c)).is_some() {}
            if chars.next() == Some('[') {
                chars.next_if(|c| *c == '^');
                chars.next_if_eq(&']');
                while chars.next().is_some_and(|c| c != ']') {}
            }
        }
        (!literals.is_empty()).then_some(literals)
    }

    /// Label shown next to the input line: the variable names if known,
    /// otherwise the type placeholders.
    pub fn label(&self) -> String {
        if !self.vars.is_empty() && self.vars.len() == self.fields.len() {
            return self.vars.join(" ");
        }
        self.fields
            .iter()
            .map(|f| f.kind.placeholder())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
