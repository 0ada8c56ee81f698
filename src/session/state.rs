use crate::composer;
use crate::model::{Field, FieldType, InputGroup};

/// Values collected so far for one run, owned by the [`Controller`](super::Controller).
///
/// `answers` is flat: the answer for field `f` of group `g` lives at
/// `offset(g) + f`.
#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    language_id: u32,
    groups: Vec<InputGroup>,
    current: usize,
    answers: Vec<String>,
    /// Answers already given for the current group.
    filled: usize,
}

/// What one submitted line did to the current group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub group_complete: bool,
    /// Tokens past the end of the group that were thrown away.
    pub dropped: usize,
    /// First value that does not look like its field's type. It is still
    /// sent as typed.
    pub mismatch: Option<(String, FieldType)>,
}

impl Session {
    pub fn new(source: impl Into<String>, language_id: u32, groups: Vec<InputGroup>) -> Self {
        let capacity = groups.iter().map(InputGroup::field_count).sum();
        Self {
            source: source.into(),
            language_id,
            groups,
            current: 0,
            answers: Vec::with_capacity(capacity),
            filled: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language_id(&self) -> u32 {
        self.language_id
    }

    pub fn groups(&self) -> &[InputGroup] {
        &self.groups
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_group(&self) -> Option<&InputGroup> {
        self.groups.get(self.current)
    }

    /// Index of the first answer belonging to group `index`.
    pub fn offset(&self, index: usize) -> usize {
        self.groups[..index.min(self.groups.len())]
            .iter()
            .map(InputGroup::field_count)
            .sum()
    }

    /// The next field of the current group still waiting for a value.
    pub fn pending_field(&self) -> Option<&Field> {
        self.current_group()?.fields.get(self.filled)
    }

    /// Fields of the current group still waiting, as a hint string.
    pub fn placeholder(&self) -> Option<String> {
        let group = self.current_group()?;
        if group.whole_line {
            return group.fields.first().map(|f| f.kind.placeholder().to_string());
        }
        let named = !group.vars.is_empty() && group.vars.len() == group.fields.len();
        let remaining = (self.filled..group.fields.len())
            .map(|i| match named {
                true => group.vars[i].clone(),
                false => group.fields[i].kind.placeholder().to_string(),
            })
            .collect::<Vec<_>>();
        (!remaining.is_empty()).then(|| remaining.join(" "))
    }

    /// Feeds one submitted line to the current group.
    ///
    /// A whole-line group takes the line as its single answer. A token group
    /// takes whitespace-separated tokens until its fields are full; a line
    /// with fewer tokens leaves the group open for the next line.
    pub fn accept(&mut self, line: &str) -> Accepted {
        let Some(group) = self.groups.get(self.current) else {
            return Accepted {
                group_complete: false,
                dropped: 0,
                mismatch: None,
            };
        };
        let count = group.field_count();
        let mut dropped = 0;
        let mut mismatch = None;
        let literals = group.format_literals().unwrap_or_default();
        let mut check = |value: &str, field: Option<&Field>| {
            let value = value.trim_matches(|c| literals.contains(c));
            if let Some(field) = field {
                if mismatch.is_none() && !field.kind.accepts(value) {
                    mismatch = Some((value.to_string(), field.kind));
                }
            }
        };

        if group.whole_line {
            check(line.trim(), group.fields.first());
            self.answers.push(line.to_string());
            self.filled += 1;
        } else {
            for token in line.split_whitespace() {
                if self.filled < count {
                    check(token, group.fields.get(self.filled));
                    self.answers.push(token.to_string());
                    self.filled += 1;
                } else {
                    dropped += 1;
                }
            }
        }

        Accepted {
            group_complete: self.filled >= count,
            dropped,
            mismatch,
        }
    }

    /// Moves to the next group; false when the current one was the last.
    pub fn advance(&mut self) -> bool {
        self.filled = 0;
        self.current += 1;
        self.current < self.groups.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.groups.len()
    }

    pub fn compose(&self) -> String {
        composer::compose(&self.groups, &self.answers)
    }

    /// Prompts shown during collection, in group order.
    pub fn prompts(&self) -> Vec<String> {
        self.groups.iter().filter_map(|g| g.prompt.clone()).collect()
    }
}
