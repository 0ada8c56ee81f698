use crate::model::{InputGroup, Separator};

/// Joins `answers` (flat, in field order across all groups) into stdin.
///
/// Each group takes `fields.len()` consecutive answers joined by its
/// separator; groups are joined by `\n`. A short `answers` slice composes
/// the missing values as empty strings.
pub fn compose(groups: &[InputGroup], answers: &[String]) -> String {
    let mut cursor = 0;
    groups
        .iter()
        .map(|group| {
            let count = group.field_count();
            let line = (cursor..cursor + count)
                .map(|i| answers.get(i).map_or("", String::as_str))
                .collect::<Vec<_>>()
                .join(group.separator.as_str());
            cursor += count;
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn split(groups: &[InputGroup], stdin: &str) -> Vec<String> {
    let mut lines = stdin.split('\n');
    let mut answers = Vec::new();

    for group in groups {
        let count = group.field_count();
        match group.separator {
            Separator::Newline => {
                for _ in 0..count {
                    answers.push(lines.next().unwrap_or_default().to_string());
                }
            }
            Separator::Space => {
                let line = lines.next().unwrap_or_default();
                let mut values = line.splitn(count.max(1), ' ').map(str::to_string).collect::<Vec<_>>();
                values.resize(count, String::new());
                answers.extend(values);
            }
        }
    }
    answers
}
