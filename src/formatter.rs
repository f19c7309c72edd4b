//! Markdown rendering of age-conditioned answers.
//!
//! Tables are fed to the answer-generation layer, so the layout is fixed
//! and every `|` inside a value is escaped to keep the two columns intact.
use crate::models::{AnswerEntry, MatchResult};

const TABLE_HEADER: &str = "| Idade    | Resposta Correspondente |";
const TABLE_ALIGNMENT: &str = "| :------- | :---------------------- |";
const NO_ANSWERS_ROW: &str = "| N/A      | Nenhuma resposta encontrada |";
const NO_RESULTS: &str = "Nenhum resultado encontrado.";

const LINE_BREAK: &str = "<br>";

/// Escape literal pipes so a value cannot open a new column, and turn line
/// breaks (Alt+Enter cells, quoted CSV fields) into `<br>` so a value
/// cannot open a new row.
#[must_use]
pub fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", LINE_BREAK)
        .replace(['\n', '\r'], LINE_BREAK)
}

/// Render answers as a two-column (age, answer) markdown table.
///
/// An empty list still yields the header plus a "no answers" row.
#[must_use]
pub fn format_answers(answers: &[AnswerEntry]) -> String {
    let mut lines = vec![TABLE_HEADER.to_string(), TABLE_ALIGNMENT.to_string()];

    if answers.is_empty() {
        lines.push(NO_ANSWERS_ROW.to_string());
    } else {
        lines.extend(answers.iter().map(|a| {
            format!(
                "| {} | {} |",
                escape_cell(&a.age_context),
                escape_cell(&a.answer)
            )
        }));
    }

    lines.join("\n")
}

/// Render ranked matches as the context block handed to the answer generator.
#[must_use]
pub fn render_matches(matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return NO_RESULTS.to_string();
    }

    matches
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            format!(
                "### Resultado {}: {} (Distância: {:.4})\n{}",
                idx + 1,
                m.question,
                m.distance,
                format_answers(&m.answers)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read a table produced by [`format_answers`] back into answers.
///
/// `<br>` is read back as a newline. The placeholder table of an empty answer list parses to an empty list.
#[must_use]
pub fn parse_table(table: &str) -> Vec<AnswerEntry> {
    let body: Vec<&str> = table.lines().skip(2).collect();
    if body == [NO_ANSWERS_ROW] {
        return Vec::new();
    }

    body.into_iter()
        .filter_map(|line| {
            let cells = split_row(line);
            match cells.as_slice() {
                [age, answer] => Some(AnswerEntry::new(age.clone(), answer.clone())),
                _ => None,
            }
        })
        .collect()
}

/// Split `| a | b |` on unescaped pipes, unescaping `\|` in each cell.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let inner = line
        .strip_prefix('|')
        .and_then(|l| l.strip_suffix('|'))
        .unwrap_or(line);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(unescape_cell(&std::mem::take(&mut current))),
            _ => current.push(c),
        }
    }
    cells.push(unescape_cell(&current));
    cells
}

fn unescape_cell(cell: &str) -> String {
    cell.trim().replace(LINE_BREAK, "\n")
}
