//! Groups loader rows into unique questions with ordered answers.
use std::collections::HashMap;

use tracing::debug;

use crate::models::{AnswerEntry, FaqRecord, SourceRow, is_missing_question};

/// Ordered question → answers accumulator.
#[derive(Default)]
struct Grouping {
    records: Vec<FaqRecord>,
    positions: HashMap<String, usize>,
}

impl Grouping {
    fn push<I>(&mut self, question: &str, answers: I)
    where
        I: IntoIterator<Item = AnswerEntry>,
    {
        let question = question.trim();
        if is_missing_question(question) {
            return;
        }

        let pos = match self.positions.get(question) {
            Some(&pos) => pos,
            None => {
                self.positions.insert(question.to_string(), self.records.len());
                self.records.push(FaqRecord {
                    question: question.to_string(),
                    answers: Vec::new(),
                });
                self.records.len() - 1
            }
        };
        self.records[pos].answers.extend(answers);
    }

    fn finish(mut self) -> Vec<FaqRecord> {
        self.records.retain(|r| !r.answers.is_empty());
        debug!("Grouped into {} unique questions", self.records.len());
        self.records
    }
}

/// Collapse rows sharing the same trimmed question into one [`FaqRecord`].
///
/// Records come out in first-seen order and each record's answers keep
/// row order, so identical input always yields identical output. Keys are
/// compared by exact string equality after trimming.
pub fn group_rows<I>(rows: I) -> Vec<FaqRecord>
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut grouping = Grouping::default();
    for row in rows {
        grouping.push(&row.question, [AnswerEntry::new(row.age_context, row.answer)]);
    }
    grouping.finish()
}

/// Normalize caller-supplied records to one record per trimmed question.
///
/// Same rules as [`group_rows`]: duplicates are merged into the first
/// occurrence (answers concatenated in order), blank or `nan` questions and
/// records left without answers are dropped.
pub fn merge_records<I>(records: I) -> Vec<FaqRecord>
where
    I: IntoIterator<Item = FaqRecord>,
{
    let mut grouping = Grouping::default();
    for record in records {
        grouping.push(&record.question, record.answers);
    }
    grouping.finish()
}
