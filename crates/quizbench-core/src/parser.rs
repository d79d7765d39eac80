//! Line-delimited JSON question-bank parser.
//!
//! Records are decoded lazily, one line at a time, so a malformed line stops
//! an evaluation before any later record reaches the service.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::EvalError;
use crate::model::QuestionRecord;

/// Key holding the expected answer.
pub const ANSWER_FIELD: &str = "^";
/// Key holding the question text.
pub const QUESTION_FIELD: &str = "#Q";
/// Keys holding the answer choices, in presentation order.
pub const CHOICE_FIELDS: [&str; 4] = ["A", "B", "C", "D"];

/// Decode one question-bank line.
///
/// The line is trimmed first; the trimmed text is what gets stored in
/// [`QuestionRecord::raw`] and later sent to the service.
pub fn parse_record(line: usize, text: &str) -> Result<QuestionRecord, EvalError> {
    let raw = text.trim();
    let value: Value =
        serde_json::from_str(raw).map_err(|source| EvalError::InvalidJson { line, source })?;

    let Value::Object(fields) = value else {
        return Err(EvalError::NotAnObject { line });
    };

    let expected_answer = match fields.get(ANSWER_FIELD) {
        Some(Value::String(answer)) => answer.clone(),
        Some(_) => return Err(EvalError::NonStringAnswer { line }),
        None => return Err(EvalError::MissingAnswer { line }),
    };

    let question = fields
        .get(QUESTION_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned);

    let choices = CHOICE_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
        .collect();

    Ok(QuestionRecord {
        line,
        raw: raw.to_owned(),
        expected_answer,
        question,
        choices,
    })
}

/// Lazy iterator over the records of a question bank.
///
/// Every line is a record, blank ones included. Iteration ends after the
/// first error.
pub struct QuestionBank {
    reader: Box<dyn BufRead + Send>,
    source: PathBuf,
    line: usize,
    buf: String,
    done: bool,
}

impl QuestionBank {
    /// Open a question bank file.
    pub fn open(path: &Path) -> Result<Self, EvalError> {
        let file = File::open(path).map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_source(
            Box::new(BufReader::new(file)),
            path.to_path_buf(),
        ))
    }

    /// Read a question bank from any buffered reader.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self::with_source(Box::new(reader), PathBuf::from("<reader>"))
    }

    fn with_source(reader: Box<dyn BufRead + Send>, source: PathBuf) -> Self {
        Self {
            reader,
            source,
            line: 0,
            buf: String::new(),
            done: false,
        }
    }
}

impl Iterator for QuestionBank {
    type Item = Result<QuestionRecord, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line += 1;
                let result = parse_record(self.line, &self.buf);
                self.done = result.is_err();
                Some(result)
            }
            Err(source) => {
                self.done = true;
                Some(Err(EvalError::Io {
                    path: self.source.clone(),
                    source,
                }))
            }
        }
    }
}

/// Counts gathered by [`validate_question_bank`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub path: PathBuf,
    pub records: usize,
    pub with_question: usize,
    pub with_choices: usize,
}

/// Decode every record of a question bank without contacting the service.
pub fn validate_question_bank(path: &Path) -> Result<BankSummary, EvalError> {
    let mut summary = BankSummary {
        path: path.to_path_buf(),
        records: 0,
        with_question: 0,
        with_choices: 0,
    };

    for record in QuestionBank::open(path)? {
        let record = record?;
        summary.records += 1;
        if record.question.is_some() {
            summary.with_question += 1;
        }
        if !record.choices.is_empty() {
            summary.with_choices += 1;
        }
    }

    tracing::debug!(
        path = %path.display(),
        records = summary.records,
        "validated question bank"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn bank(text: &str) -> QuestionBank {
        QuestionBank::from_reader(Cursor::new(text.to_owned()))
    }

    #[test]
    fn parse_keeps_trimmed_raw_text() {
        let record = parse_record(1, "  {\"^\": \"4\", \"#Q\": \"2+2?\"}\n").unwrap();
        assert_eq!(record.raw, "{\"^\": \"4\", \"#Q\": \"2+2?\"}");
        assert_eq!(record.expected_answer, "4");
        assert_eq!(record.question.as_deref(), Some("2+2?"));
        assert_eq!(record.line, 1);
    }

    #[test]
    fn parse_collects_choices_in_order() {
        let record = parse_record(
            3,
            r##"{"#Q": "Capital of France?", "D": "Rome", "A": "Paris", "B": "Lyon", "^": "Paris"}"##,
        )
        .unwrap();
        assert_eq!(record.choices, vec!["Paris", "Lyon", "Rome"]);
    }

    #[test]
    fn parse_missing_answer() {
        let err = parse_record(2, r##"{"#Q": "no answer"}"##).unwrap_err();
        assert!(matches!(err, EvalError::MissingAnswer { line: 2 }));
    }

    #[test]
    fn parse_non_string_answer() {
        let err = parse_record(4, r#"{"^": 4}"#).unwrap_err();
        assert!(matches!(err, EvalError::NonStringAnswer { line: 4 }));
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_record(5, "{\"^\": ").unwrap_err();
        assert!(matches!(err, EvalError::InvalidJson { line: 5, .. }));
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = parse_record(1, r#"["^", "4"]"#).unwrap_err();
        assert!(matches!(err, EvalError::NotAnObject { line: 1 }));
    }

    #[test]
    fn bank_yields_records_in_order() {
        let records: Vec<_> = bank("{\"^\": \"4\"}\n{\"^\": \"5\"}\n")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].expected_answer, "4");
        assert_eq!(records[1].expected_answer, "5");
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn bank_rejects_blank_line() {
        let mut it = bank("{\"^\": \"a\"}\n\n{\"^\": \"b\"}\n");
        assert!(it.next().unwrap().is_ok());
        assert!(matches!(
            it.next().unwrap(),
            Err(EvalError::InvalidJson { line: 2, .. })
        ));
        assert!(it.next().is_none());
    }

    #[test]
    fn bank_rejects_whitespace_only_line() {
        let err = bank("   \t\n{\"^\": \"a\"}\n").next().unwrap().unwrap_err();
        assert!(matches!(err, EvalError::InvalidJson { line: 1, .. }));
    }

    #[test]
    fn bank_without_trailing_newline() {
        let records: Vec<_> = bank("{\"^\": \"a\"}\n{\"^\": \"b\"}")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn bank_stops_after_first_error() {
        let mut it = bank("{\"^\": \"a\"}\n{\"nope\": 1}\n{\"^\": \"c\"}\n");
        assert!(it.next().unwrap().is_ok());
        assert!(matches!(
            it.next().unwrap(),
            Err(EvalError::MissingAnswer { line: 2 })
        ));
        assert!(it.next().is_none());
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = QuestionBank::open(&dir.path().join("missing.json")).err().unwrap();
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn validate_counts_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"{{"#Q": "2+2?", "A": "3", "B": "4", "^": "4"}}"##
        )
        .unwrap();
        writeln!(file, r#"{{"^": "yes"}}"#).unwrap();

        let summary = validate_question_bank(file.path()).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.with_question, 1);
        assert_eq!(summary.with_choices, 1);
    }
}
