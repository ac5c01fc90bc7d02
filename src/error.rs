use std::fmt;

use thiserror::Error;

/// Pipeline stage a record-level error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Sort,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Decode => "decode",
            Stage::Sort => "sort",
        };
        f.write_str(label)
    }
}

/// Record-level failures of the cleaning pipeline.
///
/// `index` is always the zero-based position of the record in fetch order.
/// Trimming only ever drops a suffix, so the index stays meaningful after it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("{stage}: record {index} is missing field `{field}`")]
    MissingField {
        stage: Stage,
        index: usize,
        field: &'static str,
    },

    #[error("{stage}: record {index} has date {value:?}, expected DD.MM.YYYY")]
    DateParse {
        stage: Stage,
        index: usize,
        value: String,
    },

    #[error("{stage}: record {index} field `{field}` holds unexpected value {value}")]
    InvalidValue {
        stage: Stage,
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("{stage}: record {index} is not a JSON object")]
    NotAnObject { stage: Stage, index: usize },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::MissingField { stage, .. }
            | PipelineError::DateParse { stage, .. }
            | PipelineError::InvalidValue { stage, .. }
            | PipelineError::NotAnObject { stage, .. } => *stage,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            PipelineError::MissingField { index, .. }
            | PipelineError::DateParse { index, .. }
            | PipelineError::InvalidValue { index, .. }
            | PipelineError::NotAnObject { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage_and_record() {
        let err = PipelineError::DateParse {
            stage: Stage::Sort,
            index: 3,
            value: "2023-08-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sort: record 3 has date \"2023-08-01\", expected DD.MM.YYYY"
        );
        assert_eq!(err.stage(), Stage::Sort);
        assert_eq!(err.index(), 3);
    }

    #[test]
    fn stages_are_decode_and_sort() {
        let labels = [Stage::Decode, Stage::Sort].map(|stage| stage.to_string());
        assert_eq!(labels, ["decode", "sort"]);
    }
}
