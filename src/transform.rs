use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::record::MatchRecord;

pub const DEFAULT_WINDOW: usize = 5;

/// Rolling xG / xGA for every played match, in date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedSeries {
    pub positions: Vec<usize>,
    pub dates: Vec<NaiveDate>,
    pub xg_for: Vec<f64>,
    pub xg_against: Vec<f64>,
}

impl ProcessedSeries {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Keeps every record before the first one without a result.
///
/// The scan stops at the first gap even if later rows were played.
pub fn trim_to_played(records: &[MatchRecord]) -> &[MatchRecord] {
    let end = records
        .iter()
        .position(|r| !r.is_played())
        .unwrap_or(records.len());
    &records[..end]
}

/// Stable ascending sort by `Datum`. Any unparseable date rejects the batch.
pub fn sort_chronologically(records: &[MatchRecord]) -> Result<Vec<MatchRecord>, PipelineError> {
    Ok(sort_with_dates(records)?
        .into_iter()
        .map(|(_, rec)| rec.clone())
        .collect())
}

fn sort_with_dates(
    records: &[MatchRecord],
) -> Result<Vec<(NaiveDate, &MatchRecord)>, PipelineError> {
    let mut keyed = records
        .iter()
        .enumerate()
        .map(|(idx, rec)| rec.parsed_date(idx).map(|date| (date, rec)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by_key(|(date, _)| *date);
    Ok(keyed)
}

/// Trailing mean over up to `window` values ending at each position.
///
/// Missing values are skipped and shrink the denominator. A window holding no
/// value at all yields `NaN`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|end| {
            let start = (end + 1).saturating_sub(window);
            let (sum, count) = values[start..=end]
                .iter()
                .flatten()
                .fold((0.0_f64, 0usize), |(sum, count), v| (sum + *v, count + 1));
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect()
}

pub fn positions(len: usize) -> Vec<usize> {
    (1..=len).collect()
}

/// Trim, sort, then roll. Trimming runs on fetch order, before the sort.
pub fn process(records: &[MatchRecord], window: usize) -> Result<ProcessedSeries, PipelineError> {
    let played = trim_to_played(records);
    let sorted = sort_with_dates(played)?;

    let dates = sorted.iter().map(|(date, _)| *date).collect::<Vec<_>>();
    let xg = sorted.iter().map(|(_, r)| r.xg).collect::<Vec<_>>();
    let xga = sorted.iter().map(|(_, r)| r.xga).collect::<Vec<_>>();

    Ok(ProcessedSeries {
        positions: positions(sorted.len()),
        dates,
        xg_for: rolling_mean(&xg, window),
        xg_against: rolling_mean(&xga, window),
    })
}
