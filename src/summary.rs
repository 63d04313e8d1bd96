//! Collapses the 3-hourly forecast feed into one representative sample per
//! calendar day for the daily cards.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::owm::forecast::Sample;

/// Upper bound on rendered daily cards.
pub const MAX_DAYS: usize = 5;

/// A forecast timestamp that is not `"YYYY-MM-DD HH:MM:SS"` text. Carries the
/// offending value; the whole summarization fails rather than silently
/// shortening the card row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed forecast timestamp {0:?}")]
pub struct FormatError(pub String);

/// Splits a sample timestamp into its date and time-of-day parts.
pub fn split_timestamp(timestamp: &str) -> Result<(&str, &str), FormatError> {
    timestamp
        .split_once(' ')
        .ok_or_else(|| FormatError(timestamp.to_owned()))
}

/// Picks at most [`MAX_DAYS`] daily representatives from a 3-hourly forecast
/// list, in first-seen date order.
///
/// Per date the midday sample (time-of-day starting with hour "12") wins,
/// replacing any earlier pick; without one, the first sample seen for that
/// date is kept. If the first grouped date is `today` it is dropped, so the
/// cards only cover the days ahead.
pub fn daily_summaries(
    samples: &[Sample],
    today: NaiveDate,
) -> Result<Vec<&Sample>, FormatError> {
    let mut dates: Vec<&str> = Vec::new();
    let mut chosen: HashMap<&str, &Sample> = HashMap::new();

    for sample in samples {
        let (date, time) = split_timestamp(&sample.timestamp)?;
        if time.starts_with("12") {
            if chosen.insert(date, sample).is_none() {
                dates.push(date);
            }
        } else if !chosen.contains_key(date) {
            chosen.insert(date, sample);
            dates.push(date);
        }
    }

    let today = today.format("%Y-%m-%d").to_string();
    let skip = usize::from(dates.first().is_some_and(|d| *d == today));

    Ok(dates
        .into_iter()
        .skip(skip)
        .take(MAX_DAYS)
        .map(|date| chosen[date])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owm::{forecast::Sample, Condition, Main};

    fn sample(timestamp: &str, temp: f64) -> Sample {
        Sample {
            timestamp: timestamp.to_string(),
            main: Main {
                temp,
                ..Main::default()
            },
            weather: vec![Condition {
                description: "overcast clouds".to_string(),
                icon: "04d".to_string(),
            }],
        }
    }

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let out = daily_summaries(&[], date("2024-05-01")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn drops_leading_today() {
        let samples = vec![
            sample("2024-05-01 08:00:00", 10.0),
            sample("2024-05-01 12:00:00", 14.0),
            sample("2024-05-01 18:00:00", 11.0),
            sample("2024-05-02 03:00:00", 7.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, "2024-05-02 03:00:00");
    }

    #[test]
    fn keeps_all_days_when_today_absent() {
        let samples = vec![
            sample("2024-05-02 09:00:00", 10.0),
            sample("2024-05-03 09:00:00", 11.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn prefers_midday_sample() {
        let samples = vec![
            sample("2024-05-02 09:00:00", 8.0),
            sample("2024-05-02 12:00:00", 15.0),
            sample("2024-05-02 15:00:00", 13.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, "2024-05-02 12:00:00");
    }

    #[test]
    fn later_midday_replaces_earlier_pick() {
        let samples = vec![
            sample("2024-05-02 09:00:00", 8.0),
            sample("2024-05-02 12:00:00", 15.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out[0].timestamp, "2024-05-02 12:00:00");
    }

    #[test]
    fn falls_back_to_first_sample_without_midday() {
        let samples = vec![
            sample("2024-05-02 15:00:00", 13.0),
            sample("2024-05-02 18:00:00", 9.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out[0].timestamp, "2024-05-02 15:00:00");
    }

    #[test]
    fn caps_at_five_days_without_duplicates() {
        let mut samples = Vec::new();
        for day in 1..=8 {
            for hour in ["00", "09", "12", "21"] {
                samples.push(sample(&format!("2024-05-{day:02} {hour}:00:00"), 10.0));
            }
        }
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out.len(), MAX_DAYS);

        let mut seen_dates: Vec<&str> = out
            .iter()
            .map(|s| split_timestamp(&s.timestamp).unwrap().0)
            .collect();
        assert_eq!(
            seen_dates,
            vec![
                "2024-05-02",
                "2024-05-03",
                "2024-05-04",
                "2024-05-05",
                "2024-05-06"
            ]
        );
        seen_dates.dedup();
        assert_eq!(seen_dates.len(), MAX_DAYS);
        for picked in &out {
            assert!(picked.timestamp.contains(" 12:"));
        }
    }

    #[test]
    fn single_day_input_collapses_to_one_entry() {
        let samples = vec![
            sample("2024-05-02 00:00:00", 6.0),
            sample("2024-05-02 03:00:00", 5.0),
            sample("2024-05-02 06:00:00", 7.0),
        ];
        let out = daily_summaries(&samples, date("2024-05-01")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, "2024-05-02 00:00:00");
    }

    #[test]
    fn grouping_is_idempotent_on_its_own_output() {
        let samples = vec![
            sample("2024-05-02 09:00:00", 8.0),
            sample("2024-05-02 12:00:00", 15.0),
            sample("2024-05-03 12:00:00", 14.0),
            sample("2024-05-04 06:00:00", 9.0),
        ];
        let first: Vec<Sample> = daily_summaries(&samples, date("2024-05-01"))
            .unwrap()
            .into_iter()
            .cloned()
            .collect();
        let second = daily_summaries(&first, date("2024-05-01")).unwrap();
        let dates_a: Vec<&str> = first
            .iter()
            .map(|s| split_timestamp(&s.timestamp).unwrap().0)
            .collect();
        let dates_b: Vec<&str> = second
            .iter()
            .map(|s| split_timestamp(&s.timestamp).unwrap().0)
            .collect();
        assert_eq!(dates_a, dates_b);
    }

    #[test]
    fn malformed_timestamp_fails_the_operation() {
        let samples = vec![
            sample("2024-05-02 09:00:00", 8.0),
            sample("2024-05-02T12:00:00", 15.0),
        ];
        let err = daily_summaries(&samples, date("2024-05-01")).unwrap_err();
        assert_eq!(err, FormatError("2024-05-02T12:00:00".to_string()));
    }
}
