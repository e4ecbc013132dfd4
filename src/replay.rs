//! Synthetic clock for `check`: a start instant, an end instant and a step.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

impl ReplayWindow {
    /// `from` is RFC 3339. `to` is RFC 3339 or `T+<duration>` counted from
    /// `from`. `step` is a humantime duration such as `1s` or `500ms`.
    pub fn parse(from: &str, to: &str, step: &str) -> Result<Self, String> {
        let start = parse_instant(from)?;
        let end = match to.trim().strip_prefix("T+") {
            Some(offset) => start + parse_span(offset)?,
            None => parse_instant(to)?,
        };
        let step = parse_span(step)?;

        if step.is_zero() {
            return Err("step must be positive".into());
        }
        if end < start {
            return Err(format!("end {} is before start {}", end, start));
        }
        Ok(Self { start, end, step })
    }

    /// Every evaluation instant from `start` up to and including `end`.
    pub fn instants(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        std::iter::successors(Some(self.start), |t| Some(*t + self.step))
            .take_while(|t| *t <= self.end)
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("`{}`: {}", s, e))
}

fn parse_span(s: &str) -> Result<Duration, String> {
    let span = humantime::parse_duration(s.trim()).map_err(|e| format!("`{}`: {}", s, e))?;
    Duration::from_std(span).map_err(|e| format!("`{}`: {}", s, e))
}
