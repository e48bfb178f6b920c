//! Scoring and reporting for a completed sweep: per-code error against the
//! ideal linear response, a summary table, and an optional response plot.

use crate::scenario::SweepOutcome;
use crate::sim_if::SIM_IF;
use prettytable::{Cell, Row, Table};

#[derive(Debug, Default)]
pub struct SweepRecord {
    entries: Vec<(u32, SweepOutcome)>,
}

impl SweepRecord {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, expected: u32, outcome: SweepOutcome) {
        self.entries.push((expected, outcome));
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn entries(&self) -> &[(u32, SweepOutcome)] {
        &self.entries
    }
    pub fn timeouts(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_timeout()).count()
    }
    /// Signed error per entry, `observed - expected`, with timed-out entries
    /// scored as a zero reading.
    pub fn errors(&self) -> Vec<i64> {
        self.entries
            .iter()
            .map(|(expected, outcome)| outcome.observed_or_zero() as i64 - *expected as i64)
            .collect()
    }
}

/// Log the raw vectors, print a summary table and render the optional plot.
/// Never fails: reporting has no influence on the run result.
pub fn emit(record: &SweepRecord) {
    let expecteds: Vec<u32> = record.entries().iter().map(|(e, _)| *e).collect();
    let results: Vec<Option<u32>> = record
        .entries()
        .iter()
        .map(|(_, o)| match o {
            SweepOutcome::Observed(v) => Some(*v),
            SweepOutcome::TimedOut => None,
        })
        .collect();
    let errors = record.errors();

    SIM_IF.log(&format!("expecteds={:?}", expecteds));
    SIM_IF.log(&format!("results={:?}", results));
    SIM_IF.log(&format!("errors={:?}", errors));

    let observed = record.len() - record.timeouts();
    let max_abs_err = errors.iter().map(|e| e.abs()).max().unwrap_or(0);
    let mean_err = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<i64>() as f64 / errors.len() as f64
    };

    let mut table = Table::new();
    table.set_titles(Row::new(vec![
        Cell::new("Points"),
        Cell::new("Observed"),
        Cell::new("Timed out"),
        Cell::new("Max |err|"),
        Cell::new("Mean err"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new(&record.len().to_string()),
        Cell::new(&observed.to_string()),
        Cell::new(&record.timeouts().to_string()),
        Cell::new(&max_abs_err.to_string()),
        Cell::new(&format!("{:.3}", mean_err)),
    ]));
    table.printstd();

    render_plot(record);
}

#[cfg(feature = "plot")]
fn render_plot(record: &SweepRecord) {
    if let Err(e) = try_render(record, "linearity.png") {
        SIM_IF.log(&format!("Plot skipped: {}", e));
    }
}

#[cfg(not(feature = "plot"))]
fn render_plot(_record: &SweepRecord) {}

#[cfg(feature = "plot")]
fn try_render(record: &SweepRecord, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(300);

    let mut response = ChartBuilder::on(&upper)
        .margin(10)
        .build_cartesian_2d(0u32..256u32, 0u32..256u32)?;
    response.draw_series(LineSeries::new(
        record
            .entries()
            .iter()
            .map(|(e, o)| (*e, o.observed_or_zero())),
        &BLUE,
    ))?;

    let errors = record.errors();
    let lo = errors.iter().min().copied().unwrap_or(0).min(-1);
    let hi = errors.iter().max().copied().unwrap_or(0).max(1);
    let mut error_chart = ChartBuilder::on(&lower)
        .margin(10)
        .build_cartesian_2d(0u32..256u32, lo..hi)?;
    error_chart.draw_series(LineSeries::new(
        record
            .entries()
            .iter()
            .zip(errors.iter())
            .map(|((e, _), err)| (*e, *err)),
        &RED,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SweepOutcome;

    #[test]
    fn errors_substitute_zero_for_timeouts() {
        let mut record = SweepRecord::new();
        record.push(0, SweepOutcome::Observed(0));
        record.push(1, SweepOutcome::Observed(3));
        record.push(2, SweepOutcome::TimedOut);
        assert_eq!(record.errors(), vec![0, 2, -2]);
        assert_eq!(record.timeouts(), 1);
    }

    #[test]
    fn record_preserves_insertion_order() {
        let mut record = SweepRecord::new();
        for code in 0..256u32 {
            record.push(code, SweepOutcome::Observed(code));
        }
        assert_eq!(record.len(), 256);
        for (i, (expected, _)) in record.entries().iter().enumerate() {
            assert_eq!(*expected, i as u32);
        }
        assert!(record.errors().iter().all(|e| *e == 0));
    }
}
