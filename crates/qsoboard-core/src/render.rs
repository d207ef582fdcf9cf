//! Boundary between aggregation and presentation.
//!
//! The aggregator hands plain cells and numbers to an [`ArtifactRenderer`] and
//! stores whatever artifact comes back; it never looks inside one.

use anyhow::Result;

use crate::model::Timestamp;

/// Target area for one artifact, in display cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySize {
    pub width: u16,
    pub height: u16,
}

impl DisplaySize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One stacked series of the rate chart: a band and its value per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    /// `(bucket start, contacts per hour)`, ascending by time.
    pub points: Vec<(Timestamp, f64)>,
}

pub trait ArtifactRenderer {
    type Artifact: Send + Sync + 'static;

    /// Logo / title card: a title and a few centered lines.
    fn render_title_card(
        &self,
        title: &str,
        lines: &[String],
        size: DisplaySize,
    ) -> Result<Self::Artifact>;

    /// `cells[0]` is the header row.
    fn render_table(
        &self,
        cells: &[Vec<String>],
        title: &str,
        size: DisplaySize,
    ) -> Result<Self::Artifact>;

    fn render_pie_chart(
        &self,
        labels: &[String],
        values: &[u64],
        title: &str,
        size: DisplaySize,
    ) -> Result<Self::Artifact>;

    /// Series are stacked in the order given.
    fn render_stacked_time_series(
        &self,
        series: &[NamedSeries],
        title: &str,
        size: DisplaySize,
    ) -> Result<Self::Artifact>;
}
