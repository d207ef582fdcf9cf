//! The rotating display slots and the mapping from summary views to the
//! renderer inputs for each of them.

use anyhow::Result;
use enum_map::Enum;

use crate::aggregate::{CategoryCount, SummaryViews};
use crate::config::AggregationConfig;
use crate::model::{Band, ModeClass};
use crate::render::{ArtifactRenderer, DisplaySize, NamedSeries};

/// Display slots in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum SlotId {
    Logo,
    QsoSummary,
    OperatorRates,
    OperatorsPie,
    OperatorsTable,
    StationsPie,
    BandsPie,
    ModesPie,
    RateChart,
    Sections,
}

impl SlotId {
    pub const COUNT: usize = 10;

    pub const ALL: [SlotId; Self::COUNT] = [
        SlotId::Logo,
        SlotId::QsoSummary,
        SlotId::OperatorRates,
        SlotId::OperatorsPie,
        SlotId::OperatorsTable,
        SlotId::StationsPie,
        SlotId::BandsPie,
        SlotId::ModesPie,
        SlotId::RateChart,
        SlotId::Sections,
    ];

    pub fn index(self) -> usize {
        self.into_usize()
    }

    /// Wraps indexes past the end back to the start.
    pub fn from_index(index: usize) -> SlotId {
        Self::ALL[index % Self::COUNT]
    }

    pub fn title(self) -> &'static str {
        match self {
            SlotId::Logo => "Logo",
            SlotId::QsoSummary => "QSOs Summary",
            SlotId::OperatorRates => "QSO/Hour Rates",
            SlotId::OperatorsPie => "QSOs by Operator",
            SlotId::OperatorsTable => "Top Operators",
            SlotId::StationsPie => "QSOs by Station",
            SlotId::BandsPie => "QSOs by Band",
            SlotId::ModesPie => "QSOs by Mode",
            SlotId::RateChart => "QSOs per Hour by Band",
            SlotId::Sections => "QSOs by Section",
        }
    }
}

/// Content of the logo slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCard {
    pub title: String,
    pub lines: Vec<String>,
}

/// Band rows by CW / Phone / Data / Total, closed by a Total row.
pub fn summary_cells(views: &SummaryViews) -> Vec<Vec<String>> {
    let table = &views.band_modes;
    let mut header = vec![String::new()];
    header.extend(ModeClass::ALL.iter().map(|mode| mode.label().to_string()));
    header.push("Total".to_string());

    let mut cells = vec![header];
    for band in Band::ALL {
        let mut row = vec![band.label().to_string()];
        row.extend(ModeClass::ALL.iter().map(|mode| table.get(band, *mode).to_string()));
        row.push(table.band_total(band).to_string());
        cells.push(row);
    }
    let mut total = vec!["Total".to_string()];
    total.extend(ModeClass::ALL.iter().map(|mode| table.mode_total(*mode).to_string()));
    total.push(table.total().to_string());
    cells.push(total);
    cells
}

pub fn rate_cells(views: &SummaryViews) -> Vec<Vec<String>> {
    let rates = &views.operator_rates;
    let mut cells = vec![vec!["Operator".to_string(), "Rate".to_string()]];
    for row in &rates.rows {
        cells.push(vec![row.operator.clone(), format!("{:.0}", row.rate)]);
    }
    cells.push(vec!["Total".to_string(), format!("{:.0}", rates.total)]);
    cells
}

pub fn top_operator_cells(views: &SummaryViews, limit: usize) -> Vec<Vec<String>> {
    count_cells("Operator", views.operators.iter().take(limit))
}

pub fn section_cells(views: &SummaryViews) -> Vec<Vec<String>> {
    count_cells("Section", views.sections.iter())
}

fn count_cells<'a>(
    heading: &str,
    counts: impl Iterator<Item = &'a CategoryCount>,
) -> Vec<Vec<String>> {
    let mut cells = vec![vec![heading.to_string(), "QSOs".to_string()]];
    cells.extend(counts.map(|c| vec![c.key.clone(), c.count.to_string()]));
    cells
}

/// Labels and values for a pie, in the order given.
pub fn pie_inputs(counts: &[CategoryCount]) -> (Vec<String>, Vec<u64>) {
    counts.iter().map(|c| (c.key.clone(), c.count)).unzip()
}

/// Bands with contacts, largest first.
pub fn band_pie_inputs(views: &SummaryViews) -> (Vec<String>, Vec<u64>) {
    let mut totals: Vec<(&str, u64)> = Band::ALL
        .iter()
        .map(|band| (band.label(), views.band_modes.band_total(*band)))
        .filter(|(_, count)| *count > 0)
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.into_iter().map(|(l, c)| (l.to_string(), c)).unzip()
}

/// Mode classes with contacts, largest first.
pub fn mode_pie_inputs(views: &SummaryViews) -> (Vec<String>, Vec<u64>) {
    let mut totals: Vec<(&str, u64)> = ModeClass::ALL
        .iter()
        .map(|mode| (mode.label(), views.band_modes.mode_total(*mode)))
        .filter(|(_, count)| *count > 0)
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.into_iter().map(|(l, c)| (l.to_string(), c)).unzip()
}

/// One series per band that has any contacts, each with a point per bucket.
pub fn rate_series(views: &SummaryViews) -> Vec<NamedSeries> {
    Band::ALL
        .iter()
        .filter(|band| views.band_series.iter().any(|b| b.rates[**band] > 0.0))
        .map(|band| NamedSeries {
            name: band.label().to_string(),
            points: views
                .band_series
                .iter()
                .map(|bucket| (bucket.start, bucket.rates[*band]))
                .collect(),
        })
        .collect()
}

pub fn top_operators_title(limit: usize) -> String {
    format!("Top {limit} Operators")
}

/// Renders one slot from the views of the last pass.
pub fn render_slot<R: ArtifactRenderer + ?Sized>(
    renderer: &R,
    views: &SummaryViews,
    slot: SlotId,
    card: &TitleCard,
    settings: &AggregationConfig,
    size: DisplaySize,
) -> Result<R::Artifact> {
    let title = slot.title();
    match slot {
        SlotId::Logo => renderer.render_title_card(&card.title, &card.lines, size),
        SlotId::QsoSummary => renderer.render_table(&summary_cells(views), title, size),
        SlotId::OperatorRates => renderer.render_table(&rate_cells(views), title, size),
        SlotId::OperatorsPie => {
            let (labels, values) = pie_inputs(&views.operators);
            renderer.render_pie_chart(&labels, &values, title, size)
        }
        SlotId::OperatorsTable => {
            let title = top_operators_title(settings.top_operators);
            let cells = top_operator_cells(views, settings.top_operators);
            renderer.render_table(&cells, &title, size)
        }
        SlotId::StationsPie => {
            let (labels, values) = pie_inputs(&views.stations);
            renderer.render_pie_chart(&labels, &values, title, size)
        }
        SlotId::BandsPie => {
            let (labels, values) = band_pie_inputs(views);
            renderer.render_pie_chart(&labels, &values, title, size)
        }
        SlotId::ModesPie => {
            let (labels, values) = mode_pie_inputs(views);
            renderer.render_pie_chart(&labels, &values, title, size)
        }
        SlotId::RateChart => renderer.render_stacked_time_series(&rate_series(views), title, size),
        SlotId::Sections => renderer.render_table(&section_cells(views), title, size),
    }
}
