//! Headless summary: one aggregation pass printed as plain tables.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use qsoboard_core::aggregate::SummaryViews;
use qsoboard_core::config::Config;
use qsoboard_core::logging;
use qsoboard_core::model::EventRecord;
use qsoboard_core::slots::{
    SlotId, band_pie_inputs, mode_pie_inputs, pie_inputs, rate_cells, section_cells,
    summary_cells, top_operator_cells, top_operators_title,
};
use qsoboard_core::store::{EventStore, SqliteEventStore};

pub fn run(config: &Config) -> Result<()> {
    logging::init_stderr_logging(&config.logging)?;

    let store = SqliteEventStore::open(&config.database);
    let latest = store
        .latest_event()
        .with_context(|| format!("read contact log {}", config.database.display()))?;
    let Some(latest) = latest else {
        println!("{}: no QSOs logged yet.", config.event_name);
        return Ok(());
    };

    let modes = config.mode_table()?;
    let views = SummaryViews::compute(&store, &config.aggregation, &modes, latest.timestamp)
        .context("aggregate contacts")?;
    println!("{}", render_report(config, &latest, &views, Utc::now()));
    Ok(())
}

fn table(cells: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((header, rows)) = cells.split_first() {
        table.set_header(header);
        for row in rows {
            table.add_row(row);
        }
    }
    table.to_string()
}

fn count_cells(heading: &str, (labels, values): (Vec<String>, Vec<u64>)) -> Vec<Vec<String>> {
    let mut cells = vec![vec![heading.to_string(), "QSOs".to_string()]];
    cells.extend(
        labels
            .into_iter()
            .zip(values)
            .map(|(label, value)| vec![label, value.to_string()]),
    );
    cells
}

fn render_report(
    config: &Config,
    latest: &EventRecord,
    views: &SummaryViews,
    now: DateTime<Utc>,
) -> String {
    let top = config.aggregation.top_operators;
    let tables = [
        (SlotId::QsoSummary.title().to_string(), summary_cells(views)),
        (SlotId::OperatorRates.title().to_string(), rate_cells(views)),
        (top_operators_title(top), top_operator_cells(views, top)),
        (
            SlotId::StationsPie.title().to_string(),
            count_cells("Station", pie_inputs(&views.stations)),
        ),
        (
            SlotId::BandsPie.title().to_string(),
            count_cells("Band", band_pie_inputs(views)),
        ),
        (
            SlotId::ModesPie.title().to_string(),
            count_cells("Mode", mode_pie_inputs(views)),
        ),
        (SlotId::Sections.title().to_string(), section_cells(views)),
    ];

    let mut sections = vec![format!(
        "{}\n{}\n{}",
        config.event_name,
        config.contest_window().phase(now).message(),
        latest.banner()
    )];
    sections.extend(
        tables
            .iter()
            .map(|(title, cells)| format!("{title}\n{}", table(cells))),
    );
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use qsoboard_core::store::MemoryEventStore;

    use super::*;

    fn record(ts: i64, operator: &str, band: &str, mode: &str) -> EventRecord {
        EventRecord::new(ts, operator, "STN1", band, mode).with_contact("W1AW", "2A", "CT")
    }

    #[test]
    fn test_report_lists_every_table() {
        let config = Config::default();
        let store = MemoryEventStore::with_records([
            record(1_000, "A", "20m", "CW"),
            record(1_060, "A", "20m", "CW"),
            record(1_120, "B", "40m", "SSB"),
        ]);
        let latest = store.latest_event().unwrap().unwrap();
        let modes = config.mode_table().unwrap();
        let views =
            SummaryViews::compute(&store, &config.aggregation, &modes, latest.timestamp).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 29, 0, 0, 0).unwrap();

        let report = render_report(&config, &latest, &views, now);
        assert!(report.starts_with("Field Day\nThe contest is over.\nLast QSO: W1AW"));
        for title in [
            "QSOs Summary",
            "QSO/Hour Rates",
            "Top 5 Operators",
            "QSOs by Station",
            "QSOs by Band",
            "QSOs by Mode",
            "QSOs by Section",
        ] {
            assert!(report.contains(title), "missing {title}");
        }
        assert!(report.contains("STN1"));
        assert!(report.contains("CT"));
    }

    #[test]
    fn test_count_cells_pairs_labels_and_values() {
        let cells = count_cells(
            "Band",
            (vec!["20m".to_string(), "40m".to_string()], vec![2, 1]),
        );
        assert_eq!(
            cells,
            vec![
                vec!["Band".to_string(), "QSOs".to_string()],
                vec!["20m".to_string(), "2".to_string()],
                vec!["40m".to_string(), "1".to_string()],
            ]
        );
    }
}
