//! Plain-terminal output for the one-shot commands.

use console::style;
use url::Url;

use super::{scrape_cells, InfoBox, SCRAPE_HEADER};
use crate::models::{Catalog, ScrapeRecord, ScrapeResult};

/// Mountains with their cameras, one per line, ids first.
pub fn catalog_listing(catalog: &Catalog) -> String {
    let mut out = String::new();
    for mountain in catalog.mountains() {
        out.push_str(&format!(
            "{:>4}  {}\n",
            style(mountain.id).dim(),
            style(mountain.label()).bold()
        ));
        for camera in mountain.cameras() {
            let status = if camera.is_active {
                String::new()
            } else {
                format!(" {}", style("(inactive)").yellow())
            };
            out.push_str(&format!(
                "      {:>4}  {}{}\n",
                style(camera.id).dim(),
                camera.label(),
                status
            ));
        }
    }
    out
}

pub fn info_box(info: &InfoBox) -> String {
    let mut out = format!("{}", style(&info.title).bold());
    if !info.subtitle.is_empty() {
        out.push_str(&format!("  {}", info.subtitle));
    }
    out.push('\n');
    let width = info
        .rows
        .iter()
        .map(|r| r.property.len())
        .max()
        .unwrap_or(0);
    for row in &info.rows {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            row.property,
            row.value,
            width = width
        ));
    }
    out
}

/// Scrape log as an aligned table. Successful rows end with the image URL.
pub fn scrape_table(records: &[ScrapeRecord], base: &Url) -> String {
    let rows: Vec<[String; 4]> = records.iter().map(|r| scrape_cells(r, base)).collect();
    let width = |column: usize| {
        rows.iter()
            .map(|r| r[column].len())
            .chain(std::iter::once(SCRAPE_HEADER[column].len()))
            .max()
            .unwrap_or(0)
    };
    let time_width = width(0);
    let result_width = "success".len();
    let detail_width = width(2);

    let mut out = format!(
        "{}\n",
        style(format!(
            "{:<tw$}  {:<rw$}  {:<dw$}  {}",
            SCRAPE_HEADER[0],
            SCRAPE_HEADER[1],
            SCRAPE_HEADER[2],
            SCRAPE_HEADER[3],
            tw = time_width,
            rw = result_width,
            dw = detail_width
        ))
        .underlined()
    );
    for (record, cells) in records.iter().zip(&rows) {
        let padded = format!("{:<rw$}", cells[1], rw = result_width);
        let result = match record.result {
            ScrapeResult::Success => style(padded).green(),
            ScrapeResult::Failure => style(padded).red(),
            ScrapeResult::Idle => style(padded).dim(),
        };
        let line = format!(
            "{:<tw$}  {}  {:<dw$}  {}",
            cells[0],
            result,
            cells[2],
            cells[3],
            tw = time_width,
            dw = detail_width
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
