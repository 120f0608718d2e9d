//! HTML image-map export.
//!
//! Produces a `<map>` fragment meant to overlay the SVG rendered from the
//! same [`Layout`], so coordinates come straight from the layout's pixel
//! space, rounded to the integers image maps require. Foreign-key row areas
//! are emitted before whole-box areas: earlier areas win hit-testing, which
//! makes the rows clickable inside their box.

use std::fmt::Write;

use crate::layout::Layout;
use crate::measure::TextMetrics;
use crate::svg::escape_xml;

pub fn image_map(layout: &Layout, map_name: &str) -> String {
    let metrics = TextMetrics::default();
    let row_height = metrics.row_height * layout.zoom;

    let mut html = String::new();
    writeln!(&mut html, r#"<map name="{}">"#, escape_xml(map_name)).unwrap();

    for connector in &layout.connectors {
        let Some(b) = layout
            .boxes
            .iter()
            .find(|b| b.table_name == connector.from_table)
        else {
            continue;
        };
        let Some(&center_y) = b.column_row_y.get(&connector.from_column) else {
            continue;
        };
        writeln!(
            &mut html,
            r##"  <area shape="rect" coords="{},{},{},{}" href="#entity-{}" alt="{}" title="{} &#8594; {}.{}">"##,
            round(b.x),
            round(center_y - row_height / 2.0),
            round(b.right()),
            round(center_y + row_height / 2.0),
            escape_xml(&connector.to_table),
            escape_xml(&connector.to_table),
            escape_xml(&connector.from_column),
            escape_xml(&connector.to_table),
            escape_xml(&connector.to_column),
        )
        .unwrap();
    }

    for b in &layout.boxes {
        writeln!(
            &mut html,
            r##"  <area shape="rect" coords="{},{},{},{}" href="#entity-{}" alt="{}" title="{}">"##,
            round(b.x),
            round(b.y),
            round(b.right()),
            round(b.bottom()),
            escape_xml(&b.table_name),
            escape_xml(&b.table_name),
            escape_xml(&b.table_name),
        )
        .unwrap();
    }

    writeln!(&mut html, "</map>").unwrap();
    html
}

fn round(v: f64) -> i64 {
    v.round() as i64
}
