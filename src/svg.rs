//! SVG document rendering.
//!
//! Output is a complete, self-contained document: XML prolog, embedded
//! styles, no external references. Rendering is pure string building over an
//! already-computed layout, so identical input produces byte-identical
//! output and results can be cached safely.

use std::fmt::Write;

use crate::graph::DiagramGraph;
use crate::layout::{row_label, Layout, LayoutBox};
use crate::measure::TextMetrics;
use crate::schema::Entity;

pub struct SvgRenderer {
    metrics: TextMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
        }
    }
}

impl SvgRenderer {
    pub fn render(&self, graph: &DiagramGraph, layout: &Layout) -> String {
        let mut svg = String::new();
        writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();

        if layout.boxes.is_empty() {
            // Minimal valid document for the empty diagram
            writeln!(
                &mut svg,
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1" viewBox="0 0 1 1"/>"#
            )
            .unwrap();
            return svg;
        }

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            layout.width, layout.height, layout.width, layout.height
        )
        .unwrap();

        let zoom = layout.zoom;
        writeln!(
            &mut svg,
            r#"<style>
  .entity-bg {{ fill: #fff; }}
  .entity-header {{ fill: #dde4ee; }}
  .entity-border {{ fill: none; stroke: #334; stroke-width: 1.5; }}
  .entity-name {{ font-family: monospace; font-size: {}px; font-weight: bold; }}
  .column-text {{ font-family: monospace; font-size: {}px; }}
  .pk {{ font-weight: bold; }}
  .fk {{ font-style: italic; }}
  .row-pk {{ fill: #f1ead2; }}
  .connector {{ stroke: #999; stroke-width: 1; fill: none; }}
</style>"#,
            14.0 * zoom,
            12.0 * zoom
        )
        .unwrap();

        // Connectors first so boxes sit on top of them
        for connector in &layout.connectors {
            let points: Vec<String> = connector
                .points
                .iter()
                .map(|(x, y)| format!("{},{}", x, y))
                .collect();
            writeln!(
                &mut svg,
                r#"<polyline class="connector" points="{}" />"#,
                points.join(" ")
            )
            .unwrap();
        }

        for layout_box in &layout.boxes {
            if let Some(entity) = graph.entity(&layout_box.table_name) {
                self.render_box(&mut svg, layout_box, entity, zoom);
            }
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_box(&self, svg: &mut String, b: &LayoutBox, entity: &Entity, zoom: f64) {
        writeln!(
            svg,
            r#"<rect class="entity-bg" x="{}" y="{}" width="{}" height="{}" />"#,
            b.x, b.y, b.width, b.height
        )
        .unwrap();

        writeln!(
            svg,
            r#"<rect class="entity-header" x="{}" y="{}" width="{}" height="{}" />"#,
            b.x, b.y, b.width, b.header_height
        )
        .unwrap();

        // Primary-key rows get a background tint before any text is drawn
        let row_height = self.metrics.row_height * zoom;
        for column in &entity.columns {
            if !entity.is_primary_key(&column.name) {
                continue;
            }
            if let Some(&center_y) = b.column_row_y.get(&column.name) {
                writeln!(
                    svg,
                    r#"<rect class="row-pk" x="{}" y="{}" width="{}" height="{}" />"#,
                    b.x,
                    center_y - row_height / 2.0,
                    b.width,
                    row_height
                )
                .unwrap();
            }
        }

        writeln!(
            svg,
            r#"<text class="entity-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            b.x + b.width / 2.0,
            b.y + b.header_height / 2.0 + 5.0 * zoom,
            escape_xml(&entity.table_name)
        )
        .unwrap();

        if !entity.columns.is_empty() {
            writeln!(
                svg,
                r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#334" stroke-width="1" />"##,
                b.x,
                b.y + b.header_height,
                b.right(),
                b.y + b.header_height
            )
            .unwrap();
        }

        for column in &entity.columns {
            let Some(&center_y) = b.column_row_y.get(&column.name) else {
                continue;
            };
            let mut class = "column-text".to_string();
            if entity.is_primary_key(&column.name) {
                class.push_str(" pk");
            }
            if column.foreign_key.is_some() {
                class.push_str(" fk");
            }
            writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                class,
                b.x + self.metrics.padding_x * zoom,
                center_y + 4.0 * zoom,
                escape_xml(&row_label(column))
            )
            .unwrap();
        }

        writeln!(
            svg,
            r#"<rect class="entity-border" x="{}" y="{}" width="{}" height="{}" />"#,
            b.x, b.y, b.width, b.height
        )
        .unwrap();
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
