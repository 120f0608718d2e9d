//! Level-based grid layout.
//!
//! Entities are bucketed by dependency level, wrapped into display rows of at
//! most `max_column` boxes, and placed top-down with margin gaps. Connectors
//! are routed as orthogonal elbow lines between the foreign-key row and the
//! referenced row. All output coordinates are final pixels: the zoom factor
//! is applied here, once, to the entire canvas.

use std::collections::HashMap;

use crate::config::DiagramConfig;
use crate::graph::DiagramGraph;
use crate::levels::{compute_levels, fold_levels};
use crate::measure::TextMetrics;
use crate::schema::Column;

/// A positioned entity box.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub table_name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    /// Column name -> vertical center of its row, in canvas pixels.
    pub column_row_y: HashMap<String, f64>,
}

impl LayoutBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// An elbow-routed connector between two column rows.
#[derive(Debug, Clone)]
pub struct LayoutConnector {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub boxes: Vec<LayoutBox>,
    pub connectors: Vec<LayoutConnector>,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

/// Text shown for a column row; sizing and rendering must agree on it.
pub fn row_label(column: &Column) -> String {
    format!("{} : {}", column.name, column.type_label())
}

pub struct LayoutEngine {
    metrics: TextMetrics,
    config: DiagramConfig,
}

impl LayoutEngine {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            metrics: TextMetrics::default(),
            config: config.clamped(),
        }
    }

    pub fn layout(&self, graph: &DiagramGraph) -> Layout {
        if graph.entities.is_empty() {
            return Layout {
                boxes: Vec::new(),
                connectors: Vec::new(),
                width: 1.0,
                height: 1.0,
                zoom: self.config.zoom,
            };
        }

        let mut levels = compute_levels(&graph.entities);
        fold_levels(&mut levels, self.config.max_level);

        // Bucket by level, insertion order within a level
        let mut buckets: HashMap<usize, Vec<usize>> = HashMap::new();
        for (idx, entity) in graph.entities.iter().enumerate() {
            let level = levels.get(&entity.table_name).copied().unwrap_or(0);
            buckets.entry(level).or_default().push(idx);
        }
        let mut level_keys: Vec<usize> = buckets.keys().copied().collect();
        level_keys.sort_unstable();

        let sizes: Vec<(f64, f64)> = graph
            .entities
            .iter()
            .map(|e| {
                let labels: Vec<String> = e.columns.iter().map(row_label).collect();
                self.metrics.box_size(&e.table_name, &labels)
            })
            .collect();

        let margin_x = self.config.margin_x;
        let margin_y = self.config.margin_y;

        let mut boxes: Vec<LayoutBox> = Vec::with_capacity(graph.entities.len());
        let mut content_width: f64 = 0.0;
        let mut y = margin_y;

        for &level in &level_keys {
            for display_row in buckets[&level].chunks(self.config.max_column) {
                let mut x = margin_x;
                let mut row_height: f64 = 0.0;

                for &idx in display_row {
                    let entity = &graph.entities[idx];
                    let (w, h) = sizes[idx];

                    let column_row_y = entity
                        .columns
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (c.name.clone(), y + self.metrics.row_center_offset(i)))
                        .collect();

                    boxes.push(LayoutBox {
                        table_name: entity.table_name.clone(),
                        x,
                        y,
                        width: w,
                        height: h,
                        header_height: self.metrics.header_height(),
                        column_row_y,
                    });

                    x += w + margin_x;
                    row_height = row_height.max(h);
                }

                content_width = content_width.max(x);
                y += row_height + margin_y;
            }
        }
        let mut content_height = y;

        let connectors = self.route_connectors(graph, &boxes);
        for connector in &connectors {
            for &(px, py) in &connector.points {
                content_width = content_width.max(px + margin_x);
                content_height = content_height.max(py + margin_y);
            }
        }

        let zoom = self.config.zoom;
        let mut layout = Layout {
            boxes,
            connectors,
            width: content_width * zoom,
            height: content_height * zoom,
            zoom,
        };
        scale(&mut layout, zoom);
        layout.width = layout.width.max(self.config.width);
        layout
    }

    fn route_connectors(&self, graph: &DiagramGraph, boxes: &[LayoutBox]) -> Vec<LayoutConnector> {
        let by_name: HashMap<&str, &LayoutBox> =
            boxes.iter().map(|b| (b.table_name.as_str(), b)).collect();

        let mut connectors = Vec::with_capacity(graph.connectors.len());
        for c in &graph.connectors {
            let (Some(from), Some(to)) = (
                by_name.get(c.from_table.as_str()),
                by_name.get(c.to_table.as_str()),
            ) else {
                continue;
            };
            let (Some(&y1), Some(&y2)) = (
                from.column_row_y.get(&c.from_column),
                to.column_row_y.get(&c.to_column),
            ) else {
                continue;
            };

            // Exit the side facing the target; when the boxes overlap
            // horizontally, run a stub past the rightmost edge instead.
            let points = if from.right() < to.x {
                elbow(from.right(), y1, to.x, y2)
            } else if to.right() < from.x {
                elbow(from.x, y1, to.right(), y2)
            } else {
                let bend = from.right().max(to.right()) + self.config.margin_x * 0.5;
                vec![
                    (from.right(), y1),
                    (bend, y1),
                    (bend, y2),
                    (to.right(), y2),
                ]
            };

            connectors.push(LayoutConnector {
                from_table: c.from_table.clone(),
                from_column: c.from_column.clone(),
                to_table: c.to_table.clone(),
                to_column: c.to_column.clone(),
                points,
            });
        }
        connectors
    }
}

fn elbow(x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<(f64, f64)> {
    let mid = (x1 + x2) / 2.0;
    vec![(x1, y1), (mid, y1), (mid, y2), (x2, y2)]
}

fn scale(layout: &mut Layout, zoom: f64) {
    for b in &mut layout.boxes {
        b.x *= zoom;
        b.y *= zoom;
        b.width *= zoom;
        b.height *= zoom;
        b.header_height *= zoom;
        for y in b.column_row_y.values_mut() {
            *y *= zoom;
        }
    }
    for c in &mut layout.connectors {
        for p in &mut c.points {
            p.0 *= zoom;
            p.1 *= zoom;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Entity, ForeignKey};

    fn column(name: &str, fk: Option<(&str, &str)>) -> Column {
        Column {
            name: name.to_string(),
            type_name: "bigint".to_string(),
            length: None,
            nullable: false,
            extra: None,
            foreign_key: fk.map(|(table, col)| ForeignKey {
                table: table.to_string(),
                column: col.to_string(),
            }),
        }
    }

    fn entity(name: &str, columns: Vec<Column>, pks: &[&str]) -> Entity {
        Entity {
            table_name: name.to_string(),
            columns,
            primary_keys: pks.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn two_level_graph() -> DiagramGraph {
        DiagramGraph::from_entities(&[
            entity("customer", vec![column("customer_id", None)], &["customer_id"]),
            entity(
                "order",
                vec![
                    column("order_id", None),
                    column("customer_id", Some(("customer", "customer_id"))),
                ],
                &["order_id"],
            ),
        ])
    }

    #[test]
    fn test_empty_graph_yields_unit_canvas() {
        let graph = DiagramGraph::from_entities(&[]);
        let layout = LayoutEngine::new(DiagramConfig::default()).layout(&graph);
        assert!(layout.boxes.is_empty());
        assert_eq!(layout.width, 1.0);
        assert_eq!(layout.height, 1.0);
    }

    #[test]
    fn test_referencing_entity_placed_below_target() {
        let layout = LayoutEngine::new(DiagramConfig::default()).layout(&two_level_graph());
        let customer = layout.boxes.iter().find(|b| b.table_name == "customer").unwrap();
        let order = layout.boxes.iter().find(|b| b.table_name == "order").unwrap();
        assert!(order.y > customer.bottom());
    }

    #[test]
    fn test_single_connector_anchored_to_rows() {
        let layout = LayoutEngine::new(DiagramConfig::default()).layout(&two_level_graph());
        assert_eq!(layout.connectors.len(), 1);

        let c = &layout.connectors[0];
        let order = layout.boxes.iter().find(|b| b.table_name == "order").unwrap();
        let customer = layout.boxes.iter().find(|b| b.table_name == "customer").unwrap();

        assert_eq!(c.points.first().unwrap().1, order.column_row_y["customer_id"]);
        assert_eq!(c.points.last().unwrap().1, customer.column_row_y["customer_id"]);
    }

    #[test]
    fn test_max_column_wraps_rows() {
        let entities: Vec<Entity> = (0..5)
            .map(|i| entity(&format!("t{}", i), vec![column("id", None)], &["id"]))
            .collect();
        let graph = DiagramGraph::from_entities(&entities);
        let config = DiagramConfig {
            max_column: 2,
            ..Default::default()
        };
        let layout = LayoutEngine::new(config).layout(&graph);

        // 5 same-level entities wrapped in pairs: three distinct y positions
        let mut ys: Vec<i64> = layout.boxes.iter().map(|b| b.y as i64).collect();
        ys.sort_unstable();
        ys.dedup();
        assert_eq!(ys.len(), 3);
    }

    #[test]
    fn test_zoom_scales_canvas_uniformly() {
        let graph = two_level_graph();
        let base = LayoutEngine::new(DiagramConfig::default()).layout(&graph);
        let zoomed = LayoutEngine::new(DiagramConfig {
            zoom: 2.0,
            ..Default::default()
        })
        .layout(&graph);

        assert_eq!(zoomed.width, base.width * 2.0);
        assert_eq!(zoomed.height, base.height * 2.0);
        assert_eq!(zoomed.boxes[0].x, base.boxes[0].x * 2.0);
        assert_eq!(zoomed.boxes[0].width, base.boxes[0].width * 2.0);
    }

    #[test]
    fn test_undersized_zoom_matches_explicit_minimum() {
        let graph = two_level_graph();
        let clamped = LayoutEngine::new(DiagramConfig {
            zoom: 0.1,
            ..Default::default()
        })
        .layout(&graph);
        let explicit = LayoutEngine::new(DiagramConfig {
            zoom: 0.25,
            ..Default::default()
        })
        .layout(&graph);

        assert_eq!(clamped.width, explicit.width);
        assert_eq!(clamped.boxes[0].x, explicit.boxes[0].x);
        assert_eq!(clamped.boxes[0].y, explicit.boxes[0].y);
    }

    #[test]
    fn test_zero_column_entity_is_header_only() {
        let graph = DiagramGraph::from_entities(&[entity("empty", vec![], &[])]);
        let layout = LayoutEngine::new(DiagramConfig::default()).layout(&graph);
        let b = &layout.boxes[0];
        assert_eq!(b.height, b.header_height);
        assert!(b.column_row_y.is_empty());
    }

    #[test]
    fn test_width_floor_applies() {
        let graph = DiagramGraph::from_entities(&[entity("a", vec![], &[])]);
        let layout = LayoutEngine::new(DiagramConfig {
            width: 2000.0,
            ..Default::default()
        })
        .layout(&graph);
        assert_eq!(layout.width, 2000.0);
    }

    #[test]
    fn test_self_reference_routes_outside_right_edge() {
        let graph = DiagramGraph::from_entities(&[entity(
            "node",
            vec![column("id", None), column("parent_id", Some(("node", "id")))],
            &["id"],
        )]);
        let layout = LayoutEngine::new(DiagramConfig::default()).layout(&graph);
        assert_eq!(layout.connectors.len(), 1);
        let b = &layout.boxes[0];
        let bend_x = layout.connectors[0].points[1].0;
        assert!(bend_x > b.right());
        // Canvas grew to cover the stub
        assert!(layout.width >= bend_x);
    }
}
