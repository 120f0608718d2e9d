//! Markdown description export: one heading and column table per entity.

use std::fmt::Write;

use crate::schema::Entity;

pub fn markdown(entities: &[Entity]) -> String {
    let mut out = String::new();
    out.push_str("# Entity Description\n");

    for entity in entities {
        writeln!(&mut out, "\n## {}\n", escape_cell(&entity.table_name)).unwrap();
        writeln!(&mut out, "| Column | Type | Length | Nullable | Extra | Key |").unwrap();
        writeln!(&mut out, "|--------|------|--------|----------|-------|-----|").unwrap();

        for column in &entity.columns {
            let length = column
                .length
                .map(|l| l.to_string())
                .unwrap_or_default();
            let nullable = if column.nullable { "Yes" } else { "No" };
            let extra = column.extra.as_deref().unwrap_or("");
            let key = if entity.is_primary_key(&column.name) {
                "PRI"
            } else if column.foreign_key.is_some() {
                "FK"
            } else {
                ""
            };
            writeln!(
                &mut out,
                "| {} | {} | {} | {} | {} | {} |",
                escape_cell(&column.name),
                escape_cell(&column.type_name),
                length,
                nullable,
                escape_cell(extra),
                key
            )
            .unwrap();
        }
    }

    out
}

fn escape_cell(s: &str) -> String {
    s.replace('\\', "\\\\").replace('|', "\\|")
}
