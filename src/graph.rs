//! Resolved diagram graph: the entity set plus the connectors between them.

use log::warn;

use crate::schema::Entity;

/// One foreign-key relationship with both endpoints present in the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// The entity set with duplicates removed and foreign keys resolved.
///
/// Connectors are derived data, rebuilt on every render. A foreign key only
/// becomes a connector when the target table and target column both exist in
/// the current set; everything else points off-diagram and is left out.
#[derive(Debug, Clone)]
pub struct DiagramGraph {
    pub entities: Vec<Entity>,
    pub connectors: Vec<Connector>,
}

impl DiagramGraph {
    pub fn from_entities(entities: &[Entity]) -> Self {
        let mut deduped: Vec<Entity> = Vec::with_capacity(entities.len());
        for entity in entities {
            if deduped.iter().any(|e| e.table_name == entity.table_name) {
                warn!("duplicate entity {} ignored", entity.table_name);
                continue;
            }
            deduped.push(entity.clone());
        }

        let mut connectors = Vec::new();
        for entity in &deduped {
            for column in &entity.columns {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                let resolved = deduped
                    .iter()
                    .find(|e| e.table_name == fk.table)
                    .is_some_and(|target| target.column(&fk.column).is_some());
                if !resolved {
                    continue;
                }
                connectors.push(Connector {
                    from_table: entity.table_name.clone(),
                    from_column: column.name.clone(),
                    to_table: fk.table.clone(),
                    to_column: fk.column.clone(),
                });
            }
        }

        Self {
            entities: deduped,
            connectors,
        }
    }

    pub fn entity(&self, table_name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.table_name == table_name)
    }
}
