//! Dependency level assignment.
//!
//! Foreign keys are treated as directed edges from the referencing entity to
//! the referenced one. Referenced roots sit at level 0 and every referencing
//! entity lands strictly below its targets, so parent tables render above
//! their children.

use std::collections::HashMap;

use log::debug;

use crate::schema::Entity;

/// Assign a level to every entity by iterative relaxation.
///
/// Starts everything at 0 and raises each entity to `target level + 1` for
/// every on-diagram foreign key target until nothing changes. Passes are
/// capped at the entity count, which bounds cyclic schemas instead of
/// detecting them; whatever levels a cycle settles on are accepted.
pub fn compute_levels(entities: &[Entity]) -> HashMap<String, usize> {
    let mut levels: HashMap<String, usize> = entities
        .iter()
        .map(|e| (e.table_name.clone(), 0))
        .collect();

    for pass in 0..entities.len() {
        let mut changed = false;

        for entity in entities {
            for column in &entity.columns {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                if fk.table == entity.table_name {
                    continue; // self-reference adds no depth
                }
                // Off-diagram targets contribute no edge
                let Some(&target_level) = levels.get(&fk.table) else {
                    continue;
                };

                let wanted = target_level + 1;
                if let Some(current) = levels.get_mut(&entity.table_name) {
                    if *current < wanted {
                        *current = wanted;
                        changed = true;
                    }
                }
            }
        }

        if !changed {
            debug!("levels settled after {} passes", pass + 1);
            break;
        }
    }

    levels
}

/// Clamp levels into `0..max_level`, folding the overflow into the last
/// level. Crowding the bottom row beats silently dropping entities.
pub fn fold_levels(levels: &mut HashMap<String, usize>, max_level: usize) {
    let cap = max_level.max(1) - 1;
    for level in levels.values_mut() {
        if *level > cap {
            *level = cap;
        }
    }
}
