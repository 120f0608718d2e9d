pub mod cache;
pub mod config;
pub mod extract;
pub mod graph;
pub mod imagemap;
pub mod layout;
pub mod levels;
pub mod markdown;
pub mod measure;
pub mod schema;
pub mod svg;

use std::fmt;
use std::path::PathBuf;

use log::warn;
use wasm_bindgen::prelude::*;

pub use cache::{CacheError, RenderCache};
pub use config::{DiagramConfig, MIN_ZOOM};
pub use extract::{extract, extract_str, ExtractError};
pub use graph::{Connector, DiagramGraph};
pub use layout::{Layout, LayoutBox, LayoutConnector, LayoutEngine};
pub use schema::{Column, Entity, ForeignKey};
pub use svg::SvgRenderer;

/// An entity-relationship diagram under construction.
///
/// Entities are added one by one; each output (SVG, image map, Markdown) is
/// derived on demand from whatever has been added so far. With a cache
/// directory set, finished renders are memoized by entity set + config.
pub struct Diagram {
    entities: Vec<Entity>,
    config: DiagramConfig,
    cache: Option<RenderCache>,
}

impl Diagram {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            entities: Vec::new(),
            config: config.clamped(),
            cache: None,
        }
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    pub fn set_cache_dir(&mut self, dir: impl Into<PathBuf>) -> Result<(), CacheError> {
        self.cache = Some(RenderCache::new(dir)?);
        Ok(())
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Render the diagram as a complete SVG document.
    pub fn to_svg(&self) -> String {
        let graph = DiagramGraph::from_entities(&self.entities);
        self.cached("svg", &graph, |graph| {
            let layout = LayoutEngine::new(self.config.clone()).layout(graph);
            SvgRenderer::default().render(graph, &layout)
        })
    }

    /// Render the HTML image-map fragment overlaying the SVG.
    pub fn image_map(&self, map_name: &str) -> String {
        let graph = DiagramGraph::from_entities(&self.entities);
        // The map name lands in a cache file name; keep it path-safe
        let safe_name: String = map_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let extension = format!("{}.map", safe_name);
        self.cached(&extension, &graph, |graph| {
            let layout = LayoutEngine::new(self.config.clone()).layout(graph);
            imagemap::image_map(&layout, map_name)
        })
    }

    /// Render the Markdown description document.
    pub fn to_markdown(&self) -> String {
        let graph = DiagramGraph::from_entities(&self.entities);
        self.cached("md", &graph, |graph| markdown::markdown(&graph.entities))
    }

    /// Cache wrapper. Cache trouble never fails a render; the result is
    /// simply produced uncached.
    fn cached(
        &self,
        extension: &str,
        graph: &DiagramGraph,
        render: impl FnOnce(&DiagramGraph) -> String,
    ) -> String {
        let Some(cache) = &self.cache else {
            return render(graph);
        };
        let key = match RenderCache::compute_key(&graph.entities, &self.config) {
            Ok(key) => key,
            Err(e) => {
                warn!("cache key failed: {}", e);
                return render(graph);
            }
        };
        if let Some(hit) = cache.get(&key, extension) {
            return hit;
        }
        let content = render(graph);
        if let Err(e) = cache.put(&key, extension, &content) {
            warn!("cache write failed: {}", e);
        }
        content
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg())
    }
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn diagram_from_json(metadata: &str, config: Option<&str>) -> Result<Diagram, String> {
    let value: serde_json::Value = serde_json::from_str(metadata).map_err(|e| e.to_string())?;
    let items = value
        .as_array()
        .ok_or_else(|| "expected a JSON array of table metadata".to_string())?;

    let config: DiagramConfig = match config {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(json).map_err(|e| e.to_string())?
        }
        _ => DiagramConfig::default(),
    };

    let mut diagram = Diagram::new(config);
    for item in items {
        match extract::extract(item) {
            Ok(entity) => {
                diagram.add_entity(entity);
            }
            Err(e) => warn!("skipping entity: {}", e),
        }
    }
    Ok(diagram)
}

/// Render table metadata JSON to an SVG document
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn schema_to_svg(metadata: &str, config: Option<String>) -> Result<String, String> {
    Ok(diagram_from_json(metadata, config.as_deref())?.to_svg())
}

/// Render table metadata JSON to an HTML image-map fragment
#[wasm_bindgen(js_name = "schemaToImageMap")]
pub fn schema_to_image_map(
    metadata: &str,
    map_name: &str,
    config: Option<String>,
) -> Result<String, String> {
    Ok(diagram_from_json(metadata, config.as_deref())?.image_map(map_name))
}

/// Render table metadata JSON to a Markdown description
#[wasm_bindgen(js_name = "schemaToMarkdown")]
pub fn schema_to_markdown(metadata: &str, config: Option<String>) -> Result<String, String> {
    Ok(diagram_from_json(metadata, config.as_deref())?.to_markdown())
}
