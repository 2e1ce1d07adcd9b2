//! GoShop - WASM Module
//!
//! This module provides the lookup structures behind the GoShop store
//! assistant. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; the core types are plain Rust and usable directly.
//!
//! # Architecture
//!
//! - `graph`: Store navigation graph with Dijkstra routing (petgraph storage)
//! - `index`: Skip-list ordered map from aisle number to aisle contents
//! - `grouping`: Union-find over catalog items with soft removal and rename
//! - `spatial`: Point quadtree for nearest-store lookup
//!
//! The four structures are independent: none of them references another.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod grouping;
pub mod index;
pub mod spatial;

pub use error::{EntityKind, StoreError};
pub use graph::{Neighbor, ShortestPath, WeightedGraph};
pub use grouping::UnionFind;
pub use index::{OrderedIndex, OrderedIndexConfig};
pub use spatial::{Bounds, Location, NearestMatch, SpatialIndex};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

impl From<StoreError> for JsValue {
    fn from(err: StoreError) -> Self {
        JsError::new(&err.to_string()).into()
    }
}

/// Serialize a payload as plain JS objects and arrays.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&Serializer::json_compatible())?)
}

fn seed_or_random(seed: Option<u32>) -> u64 {
    seed.map(u64::from)
        .unwrap_or_else(|| (js_sys::Math::random() * (1u64 << 53) as f64) as u64)
}

// =============================================================================
// Store Navigation
// =============================================================================

/// Store map: locations joined by weighted walking paths.
#[wasm_bindgen]
pub struct StoreMapWasm {
    graph: WeightedGraph,
}

#[wasm_bindgen]
impl StoreMapWasm {
    /// Create an empty store map.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: WeightedGraph::new(),
        }
    }

    /// Create a store map with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(vertex_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: WeightedGraph::with_capacity(vertex_capacity, edge_capacity),
        }
    }

    /// Add a location. Returns false if the name is taken.
    #[wasm_bindgen(js_name = addVertex)]
    pub fn add_vertex(&mut self, label: &str) -> bool {
        self.graph.add_vertex(label).is_ok()
    }

    /// Remove a location and its paths.
    #[wasm_bindgen(js_name = removeVertex)]
    pub fn remove_vertex(&mut self, label: &str) -> bool {
        self.graph.remove_vertex(label).is_ok()
    }

    /// Check if a location exists.
    #[wasm_bindgen(js_name = hasVertex)]
    pub fn has_vertex(&self, label: &str) -> bool {
        self.graph.contains_vertex(label)
    }

    /// Connect two locations. Returns false for a negative distance or an
    /// unknown location.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, src: &str, dest: &str, weight: i32) -> bool {
        self.graph.add_edge(src, dest, i64::from(weight)).is_ok()
    }

    /// Remove the path between two locations.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, src: &str, dest: &str) -> bool {
        self.graph.remove_edge(src, dest).is_ok()
    }

    /// Change the distance of an existing path.
    #[wasm_bindgen(js_name = updateEdge)]
    pub fn update_edge(&mut self, src: &str, dest: &str, weight: i32) -> bool {
        self.graph.update_edge(src, dest, i64::from(weight)).is_ok()
    }

    /// Get the distance of the path between two locations.
    #[wasm_bindgen(js_name = edgeWeight)]
    pub fn edge_weight(&self, src: &str, dest: &str) -> Option<f64> {
        self.graph.edge_weight(src, dest).map(|w| w as f64)
    }

    /// Get the number of locations.
    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> u32 {
        self.graph.vertex_count() as u32
    }

    /// Get the number of paths.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Get `[{ label, weight }, ...]` for a location.
    pub fn neighbors(&self, label: &str) -> Result<JsValue, JsValue> {
        to_js(&self.graph.neighbors(label)?)
    }

    /// Get the full map as `[[label, [{ label, weight }, ...]], ...]`.
    pub fn adjacency(&self) -> Result<JsValue, JsValue> {
        to_js(&self.graph.adjacency())
    }

    /// Find the shortest route as `{ path, distance }`.
    #[wasm_bindgen(js_name = shortestPath)]
    pub fn shortest_path(&self, start: &str, end: &str) -> Result<JsValue, JsValue> {
        to_js(&self.graph.shortest_path(start, end)?)
    }

    /// Remove all locations and paths.
    pub fn clear(&mut self) {
        self.graph.clear();
    }
}

impl Default for StoreMapWasm {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Aisle Data
// =============================================================================

/// Aisle number to aisle contents.
#[wasm_bindgen]
pub struct AisleIndexWasm {
    index: OrderedIndex<SmallRng>,
}

#[wasm_bindgen]
impl AisleIndexWasm {
    /// Create an empty aisle index.
    ///
    /// The seed fixes the skip-list level draws; without one a seed is taken
    /// from `Math.random()`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> Self {
        Self {
            index: OrderedIndex::seeded(seed_or_random(seed)),
        }
    }

    /// Create an aisle index from `{ maxLevel, promotionProbability }`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue, seed: Option<u32>) -> Result<AisleIndexWasm, JsValue> {
        let config: OrderedIndexConfig = serde_wasm_bindgen::from_value(config)?;
        let rng = SmallRng::seed_from_u64(seed_or_random(seed));
        Ok(Self {
            index: OrderedIndex::with_config(config, rng)?,
        })
    }

    /// Add an aisle. Returns false if the aisle number exists.
    pub fn insert(&mut self, aisle: i32, contents: &str) -> bool {
        self.index.insert(aisle, contents).is_ok()
    }

    /// Get the contents of an aisle.
    pub fn search(&self, aisle: i32) -> Option<String> {
        self.index.search(aisle).map(str::to_owned)
    }

    /// Replace the contents of an existing aisle.
    pub fn update(&mut self, aisle: i32, contents: &str) -> bool {
        self.index.update(aisle, contents).is_ok()
    }

    /// Remove an aisle.
    pub fn remove(&mut self, aisle: i32) -> bool {
        self.index.remove(aisle).is_ok()
    }

    /// Get `[[aisle, contents], ...]` in ascending aisle order.
    pub fn entries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.index.enumerate_ascending())
    }

    /// Get the number of aisles.
    pub fn len(&self) -> u32 {
        self.index.len() as u32
    }

    /// Check if no aisle is stored.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// =============================================================================
// Item Grouping
// =============================================================================

/// Catalog items grouped into categories.
#[wasm_bindgen]
pub struct CatalogGroupsWasm {
    groups: UnionFind,
}

#[wasm_bindgen]
impl CatalogGroupsWasm {
    /// Create an empty grouping.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            groups: UnionFind::new(),
        }
    }

    /// Add an item as its own group.
    #[wasm_bindgen(js_name = makeSet)]
    pub fn make_set(&mut self, item: &str) -> bool {
        self.groups.make_set(item).is_ok()
    }

    /// Get the representative item of an item's group.
    pub fn find(&mut self, item: &str) -> Option<String> {
        self.groups.find(item).ok()
    }

    /// Merge two groups.
    ///
    /// Returns true if they merged, false if they already shared a group and
    /// undefined if either item is unknown or removed.
    pub fn union(&mut self, a: &str, b: &str) -> Option<bool> {
        self.groups.union(a, b).ok()
    }

    /// Remove an item from its group.
    pub fn remove(&mut self, item: &str) -> bool {
        self.groups.remove(item).is_ok()
    }

    /// Rename an item, keeping its group.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        self.groups.rename(old, new).is_ok()
    }

    /// Get `{ representative: [members...] }` for all active items.
    pub fn groups(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.groups.enumerate_groups())
    }

    /// Get the number of active items.
    pub fn len(&self) -> u32 {
        self.groups.len() as u32
    }

    /// Check if no item is active.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for CatalogGroupsWasm {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Store Locations
// =============================================================================

/// Named store locations with nearest-store lookup.
#[wasm_bindgen]
pub struct StoreLocatorWasm {
    index: SpatialIndex,
}

#[wasm_bindgen]
impl StoreLocatorWasm {
    /// Create a locator over the default `[-100, 100] x [-100, 100]` domain.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            index: SpatialIndex::default(),
        }
    }

    /// Create a locator over a custom domain.
    #[wasm_bindgen(js_name = withBounds)]
    pub fn with_bounds(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<StoreLocatorWasm, JsValue> {
        let bounds = Bounds::new(min_x, min_y, max_x, max_y)?;
        Ok(Self {
            index: SpatialIndex::new(bounds)?,
        })
    }

    /// Add a store. Returns false if outside the domain, the name is taken,
    /// or another store sits at the same coordinate.
    pub fn insert(&mut self, x: f64, y: f64, name: &str) -> bool {
        self.index.insert(x, y, name).is_ok()
    }

    /// Remove a store by name.
    #[wasm_bindgen(js_name = removeByName)]
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        self.index.remove_by_name(name).is_ok()
    }

    /// Remove the store at an exact coordinate.
    #[wasm_bindgen(js_name = removeByCoordinate)]
    pub fn remove_by_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.index.remove_by_coordinate(x, y).is_ok()
    }

    /// Find the closest store as `{ name, x, y, distance }`.
    pub fn nearest(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        to_js(&self.index.nearest(x, y)?)
    }

    /// Get `[{ name, x, y }, ...]` for every stored location.
    pub fn locations(&self) -> Result<JsValue, JsValue> {
        to_js(&self.index.enumerate_present())
    }

    /// Get the number of stores.
    pub fn len(&self) -> u32 {
        self.index.len() as u32
    }

    /// Check if no store is stored.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the number of quadtree nodes, including emptied leaves.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.index.node_count() as u32
    }
}

impl Default for StoreLocatorWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Seed each structure the way the store assistant does and run one
    /// query against each, without wasm_bindgen JS types.
    #[test]
    fn test_sample_store_session() {
        let mut map = WeightedGraph::new();
        for label in ["Entrance", "Dairy", "Produce", "Checkout", "Pharmacy"] {
            map.add_vertex(label).unwrap();
        }
        for (src, dest, weight) in [
            ("Entrance", "Dairy", 10),
            ("Entrance", "Produce", 20),
            ("Dairy", "Produce", 5),
            ("Dairy", "Pharmacy", 10),
            ("Produce", "Checkout", 5),
            ("Pharmacy", "Checkout", 5),
            ("Entrance", "Pharmacy", 15),
        ] {
            map.add_edge(src, dest, weight).unwrap();
        }

        let mut aisles = OrderedIndex::seeded(2024);
        aisles.insert(3, "Dairy: Milk, Cheese, Yogurt").unwrap();
        aisles.insert(5, "Produce: Apple, Banana, Orange").unwrap();
        aisles.insert(7, "Bakery: Bread, Donuts").unwrap();

        let mut catalog = UnionFind::new();
        for item in [
            "milk", "cheese", "yogurt", "apple", "banana", "bread", "eggs",
        ] {
            catalog.make_set(item).unwrap();
        }
        catalog.union("milk", "cheese").unwrap();
        catalog.union("milk", "yogurt").unwrap();
        catalog.union("apple", "banana").unwrap();

        let mut stores = SpatialIndex::default();
        stores.insert(10.0, 20.0, "Walmart Supercenter A").unwrap();
        stores.insert(-15.0, 5.0, "Walmart Supercenter B").unwrap();
        stores.insert(5.0, -10.0, "Walmart Neighborhood C").unwrap();

        let route = map.shortest_path("Entrance", "Checkout").unwrap();
        println!("Route: {:?} ({})", route.path, route.distance);
        assert_eq!(route.distance, 20);

        let keys: Vec<_> = aisles.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![3, 5, 7]);

        catalog.rename("milk", "whole milk").unwrap();
        assert_eq!(
            catalog.find("whole milk").unwrap(),
            catalog.find("yogurt").unwrap()
        );
        assert_eq!(catalog.enumerate_groups().len(), 4);

        let nearest = stores.nearest(0.0, 0.0).unwrap();
        println!("Nearest store: {} at {:.2}", nearest.name, nearest.distance);
        assert_eq!(nearest.name, "Walmart Neighborhood C");
    }

    #[test]
    fn test_catalog_union_reports_unknown_items() {
        let mut groups = CatalogGroupsWasm::new();
        assert!(groups.make_set("milk"));
        assert!(groups.make_set("cheese"));

        assert_eq!(groups.union("milk", "cheese"), Some(true));
        assert_eq!(groups.union("cheese", "milk"), Some(false));
        assert_eq!(groups.union("milk", "ghost"), None);

        assert!(groups.remove("cheese"));
        assert_eq!(groups.union("milk", "cheese"), None);
    }

    /// Failed calls leave every structure usable.
    #[test]
    fn test_failures_do_not_corrupt() {
        let mut map = WeightedGraph::new();
        map.add_vertex("a").unwrap();
        map.add_vertex("b").unwrap();
        assert!(map.add_edge("a", "b", -1).is_err());
        assert!(map.add_edge("a", "c", 1).is_err());
        map.add_edge("a", "b", 1).unwrap();
        assert_eq!(map.shortest_path("a", "b").unwrap().distance, 1);

        let mut aisles = OrderedIndex::seeded(0);
        aisles.insert(1, "one").unwrap();
        assert!(aisles.insert(1, "uno").is_err());
        assert!(aisles.remove(2).is_err());
        assert_eq!(aisles.search(1), Some("one"));

        let mut stores = SpatialIndex::default();
        assert!(stores.insert(1000.0, 0.0, "far").is_err());
        stores.insert(0.0, 0.0, "near").unwrap();
        assert_eq!(stores.nearest(1.0, 1.0).unwrap().name, "near");
    }
}
