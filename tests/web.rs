//! Browser-side tests for the wasm-bindgen facade.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use goshop_wasm::{AisleIndexWasm, CatalogGroupsWasm, StoreLocatorWasm, StoreMapWasm};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn property(target: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_store_map_route() {
    let mut map = StoreMapWasm::new();
    for label in ["Entrance", "Dairy", "Produce", "Checkout"] {
        assert!(map.add_vertex(label));
    }
    assert!(!map.add_vertex("Dairy"));
    assert!(map.add_edge("Entrance", "Dairy", 10));
    assert!(map.add_edge("Dairy", "Produce", 5));
    assert!(map.add_edge("Produce", "Checkout", 5));
    assert!(!map.add_edge("Entrance", "Checkout", -3));

    let route = map.shortest_path("Entrance", "Checkout").unwrap();
    assert_eq!(property(&route, "distance").as_f64(), Some(20.0));
    let path = js_sys::Array::from(&property(&route, "path"));
    assert_eq!(path.length(), 4);

    assert!(map.shortest_path("Entrance", "Bakery").is_err());
}

#[wasm_bindgen_test]
fn test_aisle_index_seeded() {
    let mut aisles = AisleIndexWasm::new(Some(7));
    assert!(aisles.insert(5, "Produce"));
    assert!(aisles.insert(3, "Dairy"));
    assert!(!aisles.insert(3, "Bakery"));
    assert_eq!(aisles.search(3).as_deref(), Some("Dairy"));
    assert!(aisles.remove(5));
    assert_eq!(aisles.len(), 1);

    let entries = js_sys::Array::from(&aisles.entries().unwrap());
    assert_eq!(entries.length(), 1);
}

#[wasm_bindgen_test]
fn test_aisle_index_rejects_bad_config() {
    let config = js_sys::Object::new();
    js_sys::Reflect::set(
        &config,
        &JsValue::from_str("promotionProbability"),
        &JsValue::from_f64(1.5),
    )
    .unwrap();
    assert!(AisleIndexWasm::with_config(config.into(), Some(1)).is_err());
}

#[wasm_bindgen_test]
fn test_catalog_groups() {
    let mut groups = CatalogGroupsWasm::new();
    for item in ["milk", "cheese", "bread"] {
        assert!(groups.make_set(item));
    }
    assert_eq!(groups.union("milk", "cheese"), Some(true));
    assert_eq!(groups.union("cheese", "milk"), Some(false));
    assert_eq!(groups.union("milk", "ghost"), None);
    assert!(groups.rename("milk", "whole milk"));
    assert_eq!(groups.find("whole milk"), groups.find("cheese"));
    assert!(groups.find("milk").is_none());

    let listing = groups.groups().unwrap();
    assert_eq!(js_sys::Object::keys(&listing.into()).length(), 2);
}

#[wasm_bindgen_test]
fn test_store_locator_nearest() {
    let mut stores = StoreLocatorWasm::new();
    assert!(stores.insert(10.0, 20.0, "Walmart Supercenter A"));
    assert!(stores.insert(-15.0, 5.0, "Walmart Supercenter B"));
    assert!(stores.insert(5.0, -10.0, "Walmart Neighborhood C"));
    assert!(!stores.insert(500.0, 0.0, "Far Away"));

    let nearest = stores.nearest(0.0, 0.0).unwrap();
    assert_eq!(
        property(&nearest, "name").as_string().as_deref(),
        Some("Walmart Neighborhood C")
    );

    assert!(stores.remove_by_name("Walmart Neighborhood C"));
    let nearest = stores.nearest(0.0, 0.0).unwrap();
    assert_eq!(
        property(&nearest, "name").as_string().as_deref(),
        Some("Walmart Supercenter B")
    );
}
