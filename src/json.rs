use serde::Serialize;
use serde_json::Value;

/// Sorts every object in the tree by key, in place. `serde_json::Map`
/// preserves insertion order, so rebuilding each map from a sorted key list
/// makes the rendered output independent of struct field order.
fn canonicalize(v: &mut Value) {
    match v {
        Value::Array(items) => {
            for item in items.iter_mut() {
                canonicalize(item);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            let mut sorted = serde_json::Map::with_capacity(keys.len());
            for k in keys {
                if let Some(mut inner) = map.remove(&k) {
                    canonicalize(&mut inner);
                    sorted.insert(k, inner);
                }
            }
            *map = sorted;
        }
        _ => {}
    }
}

/// Pretty JSON with recursively sorted object keys.
pub fn stable_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut v = serde_json::to_value(value)?;
    canonicalize(&mut v);
    serde_json::to_string_pretty(&v)
}
