//! Walking and editing a JSON document by path.
//!
//! Reads never create anything and report a missing segment as `None`.
//! Writes create an empty object at every missing intermediate segment and
//! replace scalar intermediates with an object. Existing arrays are indexed
//! by numeric segments; an index equal to the array length appends.

use std::fmt;

use serde_json::{Map, Number, Value as JsonValue};

use crate::{Path, PathError, Result};

/// The root of a store: always a JSON object.
pub type Document = Map<String, JsonValue>;

fn empty_object() -> JsonValue {
    JsonValue::Object(Map::new())
}

fn child<'tree>(value: &'tree JsonValue, component: &str) -> Option<&'tree JsonValue> {
    match value {
        JsonValue::Object(map) => map.get(component),
        JsonValue::Array(arr) => component.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}

fn child_mut<'tree>(value: &'tree mut JsonValue, component: &str) -> Option<&'tree mut JsonValue> {
    match value {
        JsonValue::Object(map) => map.get_mut(component),
        JsonValue::Array(arr) => component
            .parse::<usize>()
            .ok()
            .and_then(move |i| arr.get_mut(i)),
        _ => None,
    }
}

fn walk<'tree>(doc: &'tree Document, components: &[String]) -> Option<&'tree JsonValue> {
    let (first, rest) = components.split_first()?;
    rest.iter()
        .try_fold(doc.get(first)?, |cursor, component| child(cursor, component))
}

fn walk_mut<'tree>(
    doc: &'tree mut Document,
    components: &[String],
) -> Option<&'tree mut JsonValue> {
    let (first, rest) = components.split_first()?;
    let mut cursor = doc.get_mut(first)?;
    for component in rest {
        cursor = child_mut(cursor, component)?;
    }
    Some(cursor)
}

/// Look up the value at `path`.
pub fn get_path<'tree>(doc: &'tree Document, path: &Path) -> Option<&'tree JsonValue> {
    walk(doc, &path.components)
}

/// Look up the value at `path` for in-place editing.
pub fn get_path_mut<'tree>(doc: &'tree mut Document, path: &Path) -> Option<&'tree mut JsonValue> {
    walk_mut(doc, &path.components)
}

/// Whether `path` resolves to a value, `null` included.
pub fn has_path(doc: &Document, path: &Path) -> bool {
    get_path(doc, path).is_some()
}

fn array_index(component: &str, len: usize, position: usize) -> Result<usize, PathError> {
    let index = component
        .parse::<usize>()
        .map_err(|e| PathError::InvalidComponent {
            component: component.to_string(),
            position,
            message: format!("expected array index, got: {}", e),
        })?;

    if index > len {
        return Err(PathError::InvalidComponent {
            component: component.to_string(),
            position,
            message: format!("array index {} out of bounds (len={})", index, len),
        });
    }
    Ok(index)
}

fn descend_or_create<'tree>(
    cursor: &'tree mut JsonValue,
    component: &str,
    position: usize,
) -> Result<&'tree mut JsonValue, PathError> {
    match cursor {
        JsonValue::Object(map) => Ok(map
            .entry(component.to_string())
            .or_insert_with(empty_object)),
        JsonValue::Array(arr) => {
            let index = array_index(component, arr.len(), position)?;
            if index == arr.len() {
                arr.push(empty_object());
            }
            Ok(&mut arr[index])
        }
        scalar => {
            *scalar = empty_object();
            descend_or_create(scalar, component, position)
        }
    }
}

fn assign(
    parent: &mut JsonValue,
    key: &str,
    value: JsonValue,
    position: usize,
) -> Result<(), PathError> {
    match parent {
        JsonValue::Object(map) => {
            map.insert(key.to_string(), value);
        }
        JsonValue::Array(arr) => {
            let index = array_index(key, arr.len(), position)?;
            if index == arr.len() {
                arr.push(value);
            } else {
                arr[index] = value;
            }
        }
        scalar => {
            let mut map = Map::new();
            map.insert(key.to_string(), value);
            *scalar = JsonValue::Object(map);
        }
    }
    Ok(())
}

/// Set `value` at `path`, creating intermediate objects as needed.
///
/// An error can only come from indexing a pre-existing array, and every
/// segment above that array already existed, so a failed call leaves `doc`
/// unchanged.
pub fn set_path(doc: &mut Document, path: &Path, value: JsonValue) -> Result<()> {
    let (last, parents) = path.split_last().ok_or_else(|| PathError::InvalidPath {
        message: "key must contain at least one segment".to_string(),
    })?;

    let Some((first, rest)) = parents.split_first() else {
        doc.insert(last.clone(), value);
        return Ok(());
    };

    let mut cursor = doc.entry(first.clone()).or_insert_with(empty_object);
    for (offset, component) in rest.iter().enumerate() {
        cursor = descend_or_create(cursor, component, offset + 1)?;
    }
    assign(cursor, last, value, parents.len())?;
    Ok(())
}

/// Remove and return the value at `path`.
///
/// An array element is replaced by `null`, so later elements keep their
/// indices.
pub fn remove_path(doc: &mut Document, path: &Path) -> Option<JsonValue> {
    let (last, parents) = path.split_last()?;
    if parents.is_empty() {
        return doc.shift_remove(last);
    }

    match walk_mut(doc, parents)? {
        JsonValue::Object(map) => map.shift_remove(last),
        JsonValue::Array(arr) => {
            let index = last.parse::<usize>().ok()?;
            let slot = arr.get_mut(index)?;
            Some(std::mem::replace(slot, JsonValue::Null))
        }
        _ => None,
    }
}

/// Truthiness as the store's validation rules see it: `null`, `false`, `0`
/// and `""` are falsy; arrays and objects are truthy even when empty.
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Coerce an amount to an integer.
///
/// Numbers are truncated toward zero. Strings are read like `parseInt`:
/// leading whitespace, an optional sign, then as many decimal digits as
/// follow, or hex digits after a `0x` prefix. A digit run that does not fit
/// `i64` yields `None`, as does anything else.
pub fn coerce_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        JsonValue::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (digits, radix) = match unsigned.get(..2) {
        Some("0x" | "0X") => (&unsigned[2..], 16),
        _ => (unsigned, 10),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Equality as `pull` matches elements: numbers compare by value, so `1`
/// and `1.0` are equal, and containers compare element by element.
pub fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (JsonValue::Array(xs), JsonValue::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Add `amount` to `current`, staying integral while the result fits `i64`.
pub fn offset_number(current: &Number, amount: i64) -> Option<Number> {
    if let Some(sum) = current.as_i64().and_then(|c| c.checked_add(amount)) {
        return Some(Number::from(sum));
    }
    Number::from_f64(current.as_f64()? + amount as f64)
}

/// The kind of value found at a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Array,
    Object,
    String,
    Number,
    Boolean,
    Undefined,
}

impl TypeTag {
    /// Classify a lookup result. `null` reports as `Object`.
    pub fn of(value: Option<&JsonValue>) -> Self {
        match value {
            None => TypeTag::Undefined,
            Some(JsonValue::Array(_)) => TypeTag::Array,
            Some(JsonValue::Object(_) | JsonValue::Null) => TypeTag::Object,
            Some(JsonValue::String(_)) => TypeTag::String,
            Some(JsonValue::Number(_)) => TypeTag::Number,
            Some(JsonValue::Bool(_)) => TypeTag::Boolean,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, Error};
    use serde_json::json;

    fn doc(value: JsonValue) -> Document {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("fixture must be an object, got {}", other),
        }
    }

    fn test_tree() -> Document {
        doc(json!({
            "name": "Alice",
            "age": 30,
            "address": { "city": "NYC" },
            "scores": [90, 85, 95],
            "friends": [{ "id": 1, "name": "Bob" }],
            "nothing": null,
        }))
    }

    // ==================== get_path tests ====================

    #[test]
    fn get_direct_child() {
        let tree = test_tree();
        assert_eq!(get_path(&tree, &path!("name")), Some(&json!("Alice")));
    }

    #[test]
    fn get_nested() {
        let tree = test_tree();
        assert_eq!(get_path(&tree, &path!("address.city")), Some(&json!("NYC")));
    }

    #[test]
    fn get_through_arrays() {
        let tree = test_tree();
        assert_eq!(get_path(&tree, &path!("scores.1")), Some(&json!(85)));
        assert_eq!(get_path(&tree, &path!("scores[2]")), Some(&json!(95)));
        assert_eq!(
            get_path(&tree, &path!("friends[0].name")),
            Some(&json!("Bob"))
        );
        assert_eq!(get_path(&tree, &path!("scores.7")), None);
        assert_eq!(get_path(&tree, &path!("scores.first")), None);
    }

    #[test]
    fn get_missing_segments() {
        let tree = test_tree();
        assert_eq!(get_path(&tree, &path!("missing")), None);
        assert_eq!(get_path(&tree, &path!("address.zip")), None);
        assert_eq!(get_path(&tree, &path!("name.first")), None);
        assert_eq!(get_path(&tree, &path!("missing.deeper.still")), None);
    }

    #[test]
    fn has_counts_null() {
        let tree = test_tree();
        assert!(has_path(&tree, &path!("nothing")));
        assert!(!has_path(&tree, &path!("nothing.below")));
    }

    // ==================== set_path tests ====================

    #[test]
    fn set_creates_intermediates() {
        let mut tree = Document::new();
        set_path(&mut tree, &path!("a.b.c"), json!(1)).unwrap();
        assert_eq!(JsonValue::Object(tree), json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn set_keeps_siblings() {
        let mut tree = test_tree();
        set_path(&mut tree, &path!("address.zip"), json!("10001")).unwrap();
        assert_eq!(get_path(&tree, &path!("address.city")), Some(&json!("NYC")));
        assert_eq!(
            get_path(&tree, &path!("address.zip")),
            Some(&json!("10001"))
        );
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut tree = test_tree();
        set_path(&mut tree, &path!("name.first"), json!("Alice")).unwrap();
        assert_eq!(
            get_path(&tree, &path!("name")),
            Some(&json!({ "first": "Alice" }))
        );
    }

    #[test]
    fn set_into_arrays() {
        let mut tree = test_tree();
        set_path(&mut tree, &path!("scores.0"), json!(100)).unwrap();
        set_path(&mut tree, &path!("scores[3]"), json!(70)).unwrap();
        set_path(&mut tree, &path!("friends.0.name"), json!("Robert")).unwrap();
        set_path(&mut tree, &path!("friends.1.name"), json!("Carol")).unwrap();
        assert_eq!(
            get_path(&tree, &path!("scores")),
            Some(&json!([100, 85, 95, 70]))
        );
        assert_eq!(
            get_path(&tree, &path!("friends")),
            Some(&json!([{ "id": 1, "name": "Robert" }, { "name": "Carol" }]))
        );
    }

    #[test]
    fn set_rejects_bad_array_index_without_mutation() {
        let mut tree = test_tree();
        let before = tree.clone();
        assert!(matches!(
            set_path(&mut tree, &path!("scores.9"), json!(1)),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(
            set_path(&mut tree, &path!("scores.top.value"), json!(1)),
            Err(Error::InvalidKey(_))
        ));
        assert_eq!(tree, before);
    }

    // ==================== remove_path tests ====================

    #[test]
    fn remove_top_level_and_nested() {
        let mut tree = test_tree();
        assert_eq!(remove_path(&mut tree, &path!("age")), Some(json!(30)));
        assert_eq!(
            remove_path(&mut tree, &path!("address.city")),
            Some(json!("NYC"))
        );
        assert_eq!(get_path(&tree, &path!("address")), Some(&json!({})));
        assert_eq!(remove_path(&mut tree, &path!("age")), None);
    }

    #[test]
    fn remove_array_element_leaves_null() {
        let mut tree = test_tree();
        assert_eq!(remove_path(&mut tree, &path!("scores.0")), Some(json!(90)));
        assert_eq!(
            get_path(&tree, &path!("scores")),
            Some(&json!([null, 85, 95]))
        );
        assert_eq!(get_path(&tree, &path!("scores.1")), Some(&json!(85)));
        assert_eq!(remove_path(&mut tree, &path!("scores.5")), None);
    }

    #[test]
    fn remove_preserves_key_order() {
        let mut tree = doc(json!({ "a": 1, "b": 2, "c": 3 }));
        remove_path(&mut tree, &path!("a"));
        let keys: Vec<&String> = tree.keys().collect();
        assert_eq!(keys, ["b", "c"]);
    }

    // ==================== truthiness & coercion ====================

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }

    #[test]
    fn coerce_numbers() {
        assert_eq!(coerce_integer(&json!(5)), Some(5));
        assert_eq!(coerce_integer(&json!(-3)), Some(-3));
        assert_eq!(coerce_integer(&json!(2.9)), Some(2));
        assert_eq!(coerce_integer(&json!(-2.9)), Some(-2));
    }

    #[test]
    fn coerce_strings_like_parse_int() {
        assert_eq!(coerce_integer(&json!("42")), Some(42));
        assert_eq!(coerce_integer(&json!("  -7 apples")), Some(-7));
        assert_eq!(coerce_integer(&json!("+3.5")), Some(3));
        assert_eq!(coerce_integer(&json!("abc")), None);
        assert_eq!(coerce_integer(&json!("")), None);
        assert_eq!(coerce_integer(&json!("-")), None);
    }

    #[test]
    fn coerce_hex_and_overflow() {
        assert_eq!(coerce_integer(&json!("0x1A")), Some(26));
        assert_eq!(coerce_integer(&json!(" -0Xff")), Some(-255));
        assert_eq!(coerce_integer(&json!("0x1g")), Some(1));
        assert_eq!(coerce_integer(&json!("0x")), None);
        assert_eq!(coerce_integer(&json!("99999999999999999999")), None);
    }

    #[test]
    fn coerce_other_types() {
        assert_eq!(coerce_integer(&json!(null)), None);
        assert_eq!(coerce_integer(&json!(true)), None);
        assert_eq!(coerce_integer(&json!([1])), None);
    }

    #[test]
    fn offset_stays_integral() {
        assert_eq!(offset_number(&Number::from(10), 5), Some(Number::from(15)));
        assert_eq!(offset_number(&Number::from(10), -13), Some(Number::from(-3)));
        let overflowed = offset_number(&Number::from(i64::MAX), 1).unwrap();
        assert!(overflowed.is_f64());
        let float = offset_number(&Number::from_f64(1.5).unwrap(), 1).unwrap();
        assert_eq!(float.as_f64(), Some(2.5));
    }

    #[test]
    fn json_eq_compares_numbers_by_value() {
        assert!(json_eq(&json!(1.0), &json!(1)));
        assert!(json_eq(&json!([1, { "id": 2.0 }]), &json!([1.0, { "id": 2 }])));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(!json_eq(&json!({ "a": 1 }), &json!({ "a": 1, "b": 2 })));
        assert!(!json_eq(&json!(i64::MAX), &json!(i64::MAX - 1)));
    }

    #[test]
    fn type_tags() {
        let tree = test_tree();
        let tag = |key: &str| TypeTag::of(get_path(&tree, &path!(key)));
        assert_eq!(tag("scores"), TypeTag::Array);
        assert_eq!(tag("address"), TypeTag::Object);
        assert_eq!(tag("nothing"), TypeTag::Object);
        assert_eq!(tag("name"), TypeTag::String);
        assert_eq!(tag("age"), TypeTag::Number);
        assert_eq!(tag("missing"), TypeTag::Undefined);
        assert_eq!(TypeTag::Boolean.to_string(), "boolean");
    }
}
