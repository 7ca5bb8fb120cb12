// ============================================================
// Layer 4 — Categorical Encoder
// ============================================================
// Replaces text categories with dense integer codes.
//
//   ["Москва", "Казань", "Москва"]
//        │ fit: distinct values, sorted
//        ▼
//   { "Казань": 0, "Москва": 1 }
//        │ encode
//        ▼
//   [1, 0, 1]
//
// A CategoryEncoder lives for exactly one chain run and holds
// one independent CategoryCodeMap per encoded column. Nothing
// is global and nothing is reused between runs.
//
// Codes come from the sorted order of the values seen in this
// run, so the same input always gives the same codes. A
// different input (a new city, a missing one) shifts them, so
// codes are not comparable across datasets.

use std::collections::BTreeMap;

use crate::domain::table::ColumnData;

/// Dense mapping from observed category → code, starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCodeMap {
    codes: BTreeMap<String, u32>,
}

impl CategoryCodeMap {
    /// Build the map from every value of one column.
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: std::collections::BTreeSet<&str> = values.into_iter().collect();
        let codes = distinct
            .into_iter()
            .zip(0u32..)
            .map(|(value, code)| (value.to_string(), code))
            .collect();
        Self { codes }
    }

    pub fn code(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

}

/// Per-run encoder; one code map per encoded column.
#[derive(Debug, Default)]
pub struct CategoryEncoder {
    maps: Vec<(String, CategoryCodeMap)>,
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit a fresh map on `data` and return the encoded column.
    /// Numeric columns are encoded through their text form.
    pub fn encode_column(&mut self, name: &str, data: &ColumnData) -> ColumnData {
        let cells = data.texts();
        let map   = CategoryCodeMap::fit(cells.iter().map(|c| &**c));

        let codes = cells
            .iter()
            .map(|c| map.code(c).unwrap_or_default())
            .collect();

        self.maps.retain(|(n, _)| n != name);
        self.maps.push((name.to_string(), map));
        ColumnData::Category(codes)
    }

    /// The map fitted for `column` during this run, if any.
    pub fn map_for(&self, column: &str) -> Option<&CategoryCodeMap> {
        self.maps.iter().find(|(n, _)| n == column).map(|(_, m)| m)
    }

    pub fn encoded_columns(&self) -> impl Iterator<Item = &str> {
        self.maps.iter().map(|(n, _)| n.as_str())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> ColumnData {
        ColumnData::Text(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_codes_are_dense_from_zero() {
        let map = CategoryCodeMap::fit(["b", "a", "c", "a"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.code("a"), Some(0));
        assert_eq!(map.code("b"), Some(1));
        assert_eq!(map.code("c"), Some(2));
        assert_eq!(map.code("zzz"), None);
    }

    #[test]
    fn test_encode_column_replaces_values() {
        let mut enc = CategoryEncoder::new();
        let out     = enc.encode_column("city", &text(&["Москва", "Казань", "Москва"]));
        assert_eq!(out, ColumnData::Category(vec![1, 0, 1]));
        assert_eq!(enc.map_for("city").unwrap().len(), 2);
    }

    #[test]
    fn test_maps_are_independent_per_column() {
        let mut enc = CategoryEncoder::new();
        enc.encode_column("a", &text(&["x", "y"]));
        enc.encode_column("b", &text(&["y"]));
        assert_eq!(enc.map_for("a").unwrap().code("y"), Some(1));
        assert_eq!(enc.map_for("b").unwrap().code("y"), Some(0));
        assert_eq!(enc.encoded_columns().count(), 2);
    }

    #[test]
    fn test_same_input_gives_same_codes() {
        let data  = text(&["полная занятость", "частичная занятость", "полная занятость"]);
        let first = CategoryEncoder::new().encode_column("занятость", &data);
        let again = CategoryEncoder::new().encode_column("занятость", &data);
        assert_eq!(first, again);
    }

    #[test]
    fn test_numeric_column_encoded_by_text() {
        let mut enc = CategoryEncoder::new();
        let out     = enc.encode_column("n", &ColumnData::Int(vec![10, 2, 10]));
        // "10" < "2" in text order
        assert_eq!(out, ColumnData::Category(vec![0, 1, 0]));
    }
}
