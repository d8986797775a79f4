use serde::{Deserialize, Serialize};

/// One flat addressable record from a data table.
///
/// `path` is a `/`-separated sequence of segments; a segment may carry a
/// trailing `[n]` array index that distinguishes repeated siblings
/// (`/order/item[0]/price`). The index is part of the address, not of the
/// display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPath {
    pub id: String,
    pub path: String,
    pub value: String,
}

impl RecordPath {
    pub fn new(id: impl Into<String>, path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_data_source_shape() {
        let json = r#"[
            {"id": "1", "path": "/order/item[0]/price", "value": "12.50"},
            {"id": "2", "path": "/order/item[1]/price", "value": "3.99"}
        ]"#;

        let records: Vec<RecordPath> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "/order/item[0]/price");
        assert_eq!(records[1].value, "3.99");
    }
}
