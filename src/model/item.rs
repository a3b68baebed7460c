use crate::codec::{self, CodecError};
use crate::model::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog entry.
///
/// `id` is always `codec::encode(name.to_lowercase())`; two entries whose names differ
/// only in case therefore share an id. JSON input may omit `id`, `desc` and `qty`; the
/// item service fills in the id before storing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub qty: u64,
}

impl Item {
    pub fn new(name: &str, desc: &str, qty: u64) -> Result<Self, CodecError> {
        let mut item = Self {
            id: String::new(),
            name: name.to_string(),
            desc: desc.to_string(),
            qty,
        };
        item.assign_id()?;
        Ok(item)
    }

    /// The id this entry must carry, derived from its name.
    pub fn derived_id(&self) -> Result<String, CodecError> {
        codec::encode(&self.name.to_lowercase())
    }

    /// Overwrites `id` with the derived id.
    pub fn assign_id(&mut self) -> Result<(), CodecError> {
        self.id = self.derived_id()?;
        Ok(())
    }

    pub fn has_consistent_id(&self) -> bool {
        matches!(self.derived_id(), Ok(id) if id == self.id)
    }

    /// Storage fields for the entry's hash. The id is the key, not a field.
    pub fn to_fields(&self) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), self.name.clone()),
            ("desc".to_string(), self.desc.clone()),
            ("qty".to_string(), self.qty.to_string()),
        ])
    }

    pub fn from_fields(id: &str, mut fields: HashMap<String, String>) -> Result<Self, ParseError> {
        let name = fields.remove("name").ok_or_else(|| ParseError::MissingField {
            key: id.to_string(),
            field: "name",
        })?;
        let qty = match fields.remove("qty") {
            Some(raw) => raw.parse().map_err(|_| ParseError::Quantity {
                field: "qty".to_string(),
                value: raw,
            })?,
            None => 0,
        };
        Ok(Self {
            id: id.to_string(),
            name,
            desc: fields.remove("desc").unwrap_or_default(),
            qty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_id_from_lowercase_name() {
        let item = Item::new("Widget", "a widget", 5).unwrap();
        assert_eq!(item.id, codec::encode("widget").unwrap());
        assert_eq!(item.name, "Widget");
        assert!(item.has_consistent_id());
    }

    #[test]
    fn test_inconsistent_id_detected() {
        let mut item = Item::new("widget", "", 1).unwrap();
        item.id = "abcdefgh".into();
        assert!(!item.has_consistent_id());
    }

    #[test]
    fn test_fields_roundtrip() {
        let item = Item::new("gizmo", "", 0).unwrap();
        let fields = item.to_fields();
        assert_eq!(fields["qty"], "0");
        assert_eq!(fields["desc"], "");
        assert_eq!(Item::from_fields(&item.id, fields).unwrap(), item);
    }

    #[test]
    fn test_from_fields_rejects_bad_qty() {
        let fields = HashMap::from([
            ("name".to_string(), "gizmo".to_string()),
            ("qty".to_string(), "-1".to_string()),
        ]);
        assert!(matches!(
            Item::from_fields("x", fields),
            Err(ParseError::Quantity { .. })
        ));
    }

    #[test]
    fn test_json_defaults() {
        let item: Item = serde_json::from_str(r#"{"name":"gizmo"}"#).unwrap();
        assert_eq!(item.id, "");
        assert_eq!(item.qty, 0);
    }
}
