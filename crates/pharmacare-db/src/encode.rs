//! Encoding of sale line items for the `sales.items_json` column.
//!
//! ```text
//! [{"medicine_id":"…","quantity":2,"unit_price_cents":550,"name":"Paracetamol 500mg"}]
//! ```

use pharmacare_core::SaleLineItem;

use crate::error::DbResult;

pub fn encode_items(items: &[SaleLineItem]) -> DbResult<String> {
    Ok(serde_json::to_string(items)?)
}

pub fn decode_items(json: &str) -> DbResult<Vec<SaleLineItem>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    #[test]
    fn test_items_survive_encoding() {
        let items = vec![
            SaleLineItem::new("med-1", 2, 550, "Paracetamol 500mg"),
            SaleLineItem::new("med-2", 1, 1275, "Amoxicillin \"250mg\" ✓"),
        ];

        let json = encode_items(&items).unwrap();
        assert!(json.contains("\"unit_price_cents\":550"));
        assert_eq!(decode_items(&json).unwrap(), items);
    }

    #[test]
    fn test_corrupt_blob_is_serialization_error() {
        assert!(matches!(
            decode_items("{not json"),
            Err(DbError::Serialization(_))
        ));
    }
}
