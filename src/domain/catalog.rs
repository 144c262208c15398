use std::collections::HashMap;

use bigdecimal::BigDecimal;

/// Read model of a product as the pricing engine sees it. Carries only the
/// fields that influence totals, not the full catalog row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub categoria: String,
    pub preco: BigDecimal,
}

/// Catalog lookup port. The engine resolves every line item through this
/// trait so callers decide where products come from (a database read, a
/// prefetched map, a test fixture).
pub trait ProductLookup {
    fn find_by_id(&self, produto_id: i32) -> Option<&ProductSnapshot>;
}

impl ProductLookup for HashMap<i32, ProductSnapshot> {
    fn find_by_id(&self, produto_id: i32) -> Option<&ProductSnapshot> {
        self.get(&produto_id)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn hash_map_resolves_known_ids_only() {
        let mut catalog = HashMap::new();
        catalog.insert(
            7,
            ProductSnapshot {
                categoria: "Pizza".to_string(),
                preco: BigDecimal::from_str("39.90").unwrap(),
            },
        );

        assert!(catalog.find_by_id(7).is_some());
        assert!(catalog.find_by_id(8).is_none());
    }
}
