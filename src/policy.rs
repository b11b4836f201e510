//! Low-stock alert policy.
//!
//! Pure functions over a snapshot of the collection. Callers re-evaluate after any
//! mutation; nothing here is cached or pushed.

use crate::material::Material;

/// True when `quantity` has fallen to or below `minimum_quantity`.
pub fn is_low_stock(quantity: i64, minimum_quantity: i64) -> bool {
    quantity <= minimum_quantity
}

/// Materials currently at or below their threshold, in input order.
pub fn low_stock(materials: &[Material]) -> Vec<Material> {
    materials.iter().filter(|m| m.is_low_stock()).cloned().collect()
}

/// Number of materials that [`low_stock`] would return.
pub fn low_stock_count(materials: &[Material]) -> usize {
    materials.iter().filter(|m| m.is_low_stock()).count()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::material::MaterialDraft;

    fn material(name: &str, quantity: i64, minimum_quantity: i64) -> Material {
        Material::from_draft(
            Uuid::new_v4(),
            MaterialDraft {
                name: name.to_string(),
                quantity,
                minimum_quantity,
                ..MaterialDraft::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(is_low_stock(0, 0));
        assert!(is_low_stock(3, 3));
        assert!(is_low_stock(2, 3));
        assert!(!is_low_stock(4, 3));
    }

    #[test]
    fn filter_keeps_order_and_count_agrees() {
        let all = vec![
            material("Cable", 1, 5),
            material("Drill", 9, 2),
            material("Screws", 2, 2),
        ];
        let low: Vec<String> = low_stock(&all).into_iter().map(|m| m.name).collect();
        assert_eq!(low, vec!["Cable", "Screws"]);
        assert_eq!(low_stock_count(&all), 2);
        assert!(low_stock(&[]).is_empty());
    }
}
