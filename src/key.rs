/// A key identified by `name` and an integer cosine-latitude factor order.
///
/// Used as a map and set key when grouping spherical-harmonic terms by the
/// power of the cosine-latitude factor they carry. Ordering is lexicographic
/// by `(name, factor_order)`:
///
/// ```
/// use cirrus_core::KeyWithCosLatFactor;
///
/// let a1 = KeyWithCosLatFactor::new("a", 1);
/// let a2 = KeyWithCosLatFactor::new("a", 2);
/// let b0 = KeyWithCosLatFactor::new("b", 0);
/// assert!(a1 < a2 && a2 < b0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyWithCosLatFactor {
    pub name: String,
    pub factor_order: i64,
}

impl KeyWithCosLatFactor {
    pub fn new(name: impl Into<String>, factor_order: i64) -> Self {
        Self {
            name: name.into(),
            factor_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cmp::Ordering,
        collections::{BTreeSet, HashMap},
    };

    use super::*;

    #[test]
    fn orders_lexicographically() {
        let a1 = KeyWithCosLatFactor::new("a", 1);
        let a2 = KeyWithCosLatFactor::new("a", 2);
        let b0 = KeyWithCosLatFactor::new("b", 0);

        assert!(a1 < a2);
        assert!(a2 < b0);
        assert_eq!(a1.cmp(&a1), Ordering::Equal);
    }

    #[test]
    fn equal_keys_collapse_in_sets() {
        let set: BTreeSet<_> = [
            KeyWithCosLatFactor::new("b", 0),
            KeyWithCosLatFactor::new("a", 2),
            KeyWithCosLatFactor::new("a", 1),
            KeyWithCosLatFactor::new("a", 1),
        ]
        .into_iter()
        .collect();

        let sorted: Vec<_> = set.into_iter().collect();
        assert_eq!(
            sorted,
            vec![
                KeyWithCosLatFactor::new("a", 1),
                KeyWithCosLatFactor::new("a", 2),
                KeyWithCosLatFactor::new("b", 0),
            ]
        );
    }

    #[test]
    fn usable_as_hash_map_key() {
        let mut factors = HashMap::new();
        factors.insert(KeyWithCosLatFactor::new("u", 1), 0.5);
        assert_eq!(factors.get(&KeyWithCosLatFactor::new("u", 1)), Some(&0.5));
        assert_eq!(factors.get(&KeyWithCosLatFactor::new("u", 2)), None);
    }
}
