//! Abstract-type-to-SQL-type lookup tables.
//!
//! Each dialect owns one [`TypeMap`]: a priority-ordered association list
//! keyed by (abstract type, capacity threshold). Templates may contain the
//! placeholders `$size`, `$precision` and `$scale`.

use crate::column::DbType;
use crate::error::{GenerateError, Result};

#[derive(Debug, Clone)]
struct TypeEntry {
    db_type: DbType,
    max_size: Option<u32>,
    template: String,
}

/// Per-dialect mapping from abstract type + capacity to a SQL type string.
///
/// Immutable after construction by the dialect. Sized entries apply to
/// requests with `size <= max_size`; the smallest satisfying threshold wins,
/// and a later registration overrides an earlier one with the same key.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    entries: Vec<TypeEntry>,
}

impl TypeMap {
    /// Creates an empty type map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the base (unsized) template for a type.
    pub fn set_type(&mut self, db_type: DbType, template: impl Into<String>) {
        self.entries.push(TypeEntry {
            db_type,
            max_size: None,
            template: template.into(),
        });
    }

    /// Registers a template that applies up to the given capacity.
    pub fn set_type_with_size(&mut self, db_type: DbType, max_size: u32, template: impl Into<String>) {
        self.entries.push(TypeEntry {
            db_type,
            max_size: Some(max_size),
            template: template.into(),
        });
    }

    /// Resolves the SQL type string for the given type and capacity.
    pub fn get(
        &self,
        db_type: DbType,
        size: Option<u32>,
        precision: Option<u8>,
        scale: Option<u8>,
    ) -> Result<String> {
        let template = match size {
            Some(requested) => self.find_sized(db_type, requested),
            None => self.find_unsized(db_type),
        }
        .ok_or(GenerateError::UnmappedType { db_type, size })?;

        expand(template, size, precision, scale)
    }

    /// Smallest threshold that fits; later registrations win ties.
    fn find_sized(&self, db_type: DbType, requested: u32) -> Option<&str> {
        let mut best: Option<(u32, &str)> = None;
        for entry in &self.entries {
            if entry.db_type != db_type {
                continue;
            }
            let Some(max) = entry.max_size else { continue };
            if requested > max {
                continue;
            }
            if best.map_or(true, |(best_max, _)| max <= best_max) {
                best = Some((max, &entry.template));
            }
        }
        best.map(|(_, t)| t)
    }

    fn find_unsized(&self, db_type: DbType) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.db_type == db_type && e.max_size.is_none())
            .map(|e| e.template.as_str())
    }
}

/// Substitutes `$size`, `$precision` and `$scale` into a template.
fn expand(template: &str, size: Option<u32>, precision: Option<u8>, scale: Option<u8>) -> Result<String> {
    let mut out = template.to_string();
    for (placeholder, value) in [
        ("$size", size.map(u64::from)),
        ("$precision", precision.map(u64::from)),
        ("$scale", scale.map(u64::from)),
    ] {
        if out.contains(placeholder) {
            let value = value.ok_or_else(|| GenerateError::MissingCapacity {
                template: template.to_string(),
                placeholder: match placeholder {
                    "$size" => "$size",
                    "$precision" => "$precision",
                    _ => "$scale",
                },
            })?;
            out = out.replace(placeholder, &value.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TypeMap {
        let mut map = TypeMap::new();
        map.set_type(DbType::Int32, "INTEGER");
        map.set_type(DbType::String, "TEXT");
        map.set_type_with_size(DbType::String, 4000, "NVARCHAR($size)");
        map.set_type_with_size(DbType::String, u32::MAX, "NVARCHAR(MAX)");
        map.set_type(DbType::Decimal, "DECIMAL($precision,$scale)");
        map
    }

    #[test]
    fn test_unsized_lookup() {
        let map = sample_map();
        assert_eq!(map.get(DbType::Int32, None, None, None).unwrap(), "INTEGER");
        assert_eq!(map.get(DbType::String, None, None, None).unwrap(), "TEXT");
    }

    #[test]
    fn test_threshold_selects_smallest_fit() {
        let map = sample_map();
        assert_eq!(
            map.get(DbType::String, Some(255), None, None).unwrap(),
            "NVARCHAR(255)"
        );
        assert_eq!(
            map.get(DbType::String, Some(4000), None, None).unwrap(),
            "NVARCHAR(4000)"
        );
        assert_eq!(
            map.get(DbType::String, Some(4001), None, None).unwrap(),
            "NVARCHAR(MAX)"
        );
    }

    #[test]
    fn test_later_registration_overrides() {
        let mut map = sample_map();
        map.set_type_with_size(DbType::String, 4000, "VARCHAR($size)");
        assert_eq!(
            map.get(DbType::String, Some(100), None, None).unwrap(),
            "VARCHAR(100)"
        );
    }

    #[test]
    fn test_precision_and_scale() {
        let map = sample_map();
        assert_eq!(
            map.get(DbType::Decimal, None, Some(19), Some(4)).unwrap(),
            "DECIMAL(19,4)"
        );
    }

    #[test]
    fn test_unmapped_type_errors() {
        let map = sample_map();
        let err = map.get(DbType::Xml, None, None, None).unwrap_err();
        assert!(matches!(err, GenerateError::UnmappedType { .. }));
    }

    #[test]
    fn test_missing_capacity_errors() {
        let map = sample_map();
        let err = map.get(DbType::Decimal, None, None, None).unwrap_err();
        assert!(matches!(err, GenerateError::MissingCapacity { .. }));
    }
}
