use std::fmt;

use thiserror::Error;

use crate::material::MaterialDraft;

/// Material field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `name`.
    Name,
    /// `quantity`.
    Quantity,
    /// `minimumQuantity`.
    MinimumQuantity,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Quantity => "quantity",
            Self::MinimumQuantity => "minimumQuantity",
        })
    }
}

/// One rejected field and the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Offending field.
    pub field: Field,
    /// Human-readable rule.
    pub reason: &'static str,
}

/// Caller-correctable rejection of one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid material: {}", render(.violations))]
pub struct ValidationError {
    /// Every violation found, in field order.
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// True when `field` is among the violations.
    pub fn cites(&self, field: Field) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Offending fields in report order.
    pub fn fields(&self) -> Vec<Field> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

fn render(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: Field, reason: &'static str) {
        self.0.push(FieldViolation { field, reason });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

fn check_store_rules(draft: &MaterialDraft, out: &mut Violations) {
    if draft.name.trim().is_empty() {
        out.push(Field::Name, "must not be empty");
    }
    if draft.quantity < 0 {
        out.push(Field::Quantity, "must not be negative");
    }
    if draft.minimum_quantity < 0 {
        out.push(Field::MinimumQuantity, "must not be negative");
    }
}

/// Rules the store enforces on create and update.
///
/// The minimum is deliberately not compared against the quantity here: stock falling
/// below the minimum is what raises the low-stock alert.
pub fn validate_draft_fields(draft: &MaterialDraft) -> Result<(), ValidationError> {
    let mut out = Violations::default();
    check_store_rules(draft, &mut out);
    out.finish()
}

/// Rule for direct quantity writes.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    let mut out = Violations::default();
    if quantity < 0 {
        out.push(Field::Quantity, "must not be negative");
    }
    out.finish()
}

/// Edit-time guard for forms: store rules plus `minimumQuantity <= quantity`.
///
/// Never applied by the store itself.
pub fn validate_form(draft: &MaterialDraft) -> Result<(), ValidationError> {
    let mut out = Violations::default();
    check_store_rules(draft, &mut out);
    let minimum_ok = !out.0.iter().any(|v| v.field == Field::MinimumQuantity);
    if minimum_ok && draft.quantity >= 0 && draft.minimum_quantity > draft.quantity {
        out.push(Field::MinimumQuantity, "must not exceed the current quantity");
    }
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, quantity: i64, minimum_quantity: i64) -> MaterialDraft {
        MaterialDraft {
            name: name.to_string(),
            quantity,
            minimum_quantity,
            ..MaterialDraft::default()
        }
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let err = validate_draft_fields(&draft("   \t", 1, 1)).unwrap_err();
        assert_eq!(err.fields(), vec![Field::Name]);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let err = validate_draft_fields(&draft("", -1, -2)).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![Field::Name, Field::Quantity, Field::MinimumQuantity]
        );
        assert_eq!(
            err.to_string(),
            "invalid material: name: must not be empty; quantity: must not be negative; minimumQuantity: must not be negative"
        );
    }

    #[test]
    fn store_rules_allow_minimum_above_quantity() {
        assert!(validate_draft_fields(&draft("Paper", 5, 10)).is_ok());
    }

    #[test]
    fn form_rejects_minimum_above_quantity() {
        let err = validate_form(&draft("Paper", 5, 10)).unwrap_err();
        assert!(err.cites(Field::MinimumQuantity));
        assert!(validate_form(&draft("Paper", 10, 10)).is_ok());
    }

    #[test]
    fn negative_quantity_write_is_rejected() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(-1).unwrap_err().cites(Field::Quantity));
    }
}
