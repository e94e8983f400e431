//! Identifier classification
//!
//! Fields that hold opaque identifiers are modelled as wrapper types from the
//! generated `Ids` module rather than raw strings, so an `Order` id cannot be
//! passed where a `User` id is expected.
//!
//! Rules, in priority order:
//! 1. an explicit `(forwardextensions.id_type_override)` names the type
//!    (an empty override disables detection),
//! 2. a `_id` suffix: `user_id` is a `User`,
//! 3. an `_ids` suffix: `tag_ids` is a `Tag` (cardinality is handled by the
//!    field classifier),
//! 4. a field named `id` takes the enclosing message's name.

use crate::names::identifier_type_name;
use crate::GeneratorError;

const ID_SUFFIX: &str = "_id";
const IDS_SUFFIX: &str = "_ids";
const ID_FIELD: &str = "id";

/// Decide whether a field is an identifier and, if so, of which type
///
/// `context` is the local name of the message the field is declared in, or
/// `None` for detached fields (oneof members, proto3 optionals, map entries).
/// `qualified_field` is only used for error reporting.
pub fn classify(
    field_name: &str,
    id_override: Option<&str>,
    context: Option<&str>,
    qualified_field: &str,
) -> Result<Option<String>, GeneratorError> {
    let base = if let Some(id_type) = id_override {
        id_type
    } else if let Some(base) = field_name.strip_suffix(ID_SUFFIX) {
        base
    } else if let Some(base) = field_name.strip_suffix(IDS_SUFFIX) {
        base
    } else if field_name == ID_FIELD {
        context.ok_or_else(|| GeneratorError::IdFieldWithoutContext {
            field: qualified_field.to_string(),
        })?
    } else {
        return Ok(None);
    };

    if base.is_empty() {
        return Ok(None);
    }

    Ok(Some(identifier_type_name(base)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_suffix() {
        assert_eq!(
            classify("user_id", None, Some("Order"), "Order.user_id").unwrap(),
            Some("User".to_string())
        );
        assert_eq!(
            classify("billing_account_id", None, None, "x").unwrap(),
            Some("BillingAccount".to_string())
        );
    }

    #[test]
    fn test_plural_suffix() {
        assert_eq!(
            classify("tag_ids", None, Some("Account"), "Account.tag_ids").unwrap(),
            Some("Tag".to_string())
        );
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            classify("user_id", Some("customer"), Some("Order"), "Order.user_id").unwrap(),
            Some("Customer".to_string())
        );
        assert_eq!(
            classify("owner", Some("User"), None, "Order.owner").unwrap(),
            Some("User".to_string())
        );
    }

    #[test]
    fn test_empty_override_disables() {
        assert_eq!(
            classify("stripe_id", Some(""), Some("Order"), "Order.stripe_id").unwrap(),
            None
        );
    }

    #[test]
    fn test_id_uses_enclosing_message() {
        assert_eq!(
            classify("id", None, Some("Order"), "Order.id").unwrap(),
            Some("Order".to_string())
        );
    }

    #[test]
    fn test_id_without_context_fails() {
        let err = classify("id", None, None, "Order.choice.id").unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::IdFieldWithoutContext { ref field } if field == "Order.choice.id"
        ));
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(classify("name", None, Some("Order"), "Order.name").unwrap(), None);
        assert_eq!(classify("identity", None, Some("Order"), "Order.identity").unwrap(), None);
        assert_eq!(classify("_id", None, Some("Order"), "Order._id").unwrap(), None);
    }
}
