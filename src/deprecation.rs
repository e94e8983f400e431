//! Deprecation filtering
//!
//! With `remove-deprecated` set, deprecated descriptors are dropped from the
//! model before anything else looks at them.

use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    MethodDescriptorProto, ServiceDescriptorProto,
};

/// Descriptors that carry a `deprecated` option
pub trait HasDeprecatedFlag {
    /// Whether the descriptor is marked `deprecated = true`
    fn is_deprecated(&self) -> bool;
}

impl HasDeprecatedFlag for DescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

impl HasDeprecatedFlag for FieldDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

impl HasDeprecatedFlag for EnumDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

impl HasDeprecatedFlag for EnumValueDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

impl HasDeprecatedFlag for ServiceDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

impl HasDeprecatedFlag for MethodDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.deprecated())
    }
}

/// Policy deciding which descriptors make it into the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeprecationFilter {
    remove_deprecated: bool,
}

impl DeprecationFilter {
    /// Create a filter; `remove_deprecated` drops anything marked deprecated
    pub fn new(remove_deprecated: bool) -> Self {
        Self { remove_deprecated }
    }

    /// Whether `item` is kept
    pub fn retains<T: HasDeprecatedFlag>(&self, item: &T) -> bool {
        !(self.remove_deprecated && item.is_deprecated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{FieldOptions, MessageOptions};

    fn deprecated_field() -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some("old".to_string()),
            options: Some(FieldOptions {
                deprecated: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_deprecated() {
        assert!(deprecated_field().is_deprecated());
        assert!(!FieldDescriptorProto::default().is_deprecated());

        let message = DescriptorProto {
            options: Some(MessageOptions {
                deprecated: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!message.is_deprecated());
    }

    #[test]
    fn test_filter_disabled_keeps_everything() {
        let filter = DeprecationFilter::new(false);
        assert!(filter.retains(&deprecated_field()));
    }

    #[test]
    fn test_filter_enabled_drops_deprecated() {
        let filter = DeprecationFilter::new(true);
        assert!(!filter.retains(&deprecated_field()));
        assert!(filter.retains(&FieldDescriptorProto::default()));
    }
}
