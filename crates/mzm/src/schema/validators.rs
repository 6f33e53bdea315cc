//! 🚧 Validators: the bouncers standing behind each attribute.
//!
//! Value validators (`OneOf`, the length and range checks) only look at the attribute's
//! own value and only run when it is set. Sibling validators (`ConflictsWith`,
//! `AlsoRequires`) look across the enclosing object. `ExactlyOneOf` is a *group*
//! validator: it runs even when its own attribute is null, because "none of them were
//! set" is exactly the thing it exists to catch.

use serde::Serialize;

use crate::common::{AttrObject, AttrValue};
use crate::diagnostics::Diagnostics;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "args", rename_all = "snake_case")]
pub enum Validator {
    /// String must be one of the listed values.
    OneOf(Vec<&'static str>),
    /// String length, inclusive bounds.
    LengthBetween(usize, usize),
    LengthAtLeast(usize),
    /// Number, inclusive bounds.
    NumberBetween(f64, f64),
    NumberAtLeast(f64),
    /// List length, inclusive bounds.
    ListSizeBetween(usize, usize),
    ListSizeAtLeast(usize),
    /// When set, none of these siblings may be set.
    ConflictsWith(Vec<&'static str>),
    /// When set, all of these siblings must be set too.
    AlsoRequires(Vec<&'static str>),
    /// Exactly one of this attribute and these siblings must be set.
    ExactlyOneOf(Vec<&'static str>),
}

impl Validator {
    pub(crate) fn is_group(&self) -> bool {
        matches!(self, Validator::ExactlyOneOf(_))
    }

    pub(crate) fn check(
        &self,
        name: &str,
        value: &AttrValue,
        siblings: &AttrObject,
        path: &str,
        diags: &mut Diagnostics,
    ) {
        match self {
            Validator::OneOf(allowed) => {
                if let Some(s) = value.as_str() {
                    if !allowed.iter().any(|candidate| *candidate == s) {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value Match",
                            format!("Attribute {path} value must be one of: {allowed:?}, got: \"{s}\""),
                        );
                    }
                }
            }
            Validator::LengthBetween(min, max) => {
                if let Some(s) = value.as_str() {
                    let len = s.chars().count();
                    if len < *min || len > *max {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value Length",
                            format!(
                                "Attribute {path} string length must be between {min} and {max}, got: {len}"
                            ),
                        );
                    }
                }
            }
            Validator::LengthAtLeast(min) => {
                if let Some(s) = value.as_str() {
                    let len = s.chars().count();
                    if len < *min {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value Length",
                            format!("Attribute {path} string length must be at least {min}, got: {len}"),
                        );
                    }
                }
            }
            Validator::NumberBetween(min, max) => {
                if let Some(n) = value.as_f64() {
                    if n < *min || n > *max {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value",
                            format!("Attribute {path} value must be between {min} and {max}, got: {n}"),
                        );
                    }
                }
            }
            Validator::NumberAtLeast(min) => {
                if let Some(n) = value.as_f64() {
                    if n < *min {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value",
                            format!("Attribute {path} value must be at least {min}, got: {n}"),
                        );
                    }
                }
            }
            Validator::ListSizeBetween(min, max) => {
                if let Some(items) = value.as_list() {
                    if items.len() < *min || items.len() > *max {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value",
                            format!(
                                "Attribute {path} list must contain at least {min} elements and at most {max} elements, got: {}",
                                items.len()
                            ),
                        );
                    }
                }
            }
            Validator::ListSizeAtLeast(min) => {
                if let Some(items) = value.as_list() {
                    if items.len() < *min {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Value",
                            format!("Attribute {path} list must contain at least {min} elements, got: {}", items.len()),
                        );
                    }
                }
            }
            Validator::ConflictsWith(others) => {
                for other in others {
                    if sibling_is_set(siblings, other) {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Combination",
                            format!("Attribute \"{other}\" cannot be specified when \"{name}\" is specified"),
                        );
                    }
                }
            }
            Validator::AlsoRequires(others) => {
                for other in others {
                    if !sibling_is_set(siblings, other) && !sibling_is_unknown(siblings, other) {
                        diags.add_attribute_error(
                            path,
                            "Invalid Attribute Combination",
                            format!("Attribute \"{other}\" must be specified when \"{name}\" is specified"),
                        );
                    }
                }
            }
            Validator::ExactlyOneOf(others) => {
                if value.is_unknown() || others.iter().any(|o| sibling_is_unknown(siblings, o)) {
                    return;
                }
                let set_count = usize::from(value.is_set())
                    + others.iter().filter(|o| sibling_is_set(siblings, o)).count();
                if set_count != 1 {
                    let mut names = vec![name];
                    names.extend(others.iter().copied());
                    diags.add_attribute_error(
                        path,
                        "Invalid Attribute Combination",
                        format!("Exactly one of these attributes must be configured: {names:?}"),
                    );
                }
            }
        }
    }
}

fn sibling_is_set(siblings: &AttrObject, name: &str) -> bool {
    siblings.get(name).is_some_and(AttrValue::is_set)
}

fn sibling_is_unknown(siblings: &AttrObject, name: &str) -> bool {
    siblings.get(name).is_some_and(AttrValue::is_unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn the_siblings(pairs: &[(&str, AttrValue)]) -> AttrObject {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn the_one_where_conflicting_siblings_get_called_out() {
        let siblings = the_siblings(&[
            ("value_string", "error".into()),
            ("value_number", AttrValue::int(3)),
        ]);
        let mut the_pile = Diagnostics::new();
        Validator::ConflictsWith(vec!["value_number"]).check(
            "value_string",
            &siblings["value_string"],
            &siblings,
            "expressions[0].value_string",
            &mut the_pile,
        );
        assert!(the_pile.has_error());
    }

    #[test]
    fn the_one_where_exactly_one_means_exactly_one() {
        let validator = Validator::ExactlyOneOf(vec!["value_field"]);

        let none_set = the_siblings(&[]);
        let mut the_pile = Diagnostics::new();
        validator.check("value_number", &AttrValue::Null, &none_set, "value_number", &mut the_pile);
        assert!(the_pile.has_error(), "zero is not one");

        let one_set = the_siblings(&[("value_field", "bytes".into())]);
        let mut the_pile = Diagnostics::new();
        validator.check("value_number", &AttrValue::Null, &one_set, "value_number", &mut the_pile);
        assert!(the_pile.is_empty(), "one is one");

        let still_unknown = the_siblings(&[("value_field", AttrValue::Unknown)]);
        let mut the_pile = Diagnostics::new();
        validator.check("value_number", &AttrValue::Null, &still_unknown, "value_number", &mut the_pile);
        assert!(the_pile.is_empty(), "unknown siblings are judged after apply");
    }

    #[test]
    fn the_one_where_lengths_count_characters_not_bytes() {
        let mut the_pile = Diagnostics::new();
        Validator::LengthBetween(1, 3).check(
            "title",
            &AttrValue::string("🦆🦆🦆"),
            &AttrObject::new(),
            "title",
            &mut the_pile,
        );
        assert!(the_pile.is_empty(), "three ducks fit in three characters");
    }

    #[test]
    fn the_one_where_an_empty_list_is_not_at_least_one() {
        let validator = Validator::ListSizeAtLeast(1);

        let mut the_pile = Diagnostics::new();
        validator.check("expressions", &AttrValue::List(vec![]), &AttrObject::new(), "expressions", &mut the_pile);
        assert!(the_pile.has_error());

        let mut the_pile = Diagnostics::new();
        validator.check("expressions", &AttrValue::Null, &AttrObject::new(), "expressions", &mut the_pile);
        assert!(the_pile.is_empty(), "null is unset, not empty");
    }
}
