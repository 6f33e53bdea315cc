//! 🌳 Conditional expression trees: the one module in this crate with actual recursion.
//!
//! 🎬 COLD OPEN. INT. FILTER PROCESSOR. AN EVENT ARRIVES.
//! "Is `status` equal to `error`?" "Yes." "AND is `level` greater than 3?" "...define greater."
//! Somebody has to write that question down twice: once the way a plan wants it, and once
//! the way the pipeline API wants it. This module translates between the two.
//!
//! ## The two shapes 📐
//!
//! ```text
//!  model (plan/state)                        wire (user_config)
//!  ┌──────────────────────────────┐          ┌──────────────────────────────────┐
//!  │ logical_operation: "AND"     │          │ "logical_operation": "AND"       │
//!  │ expressions: [               │   ───▶   │ "expressions": [                 │
//!  │   {field, operator,          │          │   {"field", "str_operator",      │
//!  │    value_string|value_number}│   ◀───   │    "value"}                      │
//!  │ ]                            │          │ ]                                │
//!  │   XOR                        │          │   or                             │
//!  │ expressions_group: [ <node> ]│          │ "expressions": [ <wire node> ]   │
//!  └──────────────────────────────┘          └──────────────────────────────────┘
//! ```
//!
//! ⚠️ On the wire, leaves and child groups share the same `expressions` key. Nothing tags
//! them. A child group is recognized by its *shape*: it has `expressions` /
//! `logical_operation`, and no `field`. Mixing the two in one list is rejected.
//!
//! Nesting is bounded: the root plus [`MAX_NESTED_LEVELS`] levels of groups. The schema
//! simply stops offering `expressions_group` at the last level, and the wire → model
//! direction refuses to go deeper with an error rather than chopping the tree off.

use serde_json::{Number, Value};

use crate::common::{AttrObject, AttrValue};
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

/// How many levels of `expressions_group` may hang below the root node.
pub const MAX_NESTED_LEVELS: usize = 5;

pub const DEFAULT_LOGICAL_OPERATION: &str = "AND";
pub const LOGICAL_OPERATIONS: &[&str] = &["AND", "OR"];

/// Equality, containment, ordering and type checks.
pub const NON_CHANGE_OPERATORS: &[&str] = &[
    "contains",
    "does_not_contain",
    "ends_with",
    "equal",
    "exists",
    "does_not_exist",
    "greater",
    "greater_or_equal",
    "is_array",
    "is_boolean",
    "is_empty",
    "is_null",
    "is_number",
    "is_object",
    "is_string",
    "less",
    "less_or_equal",
    "matches_regex",
    "not_equal",
    "starts_with",
];

/// Deltas against a previous value. Only make sense where the processor keeps history.
pub const CHANGE_OPERATORS: &[&str] = &[
    "percent_change_greater",
    "percent_change_less",
    "value_change_greater",
    "value_change_less",
];

/// 🎛️ Which operators a given processor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// Non-change and change operators together.
    All,
    /// Non-change operators only (aggregate, throttle, sample).
    NonChange,
}

impl OperatorFamily {
    pub fn operators(self) -> Vec<&'static str> {
        let mut operators = NON_CHANGE_OPERATORS.to_vec();
        if self == OperatorFamily::All {
            operators.extend_from_slice(CHANGE_OPERATORS);
        }
        operators
    }
}

// ============================================================
//  📐 Schema: every level pre-registered, root through MAX
// ============================================================

/// 📐 The schema of a conditional root node, with all nested levels spelled out.
pub fn conditional_schema(family: OperatorFamily) -> Schema {
    group_schema(0, family)
}

fn group_schema(level: usize, family: OperatorFamily) -> Schema {
    let mut schema = Schema::new()
        .attr(
            "expressions",
            Attribute::optional(AttrType::list_nested(leaf_schema(family)))
                .validate(Validator::ListSizeAtLeast(1))
                .validate(Validator::ConflictsWith(vec!["expressions_group"]))
                .describe("Defines a list of expressions for field comparisons"),
        )
        .attr(
            "logical_operation",
            Attribute::optional(AttrType::String)
                .default(DEFAULT_LOGICAL_OPERATION)
                .validate(Validator::OneOf(LOGICAL_OPERATIONS.to_vec()))
                .describe("Use AND or OR to combine the expressions. Defaults to AND."),
        );
    // 🪆 the last level has no room for another doll inside
    if level < MAX_NESTED_LEVELS {
        schema = schema.attr(
            "expressions_group",
            Attribute::optional(AttrType::list_nested(group_schema(level + 1, family)))
                .validate(Validator::ListSizeAtLeast(1))
                .validate(Validator::ConflictsWith(vec!["expressions"]))
                .describe("A group of expressions, combined with this level's logical_operation"),
        );
    }
    schema
}

fn leaf_schema(family: OperatorFamily) -> Schema {
    Schema::new()
        .attr(
            "field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field path whose value will be used in the comparison"),
        )
        .attr(
            "operator",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(family.operators()))
                .describe("The comparison operator"),
        )
        .attr(
            "value_string",
            Attribute::optional(AttrType::String)
                .validate(Validator::ConflictsWith(vec!["value_number"]))
                .describe("The operand to compare the field value with, when the value is a string"),
        )
        .attr(
            "value_number",
            Attribute::optional(AttrType::Number)
                .validate(Validator::ConflictsWith(vec!["value_string"]))
                .describe("The operand to compare the field value with, when the value is a number"),
        )
}

// ============================================================
//  📤 model → wire
// ============================================================

/// 📤 Unwind a model conditional node into its wire map.
///
/// Returns a map (not a `Value`) so callers like route can tuck their own keys
/// (`label`, `output_name`) in next to the tree.
pub fn unwind_conditional_from_model(node: &AttrObject) -> WireMap {
    let logical_operation = node
        .get_string("logical_operation")
        .unwrap_or(DEFAULT_LOGICAL_OPERATION);

    let expressions = if let Some(leaves) = node.get_object_list("expressions") {
        Value::Array(leaves.into_iter().map(leaf_from_model).collect())
    } else if let Some(groups) = node.get_object_list("expressions_group") {
        Value::Array(
            groups
                .into_iter()
                .map(|group| Value::Object(unwind_conditional_from_model(group)))
                .collect(),
        )
    } else {
        Value::Null
    };

    let mut wire = WireMap::new();
    wire.insert("expressions".to_string(), expressions);
    wire.insert("logical_operation".to_string(), Value::String(logical_operation.to_string()));
    wire
}

fn leaf_from_model(leaf: &AttrObject) -> Value {
    let mut wire = WireMap::new();
    wire.insert("field".to_string(), Value::String(leaf.get_string("field").unwrap_or_default().to_string()));
    wire.insert(
        "str_operator".to_string(),
        Value::String(leaf.get_string("operator").unwrap_or_default().to_string()),
    );
    // 🔢 number wins if both are somehow set; the schema makes sure they aren't
    if let Some(number) = leaf.get_number("value_number") {
        wire.insert("value".to_string(), Value::Number(number.clone()));
    } else if let Some(string) = leaf.get_string("value_string") {
        wire.insert("value".to_string(), Value::String(string.to_string()));
    }
    Value::Object(wire)
}

// ============================================================
//  📥 wire → model
// ============================================================

/// 📥 Rewind a wire conditional into a model node.
///
/// `path` is only used to pin diagnostics to the right attribute. Returns `None`
/// when an error diagnostic was recorded.
pub fn unwind_conditional_to_model(
    wire: &Value,
    path: &str,
    diags: &mut Diagnostics,
) -> Option<AttrObject> {
    rewind_group(wire, 0, path, diags)
}

enum EntryShape {
    Leaf,
    Group,
    Invalid,
}

fn entry_shape(entry: &Value) -> EntryShape {
    match entry.as_object() {
        Some(map) if map.contains_key("field") || map.contains_key("str_operator") => EntryShape::Leaf,
        Some(map) if map.contains_key("expressions") || map.contains_key("logical_operation") => {
            EntryShape::Group
        }
        _ => EntryShape::Invalid,
    }
}

fn rewind_group(wire: &Value, level: usize, path: &str, diags: &mut Diagnostics) -> Option<AttrObject> {
    let Some(group) = wire.as_object() else {
        diags.add_attribute_error(path, "Unexpected conditional shape", format!("expected an object, got {wire}"));
        return None;
    };

    let logical_operation = match group.get("logical_operation") {
        None | Some(Value::Null) => DEFAULT_LOGICAL_OPERATION.to_string(),
        Some(Value::String(op)) => op.clone(),
        Some(other) => {
            diags.add_attribute_error(
                format!("{path}.logical_operation"),
                "Unexpected conditional shape",
                format!("expected a string, got {other}"),
            );
            return None;
        }
    };

    let mut node = AttrObject::new();
    node.insert("logical_operation".to_string(), AttrValue::String(logical_operation));
    node.insert("expressions".to_string(), AttrValue::Null);
    if level < MAX_NESTED_LEVELS {
        node.insert("expressions_group".to_string(), AttrValue::Null);
    }

    let entries = match group.get("expressions") {
        None | Some(Value::Null) => return Some(node),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            diags.add_attribute_error(
                format!("{path}.expressions"),
                "Unexpected conditional shape",
                format!("expected a list, got {other}"),
            );
            return None;
        }
    };

    let shapes: Vec<EntryShape> = entries.iter().map(entry_shape).collect();
    let all_leaves = shapes.iter().all(|s| matches!(s, EntryShape::Leaf));
    let all_groups = shapes.iter().all(|s| matches!(s, EntryShape::Group));

    if all_leaves {
        // 🍃 includes the empty list, which the schema never lets a plan send
        let mut leaves = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            leaves.push(AttrValue::Object(rewind_leaf(entry, &format!("{path}.expressions[{i}]"), diags)?));
        }
        node.insert("expressions".to_string(), AttrValue::List(leaves));
    } else if all_groups {
        if level >= MAX_NESTED_LEVELS {
            diags.add_attribute_error(
                format!("{path}.expressions"),
                "Unsupported nesting depth",
                format!(
                    "Conditional expressions may be nested at most {MAX_NESTED_LEVELS} levels deep. \
                     The API returned a deeper tree, which cannot be represented in state."
                ),
            );
            return None;
        }
        let mut groups = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let child_path = format!("{path}.expressions_group[{i}]");
            groups.push(AttrValue::Object(rewind_group(entry, level + 1, &child_path, diags)?));
        }
        node.insert("expressions_group".to_string(), AttrValue::List(groups));
    } else {
        diags.add_attribute_error(
            format!("{path}.expressions"),
            "Unexpected conditional shape",
            "expected either a list of expressions or a list of expression groups, got a mix (or something else entirely)",
        );
        return None;
    }

    Some(node)
}

fn rewind_leaf(entry: &Value, path: &str, diags: &mut Diagnostics) -> Option<AttrObject> {
    let field = entry.get("field").and_then(Value::as_str);
    let operator = entry.get("str_operator").and_then(Value::as_str);
    let (Some(field), Some(operator)) = (field, operator) else {
        diags.add_attribute_error(
            path,
            "Unexpected conditional shape",
            format!("expected string \"field\" and \"str_operator\", got {entry}"),
        );
        return None;
    };

    let (value_string, value_number) = match entry.get("value") {
        None | Some(Value::Null) => (AttrValue::Null, AttrValue::Null),
        Some(Value::String(s)) => (AttrValue::String(s.clone()), AttrValue::Null),
        Some(Value::Number(n)) => (AttrValue::Null, AttrValue::Number(n.clone())),
        Some(other) => {
            diags.add_attribute_error(
                format!("{path}.value"),
                "Unexpected conditional shape",
                format!("expected a string or a number, got {other}"),
            );
            return None;
        }
    };

    let mut leaf = AttrObject::new();
    leaf.insert("field".to_string(), AttrValue::string(field));
    leaf.insert("operator".to_string(), AttrValue::string(operator));
    leaf.insert("value_string".to_string(), value_string);
    leaf.insert("value_number".to_string(), value_number);
    Some(leaf)
}

/// 🧪 Convenience for building a model leaf by hand. Used by tests and nobody's feelings.
pub fn leaf(field: &str, operator: &str, value: impl Into<LeafValue>) -> AttrValue {
    let (value_string, value_number) = match value.into() {
        LeafValue::None => (AttrValue::Null, AttrValue::Null),
        LeafValue::String(s) => (AttrValue::String(s), AttrValue::Null),
        LeafValue::Number(n) => (AttrValue::Null, AttrValue::Number(n)),
    };
    AttrValue::object([
        ("field", AttrValue::string(field)),
        ("operator", AttrValue::string(operator)),
        ("value_string", value_string),
        ("value_number", value_number),
    ])
}

/// The operand of a leaf, for [`leaf`].
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    None,
    String(String),
    Number(Number),
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::String(value.to_string())
    }
}

impl From<i64> for LeafValue {
    fn from(value: i64) -> Self {
        LeafValue::Number(Number::from(value))
    }
}

impl From<f64> for LeafValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(LeafValue::None, LeafValue::Number)
    }
}

impl From<()> for LeafValue {
    fn from(_: ()) -> Self {
        LeafValue::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn the_node(logical_operation: &str, expressions: AttrValue, groups: AttrValue) -> AttrObject {
        let mut node = AttrObject::new();
        node.insert("logical_operation".into(), AttrValue::string(logical_operation));
        node.insert("expressions".into(), expressions);
        node.insert("expressions_group".into(), groups);
        node
    }

    fn round_trip(node: &AttrObject) -> AttrObject {
        let the_wire = Value::Object(unwind_conditional_from_model(node));
        let mut the_pile = Diagnostics::new();
        let the_model = unwind_conditional_to_model(&the_wire, "conditional", &mut the_pile);
        assert!(the_pile.is_empty(), "unexpected diagnostics: {the_pile}");
        the_model.expect("💀 round trip should produce a node")
    }

    #[test]
    fn the_one_where_a_single_or_leaf_hits_the_wire_exactly_as_documented() {
        let the_model = the_node(
            "OR",
            AttrValue::List(vec![leaf("status", "equal", "error")]),
            AttrValue::Null,
        );
        let the_wire = Value::Object(unwind_conditional_from_model(&the_model));
        assert_eq!(
            the_wire,
            json!({
                "logical_operation": "OR",
                "expressions": [{"field": "status", "str_operator": "equal", "value": "error"}]
            })
        );
    }

    #[test]
    fn the_one_where_strings_stay_strings_and_numbers_stay_numbers() {
        let the_model = the_node(
            "AND",
            AttrValue::List(vec![
                leaf("status", "equal", "error"),
                leaf("level", "greater", 3i64),
                leaf("trace_id", "exists", ()),
            ]),
            AttrValue::Null,
        );
        let the_result = round_trip(&the_model);
        assert_eq!(the_result, the_model);

        let the_leaves = the_result.get_object_list("expressions").expect("💀 leaves");
        assert_eq!(the_leaves[0].value("value_number"), &AttrValue::Null);
        assert_eq!(the_leaves[1].value("value_string"), &AttrValue::Null);
        assert_eq!(the_leaves[1].value("value_number"), &AttrValue::int(3));
    }

    #[test]
    fn the_one_where_groups_come_home_as_groups_not_expressions() {
        let the_inner = the_node("OR", AttrValue::List(vec![leaf("app", "equal", "api")]), AttrValue::Null);
        let the_model = the_node("AND", AttrValue::Null, AttrValue::List(vec![AttrValue::Object(the_inner)]));

        let the_result = round_trip(&the_model);
        assert_eq!(the_result.value("expressions"), &AttrValue::Null);
        assert!(the_result.get_object_list("expressions_group").is_some());
        assert_eq!(the_result, the_model);
    }

    #[test]
    fn the_one_where_two_levels_of_nesting_keep_their_order_and_operators() {
        let the_deepest = the_node(
            "OR",
            AttrValue::List(vec![leaf("a", "equal", "1"), leaf("b", "less", 2i64)]),
            AttrValue::Null,
        );
        let the_middle = the_node("AND", AttrValue::Null, AttrValue::List(vec![AttrValue::Object(the_deepest)]));
        let the_sibling = the_node("AND", AttrValue::List(vec![leaf("c", "is_string", ())]), AttrValue::Null);
        let the_model = the_node(
            "OR",
            AttrValue::Null,
            AttrValue::List(vec![AttrValue::Object(the_middle), AttrValue::Object(the_sibling)]),
        );

        let the_wire = Value::Object(unwind_conditional_from_model(&the_model));
        assert_eq!(
            the_wire,
            json!({
                "logical_operation": "OR",
                "expressions": [
                    {
                        "logical_operation": "AND",
                        "expressions": [{
                            "logical_operation": "OR",
                            "expressions": [
                                {"field": "a", "str_operator": "equal", "value": "1"},
                                {"field": "b", "str_operator": "less", "value": 2}
                            ]
                        }]
                    },
                    {
                        "logical_operation": "AND",
                        "expressions": [{"field": "c", "str_operator": "is_string"}]
                    }
                ]
            })
        );
        assert_eq!(round_trip(&the_model), the_model);
    }

    #[test]
    fn the_one_where_a_missing_logical_operation_defaults_to_and() {
        let mut the_model = AttrObject::new();
        the_model.insert("expressions".into(), AttrValue::List(vec![leaf("x", "exists", ())]));
        the_model.insert("logical_operation".into(), AttrValue::Unknown);
        let the_wire = unwind_conditional_from_model(&the_model);
        assert_eq!(the_wire["logical_operation"], json!("AND"));
    }

    #[test]
    fn the_one_where_an_empty_node_is_explicitly_null() {
        let the_model = the_node("AND", AttrValue::Null, AttrValue::Null);
        let the_wire = Value::Object(unwind_conditional_from_model(&the_model));
        assert_eq!(the_wire, json!({"logical_operation": "AND", "expressions": null}));
        assert_eq!(round_trip(&the_model), the_model);
    }

    fn nest(depth: usize) -> Value {
        let mut the_wire = json!({"logical_operation": "AND", "expressions": [{"field": "f", "str_operator": "exists"}]});
        for _ in 0..depth {
            the_wire = json!({"logical_operation": "OR", "expressions": [the_wire]});
        }
        the_wire
    }

    #[test]
    fn the_one_where_five_levels_deep_is_fine_and_the_last_level_has_no_group_slot() {
        let mut the_pile = Diagnostics::new();
        let the_model = unwind_conditional_to_model(&nest(MAX_NESTED_LEVELS), "conditional", &mut the_pile)
            .expect("💀 five levels should fit");
        assert!(the_pile.is_empty());

        let mut the_cursor = &the_model;
        for _ in 0..MAX_NESTED_LEVELS {
            the_cursor = the_cursor.get_object_list("expressions_group").expect("💀 a group")[0];
        }
        assert!(!the_cursor.contains_key("expressions_group"), "the deepest level has no group attribute");
        assert!(the_cursor.get_object_list("expressions").is_some());
    }

    #[test]
    fn the_one_where_six_levels_fails_loudly_instead_of_chopping_the_tree() {
        let mut the_pile = Diagnostics::new();
        let the_model = unwind_conditional_to_model(&nest(MAX_NESTED_LEVELS + 1), "conditional", &mut the_pile);
        assert!(the_model.is_none());
        assert!(the_pile.iter().any(|d| d.summary == "Unsupported nesting depth"), "{the_pile}");
    }

    #[test]
    fn the_one_where_leaves_and_groups_refuse_to_share_a_list() {
        let the_wire = json!({
            "logical_operation": "AND",
            "expressions": [
                {"field": "f", "str_operator": "exists"},
                {"logical_operation": "OR", "expressions": []}
            ]
        });
        let mut the_pile = Diagnostics::new();
        assert!(unwind_conditional_to_model(&the_wire, "conditional", &mut the_pile).is_none());
        assert_eq!(
            the_pile.iter().next().and_then(|d| d.path.clone()),
            Some("conditional.expressions".to_string())
        );
    }

    #[test]
    fn the_one_where_a_boolean_operand_is_not_a_thing() {
        let the_wire = json!({"expressions": [{"field": "f", "str_operator": "equal", "value": true}]});
        let mut the_pile = Diagnostics::new();
        assert!(unwind_conditional_to_model(&the_wire, "conditional", &mut the_pile).is_none());
        assert!(the_pile.has_error());
    }

    #[test]
    fn the_one_where_the_schema_rejects_made_up_operators_before_conversion() {
        let the_schema = conditional_schema(OperatorFamily::All);
        let the_model = the_node("AND", AttrValue::List(vec![leaf("f", "vibes_check", "x")]), AttrValue::Null);
        let the_pile = the_schema.validate(&the_model);
        assert!(the_pile.iter().any(|d| d.path.as_deref() == Some("expressions[0].operator")), "{the_pile}");
    }

    #[test]
    fn the_one_where_non_change_processors_say_no_to_deltas() {
        let the_model = the_node(
            "AND",
            AttrValue::List(vec![leaf("cpu", "percent_change_greater", 10i64)]),
            AttrValue::Null,
        );
        assert!(conditional_schema(OperatorFamily::NonChange).validate(&the_model).has_error());
        assert!(conditional_schema(OperatorFamily::All).validate(&the_model).is_empty());
    }

    #[test]
    fn the_one_where_expressions_and_groups_are_mutually_exclusive_in_the_schema() {
        let the_inner = the_node("OR", AttrValue::List(vec![leaf("a", "exists", ())]), AttrValue::Null);
        let the_model = the_node(
            "AND",
            AttrValue::List(vec![leaf("b", "exists", ())]),
            AttrValue::List(vec![AttrValue::Object(the_inner)]),
        );
        let the_pile = conditional_schema(OperatorFamily::All).validate(&the_model);
        assert_eq!(the_pile.errors().count(), 2, "both sides of the conflict complain: {the_pile}");
    }

    #[test]
    fn the_one_where_string_and_number_operands_cannot_coexist() {
        let mut the_leaf = leaf("a", "equal", "x");
        if let Some(obj) = the_leaf.as_object_mut() {
            obj.insert("value_number".into(), AttrValue::int(1));
        }
        let the_model = the_node("AND", AttrValue::List(vec![the_leaf]), AttrValue::Null);
        assert!(conditional_schema(OperatorFamily::All).validate(&the_model).has_error());
    }

    #[test]
    fn the_one_where_the_schema_goes_exactly_five_groups_deep() {
        let mut the_schema = conditional_schema(OperatorFamily::All);
        let mut the_depth = 0;
        loop {
            let Some(group) = the_schema.get("expressions_group").cloned() else { break };
            let AttrType::ListNested { schema } = group.ty else { panic!("💀 groups are list-nested") };
            the_schema = schema;
            the_depth += 1;
        }
        assert_eq!(the_depth, MAX_NESTED_LEVELS);
    }

    /// 🪆 A model tree `depth` groups deep, built leaf-first the way a plan would hold it.
    fn nest_model(depth: usize) -> AttrObject {
        let mut the_tree = AttrObject::new();
        the_tree.insert("logical_operation".into(), AttrValue::string("AND"));
        the_tree.insert(
            "expressions".into(),
            AttrValue::List(vec![leaf("status", "equal", "error"), leaf("ratio", "greater", 0.5)]),
        );
        for level in (0..depth).rev() {
            let op = if level % 2 == 0 { "OR" } else { "AND" };
            the_tree = the_node_with_group(op, the_tree);
        }
        the_tree
    }

    fn the_node_with_group(logical_operation: &str, child: AttrObject) -> AttrObject {
        the_node(logical_operation, AttrValue::Null, AttrValue::List(vec![AttrValue::Object(child)]))
    }

    #[test]
    fn the_one_where_a_five_level_plan_survives_the_trip_there_and_back() {
        let the_model = nest_model(MAX_NESTED_LEVELS);
        assert!(
            conditional_schema(OperatorFamily::All).validate(&the_model).is_empty(),
            "five levels is a legal plan"
        );

        let mut the_cursor = &the_model;
        for _ in 0..MAX_NESTED_LEVELS {
            the_cursor = the_cursor.get_object_list("expressions_group").expect("💀 a group")[0];
        }
        assert!(!the_cursor.contains_key("expressions_group"));

        assert_eq!(round_trip(&the_model), the_model);
    }

    #[test]
    fn the_one_where_half_a_number_is_still_a_number() {
        let the_model = the_node("AND", AttrValue::List(vec![leaf("ratio", "less_or_equal", 0.5)]), AttrValue::Null);
        let the_wire = Value::Object(unwind_conditional_from_model(&the_model));
        assert_eq!(the_wire["expressions"][0]["value"], json!(0.5));

        let the_result = round_trip(&the_model);
        assert_eq!(the_result, the_model);
        let the_leaves = the_result.get_object_list("expressions").expect("💀 leaves");
        assert_eq!(the_leaves[0].value("value_number"), &AttrValue::float(0.5));
        assert_eq!(the_leaves[0].value("value_string"), &AttrValue::Null);
    }

    #[test]
    fn the_one_where_strings_and_numbers_share_a_group_without_trading_places() {
        let the_inner = the_node(
            "OR",
            AttrValue::List(vec![
                leaf("app", "equal", "api"),
                leaf("latency", "greater", 250i64),
                leaf("ratio", "less", 0.25),
                leaf("code", "equal", "404"),
            ]),
            AttrValue::Null,
        );
        let the_model = the_node_with_group("AND", the_inner);

        let the_result = round_trip(&the_model);
        assert_eq!(the_result, the_model);
        let the_group = the_result.get_object_list("expressions_group").expect("💀 a group")[0];
        let the_leaves = the_group.get_object_list("expressions").expect("💀 leaves");
        assert_eq!(the_leaves[1].value("value_number"), &AttrValue::int(250));
        assert_eq!(the_leaves[2].value("value_number"), &AttrValue::float(0.25));
        assert_eq!(the_leaves[3].value("value_string"), &AttrValue::string("404"));
        assert_eq!(the_leaves[3].value("value_number"), &AttrValue::Null);
    }

    #[test]
    fn the_one_where_an_empty_group_list_never_makes_it_past_the_schema() {
        let the_schema = conditional_schema(OperatorFamily::All);

        let the_empty_groups = the_node("AND", AttrValue::Null, AttrValue::List(vec![]));
        let the_pile = the_schema.validate(&the_empty_groups);
        assert!(
            the_pile.iter().any(|d| d.path.as_deref() == Some("expressions_group")),
            "an empty group list would come back as an empty expressions list: {the_pile}"
        );

        let the_empty_leaves = the_node("AND", AttrValue::List(vec![]), AttrValue::Null);
        let the_pile = the_schema.validate(&the_empty_leaves);
        assert!(the_pile.iter().any(|d| d.path.as_deref() == Some("expressions")), "{the_pile}");

        let the_hollow_inner = the_node_with_group("OR", the_node("AND", AttrValue::Null, AttrValue::List(vec![])));
        let the_pile = the_schema.validate(&the_hollow_inner);
        assert!(
            the_pile
                .iter()
                .any(|d| d.path.as_deref() == Some("expressions_group[0].expressions_group")),
            "{the_pile}"
        );
    }
}
