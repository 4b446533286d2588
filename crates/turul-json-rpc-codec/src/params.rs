//! Binding of request `params` onto statically typed argument structs.
//!
//! `params` arrives either by name (a JSON object) or by position (a JSON
//! array). By-name binding is permissive: fields without a matching key keep
//! their `Default` value and unknown keys are ignored. By-position binding is
//! strict: the array length must equal the number of fields exactly.
//!
//! The ordered field list of a target type comes from
//! `#[derive(JsonRpcParams)]`, which generates the [`JsonRpcParams`] impl at
//! compile time.
//!
//! ```rust,ignore
//! use turul_json_rpc_codec::{JsonRpcParams, params::{bind_params, Params}};
//! use serde_json::json;
//!
//! #[derive(JsonRpcParams, Default)]
//! #[rpc(rename_all = "UPPERCASE")]
//! struct MultiplyArgs {
//!     a: i64,
//!     b: i64,
//! }
//!
//! let args: MultiplyArgs = bind_params(Params::from_value(Some(json!([4, 2])))?)?;
//! assert_eq!(args.a * args.b, 8);
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::error::InvalidReason;

/// Parameters of a request, classified once at decode time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// `params` omitted or `null`
    #[default]
    Empty,
    /// Named parameters as an object
    ByName(Map<String, Value>),
    /// Positional parameters as an array
    ByPosition(Vec<Value>),
}

impl Params {
    /// Classify a raw `params` member. Scalars are rejected because JSON-RPC
    /// requires structured parameters.
    pub fn from_value(value: Option<Value>) -> Result<Self, InvalidReason> {
        match value {
            None | Some(Value::Null) => Ok(Params::Empty),
            Some(Value::Object(map)) => Ok(Params::ByName(map)),
            Some(Value::Array(values)) => Ok(Params::ByPosition(values)),
            Some(_) => Err(InvalidReason::ParamsNotStructured),
        }
    }

    /// Get a parameter by name (for object params)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Params::ByName(map) => map.get(key),
            _ => None,
        }
    }

    /// Get a parameter by index (for array params)
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Params::ByPosition(values) => values.get(index),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Params::Empty => 0,
            Params::ByName(map) => map.len(),
            Params::ByPosition(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Back to a JSON value; `None` for [`Params::Empty`]
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Params::Empty => None,
            Params::ByName(map) => Some(Value::Object(map.clone())),
            Params::ByPosition(values) => Some(Value::Array(values.clone())),
        }
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::ByName(map)
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::ByPosition(values)
    }
}

/// One field of a bindable target, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// Name the field is matched against in by-name params
    pub name: &'static str,
    /// Declared Rust type, for error messages
    pub type_name: &'static str,
}

/// Errors raised while binding params; reported as `-32602 Invalid params`
#[derive(Debug, Error)]
pub enum BindError {
    #[error("positional params have {got} elements but the target has {expected} fields")]
    Arity { expected: usize, got: usize },

    #[error("cannot decode param {index} into field '{field}' of type {ty}: {source}")]
    PositionalField {
        index: usize,
        field: &'static str,
        ty: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot decode param '{field}' into type {ty}: {source}")]
    NamedField {
        field: &'static str,
        ty: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A type that request params can be bound onto.
///
/// Normally derived with `#[derive(JsonRpcParams)]`; the derive requires the
/// type to implement `Default` and every bound field to implement
/// `serde::de::DeserializeOwned`.
pub trait JsonRpcParams: Sized + Default {
    /// Bindable fields in declaration order
    fn fields() -> &'static [FieldSlot];

    /// Bind an object of named params
    fn bind_named(map: Map<String, Value>) -> Result<Self, BindError>;

    /// Bind an array of positional params
    fn bind_positional(values: Vec<Value>) -> Result<Self, BindError>;

    fn bind(params: Params) -> Result<Self, BindError> {
        match params {
            Params::Empty => Ok(Self::default()),
            Params::ByName(map) => Self::bind_named(map),
            Params::ByPosition(values) => Self::bind_positional(values),
        }
    }
}

/// Bind `params` onto `T`
pub fn bind_params<T: JsonRpcParams>(params: Params) -> Result<T, BindError> {
    trace!(
        fields = T::fields().len(),
        supplied = params.len(),
        "binding params"
    );
    T::bind(params)
}

/// Methods without arguments. Accepts no params, any object, or an empty array.
impl JsonRpcParams for () {
    fn fields() -> &'static [FieldSlot] {
        &[]
    }

    fn bind_named(_map: Map<String, Value>) -> Result<Self, BindError> {
        Ok(())
    }

    fn bind_positional(values: Vec<Value>) -> Result<Self, BindError> {
        check_arity(&values, Self::fields())
    }
}

/// Reject a positional array whose length differs from the field count
pub fn check_arity(values: &[Value], fields: &[FieldSlot]) -> Result<(), BindError> {
    if values.len() != fields.len() {
        return Err(BindError::Arity {
            expected: fields.len(),
            got: values.len(),
        });
    }
    Ok(())
}

/// Whether a by-name key addresses `slot`
pub fn key_matches(key: &str, slot: &FieldSlot, case_insensitive: bool) -> bool {
    if case_insensitive {
        key.eq_ignore_ascii_case(slot.name)
    } else {
        key == slot.name
    }
}

#[doc(hidden)]
pub fn decode_positional<T: DeserializeOwned>(
    value: Value,
    index: usize,
    slot: &FieldSlot,
) -> Result<T, BindError> {
    serde_json::from_value(value).map_err(|source| BindError::PositionalField {
        index,
        field: slot.name,
        ty: slot.type_name,
        source,
    })
}

#[doc(hidden)]
pub fn decode_named<T: DeserializeOwned>(value: Value, slot: &FieldSlot) -> Result<T, BindError> {
    serde_json::from_value(value).map_err(|source| BindError::NamedField {
        field: slot.name,
        ty: slot.type_name,
        source,
    })
}

#[cfg(all(test, feature = "derive"))]
mod tests {
    use super::*;
    use crate::JsonRpcParams;
    use serde_json::json;

    #[derive(JsonRpcParams, Default, Debug, PartialEq)]
    #[rpc(rename_all = "UPPERCASE")]
    struct MultiplyArgs {
        a: i64,
        b: i64,
    }

    #[derive(JsonRpcParams, Default, Debug, PartialEq)]
    struct Profile {
        name: String,
        #[rpc(rename = "emailAddress")]
        email: Option<String>,
        tags: Vec<String>,
    }

    #[derive(JsonRpcParams, Default, Debug, PartialEq)]
    #[rpc(case_insensitive)]
    struct Loose {
        count: u32,
    }

    #[derive(JsonRpcParams, Default, Debug, PartialEq)]
    struct NoArgs {}

    fn params(value: Value) -> Params {
        Params::from_value(Some(value)).unwrap()
    }

    #[test]
    fn test_classify_params() {
        assert_eq!(Params::from_value(None).unwrap(), Params::Empty);
        assert_eq!(Params::from_value(Some(Value::Null)).unwrap(), Params::Empty);
        assert!(matches!(params(json!({"a": 1})), Params::ByName(_)));
        assert!(matches!(params(json!([1, 2])), Params::ByPosition(_)));
        assert_eq!(
            Params::from_value(Some(json!(5))).unwrap_err(),
            InvalidReason::ParamsNotStructured
        );
        assert_eq!(
            Params::from_value(Some(json!("x"))).unwrap_err(),
            InvalidReason::ParamsNotStructured
        );
    }

    #[test]
    fn test_params_accessors() {
        let named = params(json!({"key": "value"}));
        assert_eq!(named.get("key"), Some(&json!("value")));
        assert_eq!(named.get_index(0), None);

        let positional = params(json!(["first", "second"]));
        assert_eq!(positional.get_index(1), Some(&json!("second")));
        assert_eq!(positional.get("first"), None);
        assert_eq!(positional.len(), 2);
        assert_eq!(positional.to_value(), Some(json!(["first", "second"])));
        assert_eq!(Params::Empty.to_value(), None);
    }

    #[test]
    fn test_field_order() {
        let fields = MultiplyArgs::fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "A");
        assert_eq!(fields[1].name, "B");
        assert_eq!(fields[0].type_name, "i64");

        let names: Vec<_> = Profile::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "emailAddress", "tags"]);
        assert_eq!(Profile::fields()[1].type_name, "Option<String>");
    }

    #[test]
    fn test_bind_by_name() {
        let args: MultiplyArgs = bind_params(params(json!({"A": 4, "B": 2}))).unwrap();
        assert_eq!(args, MultiplyArgs { a: 4, b: 2 });
    }

    #[test]
    fn test_bind_by_name_is_partial() {
        let args: MultiplyArgs = bind_params(params(json!({"A": 4}))).unwrap();
        assert_eq!(args, MultiplyArgs { a: 4, b: 0 });

        let args: MultiplyArgs = bind_params(params(json!({"unknown": true}))).unwrap();
        assert_eq!(args, MultiplyArgs::default());
    }

    #[test]
    fn test_bind_by_name_respects_declared_names() {
        // Lowercase keys do not match the UPPERCASE mapping.
        let args: MultiplyArgs = bind_params(params(json!({"a": 4, "b": 2}))).unwrap();
        assert_eq!(args, MultiplyArgs::default());

        let profile: Profile = bind_params(params(json!({
            "name": "ada",
            "emailAddress": "ada@example.com",
            "email": "ignored@example.com"
        })))
        .unwrap();
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_bind_by_name_case_insensitive() {
        let loose: Loose = bind_params(params(json!({"COUNT": 3}))).unwrap();
        assert_eq!(loose.count, 3);
    }

    #[test]
    fn test_bind_by_name_type_error() {
        let err = bind_params::<MultiplyArgs>(params(json!({"A": "four"}))).unwrap_err();
        match err {
            BindError::NamedField { field, ty, .. } => {
                assert_eq!(field, "A");
                assert_eq!(ty, "i64");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bind_by_position() {
        let args: MultiplyArgs = bind_params(params(json!([4, 2]))).unwrap();
        assert_eq!(args, MultiplyArgs { a: 4, b: 2 });

        let profile: Profile =
            bind_params(params(json!(["ada", null, ["x", "y"]]))).unwrap();
        assert_eq!(profile.name, "ada");
        assert_eq!(profile.email, None);
        assert_eq!(profile.tags, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_positional_arity_mismatch() {
        for k in [0usize, 1, 3, 4, 10] {
            let values: Vec<Value> = (0..k).map(|i| json!(i)).collect();
            let err = bind_params::<MultiplyArgs>(Params::ByPosition(values)).unwrap_err();
            match err {
                BindError::Arity { expected, got } => {
                    assert_eq!(expected, 2);
                    assert_eq!(got, k);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_positional_error_names_index_and_type() {
        let err = bind_params::<MultiplyArgs>(params(json!([4, "two"]))).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, BindError::PositionalField { index: 1, field: "B", .. }));
        assert!(message.contains("param 1"));
        assert!(message.contains("i64"));
    }

    #[test]
    fn test_no_lossy_coercion() {
        assert!(bind_params::<MultiplyArgs>(params(json!([4.5, 2]))).is_err());
        assert!(bind_params::<MultiplyArgs>(params(json!({"A": 4.5}))).is_err());
        assert!(bind_params::<Loose>(params(json!([-1]))).is_err());
    }

    #[test]
    fn test_absent_params_bind_to_default() {
        let args: MultiplyArgs = bind_params(Params::Empty).unwrap();
        assert_eq!(args, MultiplyArgs::default());
    }

    #[test]
    fn test_empty_array_against_zero_field_target() {
        assert!(bind_params::<NoArgs>(params(json!([]))).is_ok());
        assert!(bind_params::<()>(params(json!([]))).is_ok());
    }

    #[test]
    fn test_empty_array_against_fielded_target() {
        let err = bind_params::<MultiplyArgs>(params(json!([]))).unwrap_err();
        assert!(matches!(err, BindError::Arity { expected: 2, got: 0 }));
    }

    #[test]
    fn test_zero_field_target_rejects_positional_values() {
        assert!(bind_params::<()>(params(json!([1]))).is_err());
        assert!(bind_params::<()>(params(json!({"a": 1}))).is_ok());
    }
}
