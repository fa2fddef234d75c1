//! Parameter values and parameter maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{FunctionError, ObResult};

/// A concrete parameter value assigned to an arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
}

impl ParameterValue {
    /// Numeric view of the value, if it has one. Booleans map to 0.0 / 1.0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Json(serde_json::Value::Number(n)) => n.as_f64(),
            Self::Json(serde_json::Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Json(_) => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Parameter assignment keyed by parameter name.
pub type Parameters = BTreeMap<String, ParameterValue>;

/// Look up `name` and read it as a float.
pub fn numeric_param(params: &Parameters, name: &str) -> ObResult<f64> {
    let value = params
        .get(name)
        .ok_or_else(|| FunctionError::MissingParameter {
            name: name.to_string(),
        })?;
    value.as_f64().ok_or_else(|| {
        FunctionError::NonNumericParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Build a float-valued parameter map from `(name, value)` pairs.
pub fn float_params<I, S>(pairs: I) -> Parameters
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), ParameterValue::Float(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ObError;

    #[test]
    fn numeric_views() {
        assert_eq!(ParameterValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(ParameterValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ParameterValue::Json(serde_json::json!(true)).as_f64(), Some(1.0));
        assert_eq!(ParameterValue::Json(serde_json::json!(2.5)).as_f64(), Some(2.5));
        assert_eq!(ParameterValue::Json(serde_json::json!("a")).as_f64(), None);
    }

    #[test]
    fn numeric_param_errors() {
        let mut params = float_params([("x0", 0.25)]);
        params.insert("label".into(), ParameterValue::Json(serde_json::json!("red")));

        assert_eq!(numeric_param(&params, "x0").unwrap(), 0.25);

        match numeric_param(&params, "x1") {
            Err(ObError::Function(FunctionError::MissingParameter { name })) => {
                assert_eq!(name, "x1")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        match numeric_param(&params, "label") {
            Err(ObError::Function(FunctionError::NonNumericParameter { name, .. })) => {
                assert_eq!(name, "label")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn untagged_serde() {
        let params = float_params([("x0", 0.5)]);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"x0":0.5}"#);

        let back: Parameters = serde_json::from_str(r#"{"x0":0.5,"x1":2}"#).unwrap();
        assert_eq!(back["x0"], ParameterValue::Float(0.5));
        assert_eq!(back["x1"], ParameterValue::Int(2));
    }
}
