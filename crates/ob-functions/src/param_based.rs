//! Functions defined directly on parameter maps.

use serde::{Deserialize, Serialize};

use ob_types::{numeric_param, FunctionError, ObResult, Parameters, SearchSpace};

use crate::function::BenchmarkTestFunction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ParamBasedTestFunction {
    /// `num_outcomes` copies of the sum of squares of every parameter value.
    Dummy { dim: usize, num_outcomes: usize },
    /// Hierarchical function of Jenatton et al. (2017) over
    /// `x1..x7, r8, r9`; `x1..x3` select the active branch.
    Jenatton,
}

impl ParamBasedTestFunction {
    pub fn dummy(dim: usize, num_outcomes: usize) -> Self {
        Self::Dummy { dim, num_outcomes }
    }

    fn sum_of_squares(params: &Parameters) -> ObResult<f64> {
        params.iter().try_fold(0.0, |acc, (name, value)| {
            let v = value
                .as_f64()
                .ok_or_else(|| FunctionError::NonNumericParameter {
                    name: name.clone(),
                    value: value.to_string(),
                })?;
            Ok(acc + v * v)
        })
    }

    fn jenatton(params: &Parameters) -> ObResult<f64> {
        let p = |name: &str| numeric_param(params, name);
        let value = if p("x1")? == 0.0 {
            if p("x2")? == 0.0 {
                p("x4")?.powi(2) + 0.1 + p("r8")?
            } else {
                p("x5")?.powi(2) + 0.2 + p("r8")?
            }
        } else if p("x3")? == 0.0 {
            p("x6")?.powi(2) + 0.3 + p("r9")?
        } else {
            p("x7")?.powi(2) + 0.4 + p("r9")?
        };
        Ok(value)
    }
}

impl BenchmarkTestFunction for ParamBasedTestFunction {
    fn name(&self) -> &str {
        match self {
            Self::Dummy { .. } => "dummy",
            Self::Jenatton => "jenatton",
        }
    }

    fn num_outcomes(&self) -> usize {
        match self {
            Self::Dummy { num_outcomes, .. } => *num_outcomes,
            Self::Jenatton => 1,
        }
    }

    fn evaluate_true(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        match self {
            Self::Dummy { num_outcomes, .. } => {
                Ok(vec![Self::sum_of_squares(params)?; *num_outcomes])
            }
            Self::Jenatton => Ok(vec![Self::jenatton(params)?]),
        }
    }

    fn default_search_space(&self) -> SearchSpace {
        match self {
            Self::Dummy { dim, .. } => (0..*dim).fold(SearchSpace::new(), |space, i| {
                space.add_float(format!("x{i}"), 0.0, 1.0)
            }),
            Self::Jenatton => {
                let space = (1..=3).fold(SearchSpace::new(), |space, i| {
                    space.add_int(format!("x{i}"), 0, 1)
                });
                let space = (4..=7).fold(space, |space, i| {
                    space.add_float(format!("x{i}"), 0.0, 1.0)
                });
                space.add_float("r8", 0.0, 1.0).add_float("r9", 0.0, 1.0)
            }
        }
    }
}
