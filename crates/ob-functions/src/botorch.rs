//! Synthetic problems evaluated over `x0..x{d-1}` parameters.

use serde::{Deserialize, Serialize};

use ob_types::{numeric_param, FunctionError, ObResult, Parameters, SearchSpace};

use crate::function::BenchmarkTestFunction;
use crate::synthetic::SyntheticProblem;

/// Adapts a [`SyntheticProblem`] to parameter maps.
///
/// When `modified_bounds` is set, the search space is that box instead of the
/// problem's own; each coordinate is mapped linearly from the modified box
/// into the problem box before evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoTorchTestFunction {
    pub problem: SyntheticProblem,
    pub modified_bounds: Option<Vec<(f64, f64)>>,
}

impl BoTorchTestFunction {
    pub fn new(problem: SyntheticProblem) -> Self {
        Self {
            problem,
            modified_bounds: None,
        }
    }

    pub fn with_modified_bounds(
        problem: SyntheticProblem,
        modified_bounds: Vec<(f64, f64)>,
    ) -> ObResult<Self> {
        if modified_bounds.len() != problem.dim() {
            return Err(FunctionError::InvalidBounds {
                message: format!(
                    "{} bounds given for a {}-dimensional problem",
                    modified_bounds.len(),
                    problem.dim()
                ),
            }
            .into());
        }
        if let Some((i, (lo, hi))) = modified_bounds
            .iter()
            .enumerate()
            .find(|(_, (lo, hi))| !(lo < hi))
        {
            return Err(FunctionError::InvalidBounds {
                message: format!("bound {i} is empty: ({lo}, {hi})"),
            }
            .into());
        }
        Ok(Self {
            problem,
            modified_bounds: Some(modified_bounds),
        })
    }

    /// Parameter names read by this function, in coordinate order.
    pub fn parameter_names(&self) -> Vec<String> {
        (0..self.problem.dim()).map(|i| format!("x{i}")).collect()
    }

    /// The point handed to the underlying problem for `params`.
    pub fn problem_point(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        let x = self
            .parameter_names()
            .iter()
            .map(|name| numeric_param(params, name))
            .collect::<ObResult<Vec<f64>>>()?;

        match &self.modified_bounds {
            None => Ok(x),
            Some(modified) => Ok(x
                .iter()
                .zip(modified.iter().zip(self.problem.bounds()))
                .map(|(xi, ((m_lo, m_hi), (p_lo, p_hi)))| {
                    let unit = (xi - m_lo) / (m_hi - m_lo);
                    p_lo + unit * (p_hi - p_lo)
                })
                .collect()),
        }
    }
}

impl BenchmarkTestFunction for BoTorchTestFunction {
    fn name(&self) -> &str {
        self.problem.name()
    }

    fn num_outcomes(&self) -> usize {
        1 + self.problem.num_constraints()
    }

    fn evaluate_true(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        let x = self.problem_point(params)?;
        let mut y = vec![self.problem.evaluate_true(&x)?];
        y.extend(self.problem.evaluate_slack_true(&x)?);
        Ok(y)
    }

    fn default_search_space(&self) -> SearchSpace {
        let bounds = self
            .modified_bounds
            .clone()
            .unwrap_or_else(|| self.problem.bounds());
        self.parameter_names()
            .into_iter()
            .zip(bounds)
            .fold(SearchSpace::new(), |space, (name, (lo, hi))| {
                space.add_float(name, lo, hi)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ob_types::{float_params, ObError};

    fn point(x: &[f64]) -> Parameters {
        float_params(x.iter().enumerate().map(|(i, v)| (format!("x{i}"), *v)))
    }

    #[test]
    fn unconstrained_single_outcome() {
        let f = BoTorchTestFunction::new(SyntheticProblem::hartmann(6).unwrap());
        let x = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let y = f.evaluate_true(&point(&x)).unwrap();
        assert_eq!(f.num_outcomes(), 1);
        assert_eq!(y, vec![f.problem.evaluate_true(&x).unwrap()]);
    }

    #[test]
    fn constrained_appends_slack() {
        let f = BoTorchTestFunction::new(SyntheticProblem::constrained_hartmann(6).unwrap());
        let x = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let y = f.evaluate_true(&point(&x)).unwrap();
        assert_eq!(f.num_outcomes(), 2);
        assert_eq!(y.len(), 2);
        assert_eq!(y[0], f.problem.evaluate_true(&x).unwrap());
        assert_eq!(y[1], f.problem.evaluate_slack_true(&x).unwrap()[0]);
    }

    #[test]
    fn modified_bounds_normalize_into_problem_box() {
        let problem = SyntheticProblem::hartmann(6).unwrap();
        let f = BoTorchTestFunction::with_modified_bounds(problem, vec![(0.0, 2.0); 6]).unwrap();
        let x = [0.2, 0.4, 0.6, 0.8, 1.0, 1.2];
        let halved: Vec<f64> = x.iter().map(|v| v / 2.0).collect();

        let y = f.evaluate_true(&point(&x)).unwrap();
        let expected = problem.evaluate_true(&halved).unwrap();
        assert!((y[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn modified_bounds_rescale_nonunit_problem() {
        let f = BoTorchTestFunction::with_modified_bounds(
            SyntheticProblem::Branin,
            vec![(0.0, 1.0), (0.0, 1.0)],
        )
        .unwrap();
        let x = f.problem_point(&point(&[0.5, 1.0])).unwrap();
        assert_eq!(x, vec![2.5, 15.0]);
    }

    #[test]
    fn modified_bounds_validation() {
        let problem = SyntheticProblem::hartmann(6).unwrap();
        assert!(BoTorchTestFunction::with_modified_bounds(problem, vec![(0.0, 1.0); 5]).is_err());

        let mut bounds = vec![(0.0, 1.0); 6];
        bounds[2] = (1.0, 1.0);
        match BoTorchTestFunction::with_modified_bounds(problem, bounds) {
            Err(ObError::Function(FunctionError::InvalidBounds { message })) => {
                assert!(message.contains("bound 2"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_coordinate() {
        let f = BoTorchTestFunction::new(SyntheticProblem::Branin);
        match f.evaluate_true(&point(&[1.0])) {
            Err(ObError::Function(FunctionError::MissingParameter { name })) => {
                assert_eq!(name, "x1")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn search_space_uses_modified_bounds() {
        let f = BoTorchTestFunction::with_modified_bounds(
            SyntheticProblem::Branin,
            vec![(0.0, 2.0), (1.0, 3.0)],
        )
        .unwrap();
        let space = f.default_search_space();
        assert_eq!(space.parameter_names(), vec!["x0", "x1"]);
        assert_eq!(
            space.parameters[1].kind,
            ob_types::ParameterKind::FloatRange { low: 1.0, high: 3.0 }
        );
    }
}
