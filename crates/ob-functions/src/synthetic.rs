//! Closed-form synthetic optimization problems.
//!
//! Definitions follow the usual global-optimization test suite conventions:
//! each problem evaluates a point `x` in its own `bounds()` box and returns the
//! noiseless objective. Constrained problems additionally expose slack values,
//! where a non-negative slack means the constraint is satisfied.

use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};

use ob_types::{FunctionError, ObResult};

/// A synthetic problem and its dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticProblem {
    Hartmann { dim: usize },
    ConstrainedHartmann { dim: usize },
    Ackley { dim: usize },
    Branin,
}

impl SyntheticProblem {
    /// Hartmann problem; only 3, 4 and 6 dimensions are defined.
    pub fn hartmann(dim: usize) -> ObResult<Self> {
        let problem = Self::Hartmann { dim };
        problem.validate()?;
        Ok(problem)
    }

    pub fn constrained_hartmann(dim: usize) -> ObResult<Self> {
        let problem = Self::ConstrainedHartmann { dim };
        problem.validate()?;
        Ok(problem)
    }

    pub fn ackley(dim: usize) -> ObResult<Self> {
        let problem = Self::Ackley { dim };
        problem.validate()?;
        Ok(problem)
    }

    /// Check the dimension. Deserialized problems bypass the constructors,
    /// so anything built from configuration must pass through here.
    pub fn validate(&self) -> ObResult<()> {
        match self {
            Self::Hartmann { dim } | Self::ConstrainedHartmann { dim } => {
                hartmann_coefficients(*dim).map(|_| ())
            }
            Self::Ackley { dim: 0 } => Err(FunctionError::UnsupportedDimension {
                problem: self.name().to_string(),
                dim: 0,
            }
            .into()),
            Self::Ackley { .. } | Self::Branin => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hartmann { .. } => "hartmann",
            Self::ConstrainedHartmann { .. } => "constrained_hartmann",
            Self::Ackley { .. } => "ackley",
            Self::Branin => "branin",
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Hartmann { dim } | Self::ConstrainedHartmann { dim } | Self::Ackley { dim } => {
                *dim
            }
            Self::Branin => 2,
        }
    }

    pub fn num_constraints(&self) -> usize {
        match self {
            Self::ConstrainedHartmann { .. } => 1,
            _ => 0,
        }
    }

    /// Lower and upper bound for each coordinate.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        match self {
            Self::Hartmann { dim } | Self::ConstrainedHartmann { dim } => vec![(0.0, 1.0); *dim],
            Self::Ackley { dim } => vec![(-32.768, 32.768); *dim],
            Self::Branin => vec![(-5.0, 10.0), (0.0, 15.0)],
        }
    }

    /// Known global minimum of the objective, where one is tabulated.
    pub fn optimal_value(&self) -> Option<f64> {
        match self {
            Self::Hartmann { dim: 3 } | Self::ConstrainedHartmann { dim: 3 } => Some(-3.86278),
            Self::Hartmann { dim: 6 } | Self::ConstrainedHartmann { dim: 6 } => Some(-3.32237),
            Self::Hartmann { dim: 4 } | Self::ConstrainedHartmann { dim: 4 } => Some(-3.134493),
            Self::Ackley { .. } => Some(0.0),
            Self::Branin => Some(0.397887),
            _ => None,
        }
    }

    /// Noiseless objective at `x`.
    pub fn evaluate_true(&self, x: &[f64]) -> ObResult<f64> {
        self.check_dim(x)?;
        match self {
            Self::Hartmann { dim } | Self::ConstrainedHartmann { dim } => hartmann(*dim, x),
            Self::Ackley { .. } => Ok(ackley(x)),
            Self::Branin => Ok(branin(x[0], x[1])),
        }
    }

    /// Constraint slacks at `x`; empty for unconstrained problems.
    pub fn evaluate_slack_true(&self, x: &[f64]) -> ObResult<Vec<f64>> {
        self.check_dim(x)?;
        match self {
            Self::ConstrainedHartmann { .. } => {
                let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
                Ok(vec![1.0 - norm])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn check_dim(&self, x: &[f64]) -> ObResult<()> {
        if x.len() != self.dim() {
            return Err(FunctionError::UnsupportedDimension {
                problem: self.name().to_string(),
                dim: x.len(),
            }
            .into());
        }
        Ok(())
    }
}

// ---------- Hartmann ----------

const HARTMANN_ALPHA: [f64; 4] = [1.0, 1.2, 3.0, 3.2];

const HARTMANN3_A: [[f64; 3]; 4] = [
    [3.0, 10.0, 30.0],
    [0.1, 10.0, 35.0],
    [3.0, 10.0, 30.0],
    [0.1, 10.0, 35.0],
];

const HARTMANN3_P: [[f64; 3]; 4] = [
    [3689.0, 1170.0, 2673.0],
    [4699.0, 4387.0, 7470.0],
    [1091.0, 8732.0, 5547.0],
    [381.0, 5743.0, 8828.0],
];

const HARTMANN6_A: [[f64; 6]; 4] = [
    [10.0, 3.0, 17.0, 3.5, 1.7, 8.0],
    [0.05, 10.0, 17.0, 0.1, 8.0, 14.0],
    [3.0, 3.5, 1.7, 10.0, 17.0, 8.0],
    [17.0, 8.0, 0.05, 10.0, 0.1, 14.0],
];

const HARTMANN6_P: [[f64; 6]; 4] = [
    [1312.0, 1696.0, 5569.0, 124.0, 8283.0, 5886.0],
    [2329.0, 4135.0, 8307.0, 3736.0, 1004.0, 9991.0],
    [2348.0, 1451.0, 3522.0, 2883.0, 3047.0, 6650.0],
    [4047.0, 8828.0, 8732.0, 5743.0, 1091.0, 381.0],
];

/// `(A, P)` rows for the given dimension. The 4-d variant uses the leading
/// four columns of the 6-d tables.
fn hartmann_coefficients(dim: usize) -> ObResult<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let truncate = |rows: &[[f64; 6]; 4], n: usize| -> Vec<Vec<f64>> {
        rows.iter().map(|r| r[..n].to_vec()).collect()
    };
    match dim {
        3 => Ok((
            HARTMANN3_A.iter().map(|r| r.to_vec()).collect(),
            HARTMANN3_P.iter().map(|r| r.to_vec()).collect(),
        )),
        4 | 6 => Ok((truncate(&HARTMANN6_A, dim), truncate(&HARTMANN6_P, dim))),
        _ => Err(FunctionError::UnsupportedDimension {
            problem: "hartmann".to_string(),
            dim,
        }
        .into()),
    }
}

fn hartmann(dim: usize, x: &[f64]) -> ObResult<f64> {
    let (a, p) = hartmann_coefficients(dim)?;
    let h = -HARTMANN_ALPHA
        .iter()
        .zip(a.iter().zip(p.iter()))
        .map(|(alpha, (a_row, p_row))| {
            let inner: f64 = x
                .iter()
                .zip(a_row.iter().zip(p_row.iter()))
                .map(|(xj, (aij, pij))| aij * (xj - 1e-4 * pij).powi(2))
                .sum();
            alpha * (-inner).exp()
        })
        .sum::<f64>();

    if dim == 4 {
        Ok((1.1 + h) / 0.839)
    } else {
        Ok(h)
    }
}

// ---------- Ackley ----------

fn ackley(x: &[f64]) -> f64 {
    const A: f64 = 20.0;
    const B: f64 = 0.2;
    let c = 2.0 * PI;
    let d = x.len() as f64;

    let sum_sq: f64 = x.iter().map(|v| v * v).sum();
    let sum_cos: f64 = x.iter().map(|v| (c * v).cos()).sum();

    -A * (-B * (sum_sq / d).sqrt()).exp() - (sum_cos / d).exp() + A + E
}

// ---------- Branin ----------

fn branin(x1: f64, x2: f64) -> f64 {
    let b = 5.1 / (4.0 * PI * PI);
    let c = 5.0 / PI;
    let t = 1.0 / (8.0 * PI);
    (x2 - b * x1 * x1 + c * x1 - 6.0).powi(2) + 10.0 * (1.0 - t) * x1.cos() + 10.0
}

/// Branin function at `(x1, x2)`, exposed for surrogate training data.
pub fn branin_value(x1: f64, x2: f64) -> f64 {
    branin(x1, x2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ob_types::ObError;

    fn assert_optimum(problem: SyntheticProblem, x: &[f64], tol: f64) {
        let expected = problem.optimal_value().unwrap();
        let value = problem.evaluate_true(x).unwrap();
        assert!(
            (value - expected).abs() < tol,
            "{}: got {value}, table says {expected}",
            problem.name()
        );
    }

    #[test]
    fn known_optima_match_table() {
        assert_optimum(
            SyntheticProblem::hartmann(3).unwrap(),
            &[0.114614, 0.555649, 0.852547],
            1e-4,
        );
        // Optimizer is only published to four digits.
        assert_optimum(
            SyntheticProblem::hartmann(4).unwrap(),
            &[0.1873, 0.1906, 0.5566, 0.2647],
            5e-4,
        );
        assert_optimum(
            SyntheticProblem::hartmann(6).unwrap(),
            &[0.20169, 0.150011, 0.476874, 0.275332, 0.311652, 0.6573],
            1e-4,
        );
        assert_optimum(SyntheticProblem::ackley(2).unwrap(), &[0.0, 0.0], 1e-12);
        assert_optimum(SyntheticProblem::ackley(5).unwrap(), &[0.0; 5], 1e-12);
        for x in [[-PI, 12.275], [PI, 2.275], [9.42478, 2.475]] {
            assert_optimum(SyntheticProblem::Branin, &x, 1e-5);
        }
    }

    #[test]
    fn optima_are_minima() {
        let ackley = SyntheticProblem::ackley(2).unwrap();
        assert!(ackley.evaluate_true(&[1.0, 1.0]).unwrap() > ackley.optimal_value().unwrap());

        let hartmann = SyntheticProblem::hartmann(4).unwrap();
        let value = hartmann.evaluate_true(&[0.5; 4]).unwrap();
        assert!(value > hartmann.optimal_value().unwrap());
    }

    #[test]
    fn hartmann_rejects_other_dims() {
        match SyntheticProblem::hartmann(5) {
            Err(ObError::Function(FunctionError::UnsupportedDimension { dim, .. })) => {
                assert_eq!(dim, 5)
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(SyntheticProblem::constrained_hartmann(2).is_err());
        assert!(SyntheticProblem::ackley(0).is_err());
    }

    #[test]
    fn validate_catches_deserialized_dims() {
        let bad: SyntheticProblem =
            serde_json::from_value(serde_json::json!({"hartmann": {"dim": 5}})).unwrap();
        assert!(bad.validate().is_err());
        let bad: SyntheticProblem =
            serde_json::from_value(serde_json::json!({"ackley": {"dim": 0}})).unwrap();
        assert!(bad.validate().is_err());

        assert!(SyntheticProblem::Branin.validate().is_ok());
        assert!(SyntheticProblem::Ackley { dim: 3 }.validate().is_ok());
    }

    #[test]
    fn constrained_hartmann_slack() {
        let problem = SyntheticProblem::constrained_hartmann(6).unwrap();
        assert_eq!(problem.num_constraints(), 1);

        let x = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let slack = problem.evaluate_slack_true(&x).unwrap();
        let norm = (0.01f64 + 0.04 + 0.09 + 0.16 + 0.25 + 0.36).sqrt();
        assert_eq!(slack.len(), 1);
        assert!((slack[0] - (1.0 - norm)).abs() < 1e-12);

        let objective = problem.evaluate_true(&x).unwrap();
        let plain = SyntheticProblem::hartmann(6).unwrap().evaluate_true(&x).unwrap();
        assert_eq!(objective, plain);
    }

    #[test]
    fn wrong_point_length_is_rejected() {
        let problem = SyntheticProblem::Branin;
        assert!(problem.evaluate_true(&[0.0]).is_err());
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_value(SyntheticProblem::Hartmann { dim: 6 }).unwrap();
        assert_eq!(json, serde_json::json!({"hartmann": {"dim": 6}}));
        let back: SyntheticProblem = serde_json::from_value(serde_json::json!("branin")).unwrap();
        assert_eq!(back, SyntheticProblem::Branin);
    }
}
