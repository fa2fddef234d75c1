//! Test functions whose outcomes come from a trained predictive model.

use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use ob_types::{numeric_param, FunctionError, ObError, ObResult, Parameters, SearchSpace};

use crate::function::BenchmarkTestFunction;
use crate::synthetic::branin_value;

/// Predicted means per outcome, one entry per requested point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub means: HashMap<String, Vec<f64>>,
}

/// A trained model that predicts outcomes for parameter assignments.
pub trait Surrogate: Send + Sync + fmt::Debug {
    fn predict(&self, points: &[Parameters]) -> ObResult<Prediction>;
}

/// Builds a surrogate on demand.
pub type SurrogateFactory = Arc<dyn Fn() -> ObResult<Arc<dyn Surrogate>> + Send + Sync>;

/// A test function backed by a [`Surrogate`].
///
/// The model is either supplied directly or built from a factory, in which
/// case construction can be deferred until the first evaluation. A failed
/// build leaves the function unbuilt and the next evaluation retries.
pub struct SurrogateTestFunction {
    name: String,
    outcome_names: Vec<String>,
    search_space: SearchSpace,
    surrogate: OnceLock<Arc<dyn Surrogate>>,
    factory: Option<SurrogateFactory>,
    failed_builds: AtomicUsize,
}

impl SurrogateTestFunction {
    const BRANIN_GRID_POINTS: usize = 12;

    pub fn new(
        name: impl Into<String>,
        outcome_names: Vec<String>,
        search_space: SearchSpace,
        surrogate: Arc<dyn Surrogate>,
    ) -> Self {
        Self {
            name: name.into(),
            outcome_names,
            search_space,
            surrogate: OnceLock::from(surrogate),
            factory: None,
            failed_builds: AtomicUsize::new(0),
        }
    }

    /// Wrap a factory. With `lazy == false` the surrogate is built now and
    /// build errors are returned immediately.
    pub fn from_factory(
        name: impl Into<String>,
        outcome_names: Vec<String>,
        search_space: SearchSpace,
        factory: SurrogateFactory,
        lazy: bool,
    ) -> ObResult<Self> {
        let function = Self {
            name: name.into(),
            outcome_names,
            search_space,
            surrogate: OnceLock::new(),
            factory: Some(factory),
            failed_builds: AtomicUsize::new(0),
        };
        if !lazy {
            function.surrogate()?;
        }
        Ok(function)
    }

    /// Single-objective surrogate of Branin, fit on a regular grid.
    pub fn soo_branin(lazy: bool) -> ObResult<Self> {
        let factory: SurrogateFactory = Arc::new(|| -> ObResult<Arc<dyn Surrogate>> {
            let surrogate: Arc<dyn Surrogate> =
                Arc::new(RbfSurrogate::branin(Self::BRANIN_GRID_POINTS)?);
            Ok(surrogate)
        });
        Self::from_factory(
            "branin",
            vec!["branin".to_string()],
            SearchSpace::new()
                .add_float("x0", -5.0, 10.0)
                .add_float("x1", 0.0, 15.0),
            factory,
            lazy,
        )
    }

    pub fn outcome_names(&self) -> &[String] {
        &self.outcome_names
    }

    pub fn is_built(&self) -> bool {
        self.surrogate.get().is_some()
    }

    /// Number of factory calls that returned an error.
    pub fn failed_builds(&self) -> usize {
        self.failed_builds.load(Ordering::Relaxed)
    }

    /// The model, building it first if needed.
    pub fn surrogate(&self) -> ObResult<&Arc<dyn Surrogate>> {
        if let Some(surrogate) = self.surrogate.get() {
            return Ok(surrogate);
        }
        let factory = self.factory.as_ref().ok_or_else(|| {
            ObError::from(FunctionError::SurrogateFailed {
                message: format!("{} has neither a surrogate nor a factory", self.name),
            })
        })?;

        match self.failed_builds() {
            0 => info!("Building surrogate for {}", self.name),
            failed => warn!(
                "Retrying surrogate build for {} after {failed} failed attempt(s)",
                self.name
            ),
        }
        let built = match (**factory)() {
            Ok(built) => built,
            Err(e) => {
                self.failed_builds.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };
        // A concurrent build may have won; either model is valid.
        let _ = self.surrogate.set(built);
        self.surrogate.get().ok_or_else(|| {
            ObError::Internal(format!("surrogate for {} was not stored", self.name))
        })
    }
}

impl BenchmarkTestFunction for SurrogateTestFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_outcomes(&self) -> usize {
        self.outcome_names.len()
    }

    fn evaluate_true(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        let prediction = self.surrogate()?.predict(std::slice::from_ref(params))?;
        self.outcome_names
            .iter()
            .map(|outcome| {
                prediction
                    .means
                    .get(outcome)
                    .and_then(|means| means.first().copied())
                    .ok_or_else(|| {
                        FunctionError::MissingOutcome {
                            outcome: outcome.clone(),
                        }
                        .into()
                    })
            })
            .collect()
    }

    fn default_search_space(&self) -> SearchSpace {
        self.search_space.clone()
    }
}

impl Clone for SurrogateTestFunction {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            outcome_names: self.outcome_names.clone(),
            search_space: self.search_space.clone(),
            surrogate: self.surrogate.clone(),
            factory: self.factory.clone(),
            failed_builds: AtomicUsize::new(self.failed_builds()),
        }
    }
}

impl PartialEq for SurrogateTestFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.outcome_names == other.outcome_names
    }
}

impl fmt::Debug for SurrogateTestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrogateTestFunction")
            .field("name", &self.name)
            .field("outcome_names", &self.outcome_names)
            .field("built", &self.is_built())
            .finish()
    }
}

// ---------- RBF surrogate ----------

/// Cubic radial-basis-function interpolant with a linear polynomial tail, one
/// coefficient vector per outcome. Inputs are scaled to the unit box before
/// distances are taken.
///
/// The cubic kernel is only conditionally positive definite, so the tail is
/// required: coefficients solve `[Φ P; Pᵀ 0] [λ; c] = [f; 0]` where row `i` of
/// `P` is `[1, x_i]`.
#[derive(Debug, Clone)]
pub struct RbfSurrogate {
    parameter_names: Vec<String>,
    bounds: Vec<(f64, f64)>,
    samples: Vec<Vec<f64>>,
    coefficients: HashMap<String, DVector<f64>>,
}

impl RbfSurrogate {
    const REGULARIZATION: f64 = 1e-10;

    /// Fit an interpolant through `samples` (rows ordered like
    /// `parameter_names`) and the per-outcome observations.
    pub fn fit(
        parameter_names: Vec<String>,
        bounds: Vec<(f64, f64)>,
        samples: Vec<Vec<f64>>,
        observations: HashMap<String, Vec<f64>>,
    ) -> ObResult<Self> {
        let fail = |message: String| ObError::from(FunctionError::SurrogateFailed { message });

        if samples.is_empty() {
            return Err(fail("no training samples".to_string()));
        }
        if bounds.len() != parameter_names.len()
            || samples.iter().any(|s| s.len() != parameter_names.len())
        {
            return Err(fail("sample width does not match parameter names".to_string()));
        }

        let scaled: Vec<Vec<f64>> = samples.iter().map(|s| scale(s, &bounds)).collect();
        let system = interpolation_matrix(&scaled);

        let mut coefficients = HashMap::with_capacity(observations.len());
        for (outcome, values) in observations {
            if values.len() != scaled.len() {
                return Err(fail(format!(
                    "{} observations for {outcome}, expected {}",
                    values.len(),
                    scaled.len()
                )));
            }
            let mut rhs = values;
            rhs.resize(system.nrows(), 0.0);
            let f = DVector::from_vec(rhs);
            let beta = match system.clone().lu().solve(&f) {
                Some(beta) => beta,
                None => system
                    .clone()
                    .svd(true, true)
                    .solve(&f, 1e-10)
                    .map_err(|e| fail(format!("could not solve for {outcome}: {e}")))?,
            };
            coefficients.insert(outcome, beta);
        }

        debug!(
            "Fit RBF surrogate on {} samples, {} outcomes",
            scaled.len(),
            coefficients.len()
        );

        Ok(Self {
            parameter_names,
            bounds,
            samples: scaled,
            coefficients,
        })
    }

    /// Surrogate of Branin fit on a `points_per_axis` x `points_per_axis`
    /// grid spanning the domain, corners included.
    pub fn branin(points_per_axis: usize) -> ObResult<Self> {
        if points_per_axis < 2 {
            return Err(FunctionError::SurrogateFailed {
                message: format!(
                    "a Branin grid needs at least 2 points per axis, got {points_per_axis}"
                ),
            }
            .into());
        }
        let bounds = vec![(-5.0, 10.0), (0.0, 15.0)];
        let last = (points_per_axis - 1) as f64;
        let step = |(lo, hi): (f64, f64), k: usize| lo + (hi - lo) * k as f64 / last;
        let samples: Vec<Vec<f64>> = (0..points_per_axis)
            .flat_map(|i| (0..points_per_axis).map(move |j| (i, j)))
            .map(|(i, j)| vec![step(bounds[0], i), step(bounds[1], j)])
            .collect();
        let values: Vec<f64> = samples.iter().map(|s| branin_value(s[0], s[1])).collect();

        Self::fit(
            vec!["x0".to_string(), "x1".to_string()],
            bounds,
            samples,
            HashMap::from([("branin".to_string(), values)]),
        )
    }

    fn predict_point(&self, x: &[f64]) -> HashMap<String, f64> {
        let x = scale(x, &self.bounds);
        let basis: Vec<f64> = self
            .samples
            .iter()
            .map(|s| cubic(euclidean_distance(&x, s)))
            .chain(std::iter::once(1.0))
            .chain(x.iter().copied())
            .collect();
        self.coefficients
            .iter()
            .map(|(outcome, beta)| {
                let value = beta.iter().zip(basis.iter()).map(|(b, phi)| b * phi).sum::<f64>();
                (outcome.clone(), value)
            })
            .collect()
    }
}

impl Surrogate for RbfSurrogate {
    fn predict(&self, points: &[Parameters]) -> ObResult<Prediction> {
        let mut prediction = Prediction::default();
        for params in points {
            let x = self
                .parameter_names
                .iter()
                .map(|name| numeric_param(params, name))
                .collect::<ObResult<Vec<f64>>>()?;
            for (outcome, value) in self.predict_point(&x) {
                prediction.means.entry(outcome).or_default().push(value);
            }
        }
        Ok(prediction)
    }
}

fn scale(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(bounds)
        .map(|(v, (lo, hi))| (v - lo) / (hi - lo))
        .collect()
}

fn cubic(r: f64) -> f64 {
    r.powi(3)
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Kernel block bordered by the linear tail `[1, x]` of each sample.
fn interpolation_matrix(samples: &[Vec<f64>]) -> DMatrix<f64> {
    let m = samples.len();
    let n = m + samples.first().map_or(0, Vec::len) + 1;
    DMatrix::from_fn(n, n, |i, j| match (i < m, j < m) {
        (true, true) => {
            let value = cubic(euclidean_distance(&samples[i], &samples[j]));
            if i == j {
                value + RbfSurrogate::REGULARIZATION
            } else {
                value
            }
        }
        (true, false) => linear_tail(&samples[i], j - m),
        (false, true) => linear_tail(&samples[j], i - m),
        (false, false) => 0.0,
    })
}

fn linear_tail(x: &[f64], k: usize) -> f64 {
    match k {
        0 => 1.0,
        _ => x[k - 1],
    }
}
