//! # ob-functions
//!
//! Test functions evaluated by the OptBench runner.
//!
//! Three interchangeable variants share the [`BenchmarkTestFunction`]
//! contract: closed-form synthetic problems ([`BoTorchTestFunction`]),
//! functions of a parameter map ([`ParamBasedTestFunction`]) and functions
//! backed by a trained model ([`SurrogateTestFunction`]).

mod botorch;
mod function;
mod param_based;
mod surrogate;
pub mod synthetic;

pub use botorch::BoTorchTestFunction;
pub use function::{BenchmarkTestFunction, TestFunction};
pub use param_based::ParamBasedTestFunction;
pub use surrogate::{
    Prediction, RbfSurrogate, Surrogate, SurrogateFactory, SurrogateTestFunction,
};
pub use synthetic::SyntheticProblem;
