pub mod errors;
pub mod parameters;
pub mod search;
pub mod trial;

pub use errors::*;
pub use parameters::*;
pub use search::*;
pub use trial::*;
