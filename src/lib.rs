pub mod dat;
pub mod formulation;
pub mod instance;
pub mod metrics;
pub mod model;
pub mod model_builder;
pub mod oracle;
pub mod tree;
pub(crate) mod variable_registry;

pub use formulation::{build, Formulation, FormulationBuilder, ModelConstructionError, TreeModel};
pub use instance::*;
