pub mod decision;
pub mod gate;
pub mod policy;

pub use decision::{Decision, Outcome};
pub use gate::Gate;
pub use policy::{PolicyEngine, WHITELISTED};
