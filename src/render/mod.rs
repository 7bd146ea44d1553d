pub mod placeholder;
pub mod rewrite;
pub mod walker;

pub use placeholder::{placeholders, resolve, Placeholder, Resolved, Transformation};
pub use rewrite::{rewrite, Rewritten};
pub use walker::{
    execute_plan, materialize, plan_materialize, MaterializeOptions, MaterializePlan,
    PlannedFile, RunSummary,
};
