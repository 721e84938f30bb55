mod bindings;
mod runtime;

pub use runtime::{BoaPreparedScript, BoaScriptRuntime, ExecutionLimits};
