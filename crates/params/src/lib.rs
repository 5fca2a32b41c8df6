//! Parameter Panel: named, live-editable values (scalar, color, boolean).
//!
//! # Invariants
//! - Parameter names are unique; a failed registration leaves the panel untouched.
//! - Values change only through [`ParameterPanel::set`], which runs the
//!   parameter's callback synchronously before returning.
//! - There is no implicit binding: each callback writes its own consumers.
//! - Groups are a display concern only.

mod deferred;
mod panel;
mod value;

pub use deferred::DeferredSetup;
pub use panel::{ChangeCallback, Group, GroupId, ParamError, Parameter, ParameterPanel};
pub use value::{ParamKind, ParamValue, ScalarRange};
