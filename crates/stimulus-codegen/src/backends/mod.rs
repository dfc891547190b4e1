//! Concrete target backends.

mod debug;
mod java;
mod python;
mod r;
mod shell;

pub use debug::{ListTypesBackend, ValidatorBackend};
pub use java::{JavaBackend, JavaGlueBackend};
pub use python::{PythonCTypesBackend, PythonTypedWrapperBackend};
pub use r::{RGlueBackend, RNamespaceBackend, RWrapperBackend};
pub use shell::{ShellBackend, ShellLinksBackend};
