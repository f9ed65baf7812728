/// Assembly: turns loosely-structured agent output into schema-conformant records.
///
/// Per field: normalize → validate → coerce → one model repair → fallback.
/// Only a broken schema is fatal; everything else is absorbed into diagnostics.
pub mod assembler;
pub mod catalog;
pub mod coercer;
pub mod diagnostics;
pub mod error;
pub mod fallback;
pub mod fragment;
pub mod normalizer;
pub mod prompts;
pub mod repair;
pub mod schema;
pub mod validator;

pub use assembler::{AssemblerOptions, AssemblyOutcome, SchemaAssembler};
pub use catalog::SchemaRegistry;
pub use diagnostics::{RepairDiagnostic, RepairStatus};
pub use error::ConfigurationError;
pub use fragment::{Fragment, FragmentSet, RawValue};
pub use schema::TargetSchema;
