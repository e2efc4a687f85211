//! Declarative FreeSurfer task schemas and the compiler that turns bound
//! parameters into command lines.

pub mod catalog;
pub mod compile;
pub mod definition;
pub mod error;
pub mod fragments;
pub mod outputs;
pub mod parameter;
pub mod params;
pub mod schema;
pub mod template;
pub mod validation;
pub mod value;

pub use catalog::Catalog;
pub use compile::{
    CompileOptions, CompiledInvocation, compile, compile_resolved, compile_tokens, prepare,
};
pub use definition::{
    ParameterDef, TaskDefinition, definition_json_schema, load_definition,
};
pub use error::{FstaskError, InvocationError};
pub use outputs::{EnvSource, ProcessEnv, derive_outputs, extract_outputs};
pub use parameter::{ArgTemplate, Formatter, ParameterSpec};
pub use params::ParameterSet;
pub use schema::{DerivedKind, DerivedOutput, TaskSchema, TaskSchemaBuilder};
pub use template::resolve_templates;
pub use validation::{ReportMode, validate, violations};
pub use value::{ParamValue, SemanticType};
