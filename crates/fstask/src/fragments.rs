//! Parameter groups shared by many FreeSurfer tasks.

use crate::parameter::ParameterSpec;
use crate::schema::{DerivedKind, DerivedOutput};
use crate::value::SemanticType;

pub const SUBJECTS_DIR: &str = "subjects_dir";
pub const HEMISPHERE: &str = "hemisphere";

/// Subjects directory passed with the tool's own flag (`--sd`, `-sd`, `-sdir`).
pub fn subjects_dir(flag: &str) -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new(SUBJECTS_DIR, SemanticType::Path)
            .with_help("subjects directory; defaults to the SUBJECTS_DIR environment variable")
            .argstr(flag),
    ]
}

pub fn hemisphere() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new(HEMISPHERE, SemanticType::String)
            .with_help("process left (lh) or right (rh) hemisphere")
            .argstr("--hemi")
            .allowed(["lh", "rh"]),
    ]
}

/// Derived `subjects_dir` output backed by the [`subjects_dir`] parameter.
pub fn subjects_dir_output() -> DerivedOutput {
    DerivedOutput {
        name: SUBJECTS_DIR.to_string(),
        help: "subjects directory used by the run".to_string(),
        kind: DerivedKind::SubjectsDir {
            parameter: SUBJECTS_DIR.to_string(),
        },
    }
}

/// Names accepted in a definition file's `include` list.
pub fn by_name(name: &str) -> Option<Vec<ParameterSpec>> {
    match name {
        SUBJECTS_DIR => Some(subjects_dir("--sd")),
        HEMISPHERE => Some(hemisphere()),
        _ => None,
    }
}
