//! Built-in FreeSurfer task schemas and the registry that serves them.

mod mri;
mod mris;
mod recon_all;
mod tools;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::error::FstaskError;
use crate::parameter::{Formatter, ParameterSpec};
use crate::schema::TaskSchema;
use crate::value::SemanticType;

/// Task schemas keyed by task name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tasks: BTreeMap<String, Arc<TaskSchema>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide read-only registry of the built-in tasks.
    pub fn builtin() -> Result<&'static Catalog, FstaskError> {
        static BUILTIN: OnceLock<Result<Catalog, String>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Catalog::with_builtin_tasks().map_err(|err| err.to_string()))
            .as_ref()
            .map_err(|msg| FstaskError::Schema(msg.clone()))
    }

    /// Builds a fresh catalog holding every built-in task.
    pub fn with_builtin_tasks() -> Result<Catalog, FstaskError> {
        let mut catalog = Catalog::new();
        for schema in builtin_schemas()? {
            catalog.insert(schema);
        }
        tracing::debug!(tasks = catalog.len(), "built-in catalog ready");
        Ok(catalog)
    }

    /// Adds `schema`, replacing any task of the same name.
    pub fn insert(&mut self, schema: TaskSchema) -> Option<Arc<TaskSchema>> {
        let name = schema.name().to_string();
        let previous = self.tasks.insert(name.clone(), Arc::new(schema));
        if previous.is_some() {
            tracing::warn!(task = %name, "task definition replaces an existing task");
        }
        previous
    }

    pub fn extend(&mut self, schemas: impl IntoIterator<Item = TaskSchema>) {
        for schema in schemas {
            self.insert(schema);
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<TaskSchema>, FstaskError> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| FstaskError::UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Tasks in name order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskSchema> {
        self.tasks.values().map(Arc::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn builtin_schemas() -> Result<Vec<TaskSchema>, FstaskError> {
    Ok(vec![
        mri::convert()?,
        mri::vol2vol()?,
        mri::binarize()?,
        mri::coreg()?,
        mri::robust_register()?,
        mri::robust_template()?,
        mri::label2vol()?,
        mri::aparc2aseg()?,
        mri::surf2surf()?,
        mris::expand()?,
        mris::anatomical_stats()?,
        mris::ca_label()?,
        mris::ca_train()?,
        mris::preproc()?,
        tools::tkregister2()?,
        tools::gtmseg()?,
        recon_all::recon_all()?,
        recon_all::base()?,
        recon_all::long()?,
    ])
}

fn text(name: &str, help: &str) -> ParameterSpec {
    ParameterSpec::new(name, SemanticType::String).with_help(help)
}

fn path(name: &str, help: &str) -> ParameterSpec {
    ParameterSpec::new(name, SemanticType::Path).with_help(help)
}

fn switch(name: &str, help: &str, flag: &str) -> ParameterSpec {
    ParameterSpec::new(name, SemanticType::Boolean)
        .with_help(help)
        .argstr(flag)
}

fn integer(name: &str, help: &str) -> ParameterSpec {
    ParameterSpec::new(name, SemanticType::Integer).with_help(help)
}

fn number(name: &str, help: &str) -> ParameterSpec {
    ParameterSpec::new(name, SemanticType::Number).with_help(help)
}

fn hemisphere_positional(position: i32) -> ParameterSpec {
    text("hemisphere", "process left or right hemisphere")
        .mandatory()
        .argstr("")
        .position(position)
        .allowed(["lh", "rh"])
}

/// `lookup` table shared by the robust registration tools.
fn internal_datatype() -> ParameterSpec {
    text("internal_datatype", "force internal datatype to float or double")
        .allowed(["float", "double"])
        .formatter(Formatter::lookup([
            ("float", ["--floattype"]),
            ("double", ["--doubleprec"]),
        ]))
}

fn saturation() -> ParameterSpec {
    number("saturation", "set outlier sensitivity or auto-detect it").formatter(
        Formatter::ValueOrFlag {
            flag: "--sat".to_string(),
            fallback: "--satit".to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_lists_every_task_in_name_order() {
        let catalog = Catalog::builtin().unwrap();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(
            names,
            vec![
                "gtmseg",
                "mri_aparc2aseg",
                "mri_binarize",
                "mri_convert",
                "mri_coreg",
                "mri_label2vol",
                "mri_robust_register",
                "mri_robust_template",
                "mri_surf2surf",
                "mri_vol2vol",
                "mris_anatomical_stats",
                "mris_ca_label",
                "mris_ca_train",
                "mris_expand",
                "mris_preproc",
                "recon-all",
                "recon-all-base",
                "recon-all-long",
                "tkregister2",
            ]
        );
    }

    #[test]
    fn unknown_task_is_reported_by_name() {
        let err = Catalog::builtin().unwrap().get("mri_nope").unwrap_err();
        assert!(matches!(err, FstaskError::UnknownTask(ref name) if name == "mri_nope"));
    }

    #[test]
    fn inserting_a_task_with_the_same_name_replaces_it() {
        let mut catalog = Catalog::builtin().unwrap().clone();
        let replacement = TaskSchema::builder("mri_convert", "mri_convert.sh")
            .build()
            .unwrap();
        assert!(catalog.insert(replacement).is_some());
        assert_eq!(catalog.get("mri_convert").unwrap().executable(), "mri_convert.sh");
        assert_eq!(
            Catalog::builtin().unwrap().get("mri_convert").unwrap().executable(),
            "mri_convert"
        );
    }
}
