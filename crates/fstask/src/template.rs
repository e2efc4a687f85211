//! `{name}` placeholder handling and output template resolution.
//!
//! Templated parameters that the caller left unbound are filled in by
//! repeated passes over the schema in declaration order. A template may
//! reference another templated parameter; a pass that makes no progress
//! while templates are still pending means the templates form a cycle.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::InvocationError;
use crate::parameter::ParameterSpec;
use crate::params::ParameterSet;
use crate::schema::TaskSchema;

/// Extensions made of several dot-separated parts.
const COMPOUND_EXTENSIONS: &[&str] = &[".nii.gz", ".tar.gz", ".mgh.gz", ".niml.dset"];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// Names referenced by `{name}` placeholders, in order of appearance.
pub fn placeholders(text: &str) -> impl Iterator<Item = &str> + '_ {
    placeholder_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replaces every placeholder using `lookup`. Returns the first name
/// `lookup` could not provide as the error.
pub fn substitute<F>(text: &str, mut lookup: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        rendered.push_str(&text[last..whole.start()]);
        let value = lookup(name.as_str()).ok_or_else(|| name.as_str().to_string())?;
        rendered.push_str(&value);
        last = whole.end();
    }
    rendered.push_str(&text[last..]);
    Ok(rendered)
}

/// Splits `dir/name.ext` into (`dir/name`, `.ext`), honouring compound
/// extensions such as `.nii.gz`. Dotfiles and extensionless names return
/// an empty extension.
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let file_name = &path[name_start..];

    for ext in COMPOUND_EXTENSIONS {
        if file_name.len() > ext.len() && file_name.ends_with(ext) {
            let split = path.len() - ext.len();
            return (&path[..split], &path[split..]);
        }
    }

    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            (&path[..split], &path[split..])
        }
        _ => (path, ""),
    }
}

/// Returns a working copy of `params` with defaults applied and every
/// unbound templated parameter resolved. The caller's set is untouched.
pub fn resolve_templates(
    schema: &TaskSchema,
    params: &ParameterSet,
    output_dir: Option<&Path>,
) -> Result<ParameterSet, InvocationError> {
    let mut working = params.clone();
    for spec in schema.parameters() {
        if let Some(default) = &spec.default {
            if !working.contains(&spec.name) {
                working.insert(spec.name.clone(), default.clone());
            }
        }
    }

    let mut pending: Vec<&ParameterSpec> = schema
        .parameters()
        .iter()
        .filter(|spec| spec.is_templated() && !working.contains(&spec.name))
        .collect();

    let mut pass = 0;
    while !pending.is_empty() {
        pass += 1;
        let waiting: HashSet<&str> = pending.iter().map(|spec| spec.name.as_str()).collect();
        let mut blocked = Vec::new();

        for spec in pending {
            match render_output_template(schema, spec, &working, &waiting)? {
                Some(path) => {
                    let path = place_in_output_dir(path, output_dir);
                    tracing::debug!(parameter = %spec.name, %path, pass, "resolved output template");
                    working.insert(spec.name.clone(), path);
                }
                None => blocked.push(spec),
            }
        }

        if blocked.len() == waiting.len() {
            return Err(InvocationError::TemplateCycle {
                parameters: blocked.iter().map(|spec| spec.name.clone()).collect(),
            });
        }
        pending = blocked;
    }

    Ok(working)
}

/// `Ok(None)` means the template waits on another pending template.
fn render_output_template(
    schema: &TaskSchema,
    spec: &ParameterSpec,
    working: &ParameterSet,
    waiting: &HashSet<&str>,
) -> Result<Option<String>, InvocationError> {
    let Some(template) = spec.output_template.as_deref() else {
        return Ok(None);
    };

    for name in placeholders(template) {
        if working.contains(name) {
            continue;
        }
        if waiting.contains(name) && schema.parameter(name).is_some() {
            return Ok(None);
        }
        return Err(InvocationError::TemplateSubstitutionError {
            parameter: spec.name.clone(),
            missing: name.to_string(),
        });
    }

    let trailing = match placeholder_regex().find_iter(template).last() {
        Some(last) => &template[last.end()..],
        None => template,
    };
    let template_sets_extension = trailing.contains('.');
    let move_extension = spec.keep_extension && !template_sets_extension;
    let strip_extension = !spec.keep_extension || move_extension;

    let mut carried_extension: Option<String> = None;
    let rendered = substitute(template, |name| {
        let value = working.get(name)?.to_string();
        if !strip_extension {
            return Some(value);
        }
        let (stem, ext) = split_extension(&value);
        if move_extension && carried_extension.is_none() && !ext.is_empty() {
            carried_extension = Some(ext.to_string());
        }
        Some(stem.to_string())
    })
    .map_err(|missing| InvocationError::TemplateSubstitutionError {
        parameter: spec.name.clone(),
        missing,
    })?;

    Ok(Some(match carried_extension {
        Some(ext) => format!("{rendered}{ext}"),
        None => rendered,
    }))
}

fn place_in_output_dir(path: String, output_dir: Option<&Path>) -> String {
    let Some(dir) = output_dir else {
        return path;
    };
    let candidate = Path::new(&path);
    if candidate.is_absolute() {
        return path;
    }
    match candidate.file_name() {
        Some(file_name) => dir.join(file_name).to_string_lossy().into_owned(),
        None => path,
    }
}
