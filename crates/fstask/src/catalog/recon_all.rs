//! The three recon-all workflows: cross-sectional, base template and
//! longitudinal. They share the directive, seed point and resource options.

use super::{integer, path, switch, text};
use crate::error::FstaskError;
use crate::fragments;
use crate::parameter::ParameterSpec;
use crate::schema::{DerivedOutput, TaskSchema, TaskSchemaBuilder};
use crate::value::SemanticType;

const DIRECTIVES: [&str; 7] = [
    "all",
    "autorecon1",
    "autorecon2",
    "autorecon2-cp",
    "autorecon2-wm",
    "autorecon2-pial",
    "autorecon3",
];

fn seed_point(name: &str, help: &str, flag: &str) -> ParameterSpec {
    ParameterSpec::new(
        name,
        SemanticType::Tuple(vec![SemanticType::Number; 3]),
    )
    .with_help(help)
    .argstr(flag)
}

fn shared_options() -> Vec<ParameterSpec> {
    vec![
        text("directive", "process directive")
            .argstr("-{directive}")
            .allowed(DIRECTIVES)
            .default_value("all"),
        path("custom_brain_mask", "custom brain mask").argstr("-xmask"),
        text("hemisphere", "restrict processing to this hemisphere")
            .argstr("-hemi")
            .allowed(["lh", "rh"])
            .xor(&["parallel"]),
        seed_point("pons_seed_point", "seed point for pons", "-pons-crs"),
        seed_point(
            "corpus_callosum_seed_point",
            "seed point for corpus callosum",
            "-cc-crs",
        ),
        seed_point(
            "left_hemisphere_seed_point",
            "seed point for left hemisphere",
            "-lh-crs",
        ),
        seed_point(
            "right_hemisphere_seed_point",
            "seed point for right hemisphere",
            "-rh-crs",
        ),
        path("custom_talairach_atlas", "use a custom talairach atlas").argstr("-custom-tal-atlas"),
        switch("deface", "deface subject", "-deface"),
        switch(
            "no_subcortical_segmentation",
            "skip subcortical segmentation steps",
            "-nosubcortseg",
        ),
        switch(
            "conform_width_to_256",
            "conform image dimensions to 256 when running mri_convert",
            "-cw256",
        ),
        switch(
            "cache_files_for_qdec",
            "pre-compute files required by the Qdec utility",
            "-qcache",
        ),
        switch(
            "parallel",
            "process both hemispheres in parallel",
            "-parallel",
        )
        .xor(&["hemisphere"]),
        integer("num_threads", "set number of threads to use").argstr("-threads"),
    ]
}

/// Appends the shared options, the subjects directory and the outputs every
/// workflow reports.
fn finish(builder: TaskSchemaBuilder, subject: &str) -> Result<TaskSchema, FstaskError> {
    builder
        .fragment(shared_options())
        .fragment(fragments::subjects_dir("-sd"))
        .derived(
            DerivedOutput::template("subject_id", subject)
                .with_help("subject identifier where outputs are written"),
        )
        .derived(fragments::subjects_dir_output())
        .build()
}

pub(super) fn recon_all() -> Result<TaskSchema, FstaskError> {
    let builder = TaskSchema::builder("recon-all", "recon-all")
        .describe("Cross-sectional cortical reconstruction of a single subject.")
        .param(text("subject_id", "subject identifier").mandatory().argstr("-subjid"))
        .param(
            path("t1_volume", "T1 volume")
                .argstr("-i")
                .xor(&["t1_volumes"]),
        )
        .param(
            ParameterSpec::new("t1_volumes", SemanticType::PathList)
                .with_help("T1 volumes")
                .argstr("-i...")
                .xor(&["t1_volume"]),
        )
        .param(path("t2_volume", "T2 volume").argstr("-t2"))
        .param(path("flair_volume", "FLAIR volume").argstr("-flair"));
    finish(builder, "{subject_id}")
}

pub(super) fn base() -> Result<TaskSchema, FstaskError> {
    let builder = TaskSchema::builder("recon-all-base", "recon-all")
        .describe("Create and process the unbiased base template of a longitudinal study.")
        .param(
            text("base_template_id", "base template identifier")
                .mandatory()
                .argstr("-base"),
        )
        .param(
            ParameterSpec::new("base_timepoint_ids", SemanticType::StringList)
                .with_help("base timepoint identifiers")
                .argstr("-base-tp..."),
        );
    finish(builder, "{base_template_id}")
}

pub(super) fn long() -> Result<TaskSchema, FstaskError> {
    let builder = TaskSchema::builder("recon-all-long", "recon-all")
        .describe("Process one timepoint longitudinally against its base template.")
        .param(
            text("longitudinal_timepoint_id", "longitudinal timepoint identifier")
                .mandatory()
                .argstr("-long {longitudinal_timepoint_id} {longitudinal_template_id}")
                .requires(&["longitudinal_template_id"]),
        )
        .param(text(
            "longitudinal_template_id",
            "longitudinal template identifier",
        ));
    finish(
        builder,
        "{longitudinal_timepoint_id}.long.{longitudinal_template_id}",
    )
}
