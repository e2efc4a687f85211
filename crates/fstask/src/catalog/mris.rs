use super::{hemisphere_positional, number, path, switch, text};
use crate::error::FstaskError;
use crate::fragments;
use crate::parameter::{Formatter, ParameterSpec};
use crate::schema::TaskSchema;
use crate::value::SemanticType;

pub(super) fn expand() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mris_expand", "mris_expand")
        .describe("Expand a surface outwards while keeping it smooth and free of self-intersections.")
        .param(
            path("input_surface", "input surface")
                .mandatory()
                .argstr("")
                .position(-3),
        )
        .param(
            number("distance", "distance in millimeters")
                .mandatory()
                .argstr("")
                .position(-2),
        )
        .param(
            text("output_surface", "output surface")
                .argstr("")
                .position(-1)
                .output_template("{input_surface}_expand"),
        )
        .param(switch(
            "use_thickness",
            "treat distance as fraction of cortical thickness",
            "-thickness",
        ))
        .param(path("label_file", "input labels").argstr("-label"))
        .build()
}

pub(super) fn anatomical_stats() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mris_anatomical_stats", "mris_anatomical_stats")
        .describe("Compute anatomical properties of a cortical surface.")
        .param(
            text("subject_id", "subject identifier")
                .mandatory()
                .argstr("")
                .position(-3),
        )
        .param(hemisphere_positional(-2))
        .param(
            text("surface_name", "surface name")
                .argstr("")
                .position(-1)
                .default_value("white"),
        )
        .param(
            path("label_file", "restrict computation to each label in this file").argstr("-l"),
        )
        .param(
            path(
                "annotation_file",
                "compute statistics for each annotation in this file",
            )
            .argstr("-a"),
        )
        .param(
            text("output_stats_file", "output stats file in table format")
                .argstr("-f")
                .output_template("{hemisphere}.{surface_name}.stats"),
        )
        .param(
            text("output_log_file", "output stats file in log format")
                .argstr("-log")
                .output_template("{hemisphere}.{surface_name}.log"),
        )
        .param(
            path("output_colortable_file", "write colortable for annotations")
                .argstr("-c")
                .requires(&["annotation_file"])
                .output(),
        )
        .param(
            switch("no_global_stats", "do not write global stats", "-noglobal")
                .requires(&["output_stats_file"]),
        )
        .param(
            switch("no_header", "do not write a header", "-noheader")
                .requires(&["output_log_file"]),
        )
        .fragment(fragments::subjects_dir("-sdir"))
        .derived(fragments::subjects_dir_output())
        .build()
}

pub(super) fn ca_label() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mris_ca_label", "mris_ca_label")
        .describe("Assign an anatomical label to each cortical surface vertex.")
        .param(
            text("subject_id", "subject to process")
                .mandatory()
                .argstr("")
                .position(-5),
        )
        .param(hemisphere_positional(-4))
        .param(
            path("canonical_surface", "canonical surface file")
                .mandatory()
                .argstr("")
                .position(-3),
        )
        .param(
            path("surface_atlas", "surface atlas file")
                .mandatory()
                .argstr("")
                .position(-2),
        )
        .param(text("atlas_name", "atlas name").default_value("atlas"))
        .param(
            text("output_annotation_file", "output surface annotation file")
                .argstr("")
                .position(-1)
                .output_template("{hemisphere}.{atlas_name}.annot"),
        )
        .fragment(fragments::subjects_dir("-sdir"))
        .param(path("aseg_volume", "use aseg volume to correct midline").argstr("-aseg"))
        .param(
            text("original_surface", "original surface")
                .argstr("-orig")
                .default_value("smoothwm"),
        )
        .param(switch(
            "no_covariance",
            "set covariance matrices to identity",
            "-novar",
        ))
        .param(path("parcellation_table", "parcellation table").argstr("-t"))
        .param(path("cortex_label_file", "cortex label file").argstr("-l"))
        .derived(fragments::subjects_dir_output())
        .build()
}

pub(super) fn ca_train() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mris_ca_train", "mris_ca_train")
        .describe("Train a cortical parcellation atlas from manually labelled subjects.")
        .param(hemisphere_positional(-5))
        .param(
            path("canonical_surface", "canonical surface")
                .mandatory()
                .argstr("")
                .position(-4),
        )
        .param(
            path("annotation_file", "annotation file")
                .mandatory()
                .argstr("")
                .position(-3),
        )
        .param(
            ParameterSpec::new("subject_ids", SemanticType::StringList)
                .with_help("subject identifiers")
                .mandatory()
                .argstr("...")
                .position(-2),
        )
        .param(
            text("output_surface_atlas", "output surface atlas file")
                .argstr("")
                .position(-1)
                .output_template("{hemisphere}.my_atlas.gcs"),
        )
        .fragment(fragments::subjects_dir("-sdir"))
        .param(
            text("original_surface", "original surface")
                .argstr("-orig")
                .default_value("smoothwm"),
        )
        .param(text("parcellation_table", "parcellation table").argstr("-t"))
        .param(
            ParameterSpec::new("num_subjects", SemanticType::Integer)
                .with_help("number of input subjects to process")
                .readonly()
                .formatter(Formatter::Count {
                    flag: "-n".to_string(),
                    source: "subject_ids".to_string(),
                }),
        )
        .derived(fragments::subjects_dir_output())
        .build()
}

pub(super) fn preproc() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mris_preproc", "mris_preproc")
        .describe("Resample and concatenate surface data onto a common subject.")
        .param(
            text("output_surface", "output surface")
                .argstr("--out")
                .output_template("{target_subject_id}_{hemisphere}.mgz"),
        )
        .param(
            text("target_subject_id", "subject identifier to use as common space")
                .mandatory()
                .argstr("--target"),
        )
        .param(
            text("hemisphere", "process left or right hemisphere")
                .mandatory()
                .argstr("--hemi")
                .allowed(["lh", "rh"]),
        )
        .param(text("measure", "use measure as input").argstr("--meas"))
        .param(
            ParameterSpec::new("source_subject_ids", SemanticType::StringList)
                .with_help("source subjects used as input")
                .argstr("--s ...")
                .requires(&["measure"])
                .xor(&["fsgd_file"]),
        )
        .param(
            path("fsgd_file", "fsgd file containing the source subjects")
                .argstr("--fsgd")
                .xor(&["source_subject_ids"]),
        )
        .param(
            ParameterSpec::new("input_surface_paths", SemanticType::PathList)
                .with_help("paths to input surface measure files")
                .argstr("--isp ...")
                .requires(&["fsgd_file"]),
        )
        .param(
            text(
                "source_format",
                "source format of input surface measure files",
            )
            .argstr("--srcfmt")
            .requires(&["input_surface_paths"]),
        )
        .param(number("target_smoothing", "smooth target surface by X mm").argstr("--fwhm"))
        .param(number("source_smoothing", "smooth source surface by X mm").argstr("--fwhm-src"))
        .param(switch(
            "compute_paired_differences",
            "compute paired differences",
            "--paired-diff",
        ))
        .fragment(fragments::subjects_dir("--sd"))
        .build()
}
