use super::{integer, path, switch, text};
use crate::error::FstaskError;
use crate::fragments;
use crate::parameter::{Formatter, ParameterSpec};
use crate::schema::TaskSchema;
use crate::value::SemanticType;

pub(super) fn tkregister2() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("tkregister2", "tkregister2 --noedit")
        .describe("Linear registration between two volumes for the anatomical stream.")
        .param(path("moving_volume", "moving volume").mandatory().argstr("--mov"))
        .param(path("target_volume", "target volume").mandatory().argstr("--targ"))
        .param(
            text("output_registration_file", "output registration file")
                .argstr("--reg")
                .output_template("{moving_volume}_tkregister2.dat")
                .keep_extension(false),
        )
        .param(switch(
            "register_from_headers",
            "compute registration from headers",
            "--regheader",
        ))
        .param(switch(
            "align_volume_centers",
            "register from headers and align volume centers",
            "--regheader-center",
        ))
        .build()
}

pub(super) fn gtmseg() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("gtmseg", "gtmseg")
        .describe("Create a high-resolution segmentation for partial volume correction.")
        .param(text("subject_id", "subject identifier").mandatory().argstr("--s"))
        .param(
            text(
                "output_volume",
                "output volume relative to the subject's mri directory",
            )
            .argstr("--o")
            .default_value("gtmseg.mgz")
            .output(),
        )
        .param(
            ParameterSpec::new("generate_segmentation", SemanticType::Boolean)
                .with_help("generate or use subject's head segmentation")
                .mandatory()
                .xor(&["head_segmentation"])
                .formatter(Formatter::Toggle {
                    on: "--xcerseg".to_string(),
                    off: "--no-xcerseg".to_string(),
                }),
        )
        .param(
            path("head_segmentation", "custom head segmentation")
                .mandatory()
                .argstr("--head")
                .xor(&["generate_segmentation"]),
        )
        .param(
            switch(
                "no_pons_segmentation",
                "exclude pons from segmentation",
                "--no-pons",
            )
            .requires(&["generate_segmentation"]),
        )
        .param(
            switch(
                "no_vermis_segmentation",
                "exclude vermis from segmentation",
                "--no-vermis",
            )
            .requires(&["generate_segmentation"]),
        )
        .param(text("colortable", "use custom colortable").argstr("--ctab"))
        .param(integer("upsampling_factor", "upsampling factor (defaults to 2)").argstr("--usf"))
        .param(
            integer(
                "output_upsampling_factor",
                "output upsampling factor (if different from upsampling factor)",
            )
            .argstr("--output-usf"),
        )
        .param(switch(
            "keep_hypointensities",
            "do not relabel hypointensities as white matter",
            "--keep-hypo",
        ))
        .param(switch(
            "keep_corpus_callosum",
            "do not relabel corpus callosum as white matter",
            "--keep-cc",
        ))
        .param(switch(
            "subsegment_white_matter",
            "subsegment white matter into lobes",
            "--subsegwm",
        ))
        .fragment(fragments::subjects_dir("--sd"))
        .derived(fragments::subjects_dir_output())
        .build()
}
