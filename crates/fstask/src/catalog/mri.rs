use super::{integer, internal_datatype, number, path, saturation, switch, text};
use crate::error::FstaskError;
use crate::fragments;
use crate::parameter::{Formatter, ParameterSpec};
use crate::schema::TaskSchema;
use crate::value::SemanticType;

pub(super) fn convert() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_convert", "mri_convert")
        .describe("General purpose utility for converting between different file formats.")
        .param(
            path("input_volume", "input volume")
                .mandatory()
                .argstr("")
                .position(-2),
        )
        .param(
            text("output_volume", "output volume")
                .argstr("")
                .position(-1)
                .output_template("{input_volume}_converted.nii.gz"),
        )
        .param(
            text("output_datatype", "output datatype")
                .argstr("-odt")
                .allowed(["uchar", "short", "int", "float", "rgb"]),
        )
        .build()
}

pub(super) fn vol2vol() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_vol2vol", "mri_vol2vol")
        .describe("Resample a volume into another field-of-view.")
        .param(text("moving_volume", "moving volume").argstr("--mov"))
        .param(text("target_volume", "target volume").argstr("--targ"))
        .param(text("output_volume", "output volume").argstr("--o").output())
        .param(
            text("registration_file", "registration file in FreeSurfer format").argstr("--reg"),
        )
        .param(
            switch(
                "use_registered_volume_as_target",
                "use volume in registration file as target",
                "--fstarg",
            )
            .requires(&["registration_file"]),
        )
        .param(text("fsl_registration_file", "registration file in FSL format").argstr("--fsl"))
        .param(text("xfm_registration_file", "registration file in XFM format").argstr("--xfm"))
        .param(switch(
            "resample_to_talairach",
            "resample moving volume to Talairach",
            "--tal",
        ))
        .param(
            integer("talairach_resolution", "resolution of the Talairach template")
                .argstr("--talres")
                .allowed([1, 2])
                .requires(&["resample_to_talairach"]),
        )
        .param(switch("invert_transform", "invert transform", "--inv"))
        .param(switch(
            "no_resampling",
            "change the vox2ras matrix instead of resampling",
            "--no-resample",
        ))
        .param(
            text("interpolation", "interpolate output with the chosen method")
                .argstr("--interp")
                .allowed(["cubic", "nearest", "trilin"]),
        )
        .fragment(fragments::subjects_dir("--sd"))
        .build()
}

pub(super) fn binarize() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_binarize", "mri_binarize")
        .describe("Binarize a volume based on thresholds or match values.")
        .param(path("input_volume", "input volume").mandatory().argstr("--i"))
        .param(
            number("min_value", "minimum absolute threshold value")
                .argstr("--min")
                .xor(&["relative_min", "relative_max", "match_values"]),
        )
        .param(
            number("max_value", "maximum absolute threshold value")
                .argstr("--max")
                .xor(&["relative_min", "relative_max", "match_values"]),
        )
        .param(
            number("relative_min", "minimum threshold value relative to the global mean")
                .argstr("--rmin")
                .xor(&["min_value", "max_value", "match_values"]),
        )
        .param(
            number("relative_max", "maximum threshold value relative to the global mean")
                .argstr("--rmax")
                .xor(&["min_value", "max_value", "match_values"]),
        )
        .param(
            number(
                "percentage",
                "set the minimum threshold to capture a given percentage of top voxel values",
            )
            .argstr("--pct")
            .xor(&["min_value", "relative_min", "match_values"]),
        )
        .param(
            number(
                "false_discovery_rate",
                "set the minimum threshold to achieve a given false discovery rate",
            )
            .argstr("--fdr")
            .xor(&["min_value", "relative_min", "match_values"]),
        )
        .param(
            ParameterSpec::new("match_values", SemanticType::NumberList)
                .with_help("binarize based on match values")
                .argstr("--match")
                .xor(&["min_value", "max_value", "relative_min", "relative_max"]),
        )
        .param(
            text("output_volume", "output volume")
                .argstr("--o")
                .output_template("{input_volume}_mask"),
        )
        .param(
            text("output_count_file", "save hit counts")
                .argstr("--count")
                .output_template("{input_volume}_count.txt")
                .keep_extension(false),
        )
        .param(
            integer("bin_value", "substitute value for voxels in range of binarization")
                .argstr("--binval"),
        )
        .param(
            integer(
                "not_bin_value",
                "substitute value for voxels not in range for binarization",
            )
            .argstr("--binvalnot")
            .xor(&["merge_volume"]),
        )
        .param(path("copy_volume", "copy values from this volume to the output").argstr("--copy"))
        .param(
            path("merge_volume", "merge binarization with this volume")
                .argstr("--merge")
                .xor(&["not_bin_value"]),
        )
        .param(path("mask_volume", "apply mask to volume").argstr("--mask"))
        .param(
            number("mask_threshold", "threshold applied to mask volume (default is 0.5)")
                .argstr("--mask-thresh")
                .requires(&["mask_volume"]),
        )
        .param(switch(
            "save_as_uchar",
            "save output volume as unsigned char",
            "--uchar",
        ))
        .build()
}

pub(super) fn coreg() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_coreg", "mri_coreg")
        .describe("Linear registration between two volumes similar to SPM's spm_coreg.")
        .param(path("source_volume", "source volume").mandatory().argstr("--mov"))
        .param(path("target_volume", "target volume").mandatory().argstr("--ref"))
        .param(
            text("output_registration_file", "output registration file")
                .argstr("--reg")
                .output_template("{source_volume}_coreg.lta")
                .keep_extension(false),
        )
        .param(
            text("output_registration_data", "output registration data")
                .argstr("--regdat")
                .output_template("{source_volume}_coreg.dat")
                .keep_extension(false),
        )
        .param(
            text("subject_id", "use subject's aparc+aseg.mgz as target mask")
                .argstr("--s")
                .xor(&["target_mask"]),
        )
        .param(
            integer("degrees_of_freedom", "degrees of freedom")
                .argstr("--dof")
                .default_value(6),
        )
        .param(path("source_mask", "mask for source volume").argstr("--mov-mask"))
        .param(
            path("target_mask", "mask for target volume")
                .argstr("--ref-mask")
                .xor(&["subject_id"]),
        )
        .param(integer("num_threads", "number of threads").argstr("--threads"))
        .fragment(fragments::subjects_dir("--sd"))
        .param(integer("random_seed", "random seed").argstr("--seed").default_value(53))
        .build()
}

pub(super) fn robust_register() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_robust_register", "mri_robust_register")
        .describe("Symmetrically align a source to a target volume using robust statistics.")
        .param(path("source_volume", "source volume").mandatory().argstr("--mov"))
        .param(path("target_volume", "target volume").mandatory().argstr("--dst"))
        .param(
            text("output_transform", "output transform")
                .argstr("--lta")
                .output_template("{source_volume}_xfm.lta")
                .keep_extension(false),
        )
        .param(saturation())
        .param(
            text("output_resampled_volume", "source image resampled to target")
                .argstr("--mapmov")
                .output_template("{source_volume}_resampled"),
        )
        .param(
            text("output_aligned_volume", "source image aligned to target")
                .argstr("--mapmovhdr")
                .output_template("{source_volume}_aligned"),
        )
        .param(
            text("output_weights_volume", "output weights in target space")
                .argstr("--weights")
                .output_template("{source_volume}_weights"),
        )
        .param(switch(
            "find_translation_only",
            "find 3-parameter translation only",
            "--transonly",
        ))
        .param(switch(
            "find_affine_transform",
            "find 12-parameter affine transform",
            "--affine",
        ))
        .param(
            path("initial_transform", "initial transform to apply to source volume")
                .argstr("--ixform"),
        )
        .param(switch(
            "initialize_orientation",
            "initialize orientation using moments",
            "--initorient",
        ))
        .param(switch(
            "no_initialization",
            "skip transform initialization",
            "--noinit",
        ))
        .param(internal_datatype())
        .param(path("source_mask", "mask applied to source volume").argstr("--maskmov"))
        .param(path("target_mask", "mask applied to target volume").argstr("--maskdst"))
        .build()
}

pub(super) fn robust_template() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_robust_template", "mri_robust_template")
        .describe("Construct an unbiased robust template from several volumes.")
        .param(
            ParameterSpec::new("input_volumes", SemanticType::PathList)
                .with_help("input volumes to compute the template from")
                .argstr("--mov"),
        )
        .param(
            text("output_volume", "output template volume")
                .argstr("--template")
                .output_template("template.mgz"),
        )
        .param(saturation())
        .param(
            ParameterSpec::new("output_transforms", SemanticType::PathList)
                .with_help("output transforms to template space")
                .argstr("--lta")
                .output(),
        )
        .param(
            ParameterSpec::new("output_resampled_volumes", SemanticType::PathList)
                .with_help("output resampled volumes to template space")
                .argstr("--mapmov")
                .output(),
        )
        .param(
            ParameterSpec::new("output_weights_volumes", SemanticType::PathList)
                .with_help("output weights volumes to template space")
                .argstr("--weights")
                .output(),
        )
        .param(
            text("method", "mean or median template")
                .allowed(["mean", "median"])
                .default_value("median")
                .formatter(Formatter::lookup([
                    ("mean", ["--average", "0"]),
                    ("median", ["--average", "1"]),
                ])),
        )
        .param(
            integer("initial_template_index", "volume index used as initial template")
                .argstr("--inittp"),
        )
        .param(switch(
            "resample_to_initial_template",
            "resample other volumes to initial template",
            "--fixtp",
        ))
        .param(switch(
            "enable_intensity_scaling",
            "enable intensity scaling",
            "--iscale",
        ))
        .param(
            path("initial_transforms", "initial transforms to apply to input volumes")
                .argstr("--ixforms"),
        )
        .param(switch(
            "find_affine_transform",
            "find 12-parameter affine transform",
            "--affine",
        ))
        .param(internal_datatype())
        .build()
}

const LABEL_SOURCES: &[&str] = &[
    "label_file",
    "label_files",
    "annotation_file",
    "segmentation_file",
];

fn label_source(name: &str, spec: ParameterSpec) -> ParameterSpec {
    let peers: Vec<&str> = LABEL_SOURCES
        .iter()
        .copied()
        .filter(|peer| *peer != name)
        .collect();
    spec.mandatory().xor(&peers)
}

pub(super) fn label2vol() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_label2vol", "mri_label2vol")
        .describe("Convert a label or a set of labels to a volume.")
        .param(label_source(
            "label_file",
            path("label_file", "label file").argstr("--label"),
        ))
        .param(label_source(
            "label_files",
            ParameterSpec::new("label_files", SemanticType::PathList)
                .with_help("label files")
                .argstr("--label ..."),
        ))
        .param(label_source(
            "annotation_file",
            path("annotation_file", "annotation file").argstr("--annot"),
        ))
        .param(label_source(
            "segmentation_file",
            path("segmentation_file", "segmentation file").argstr("--seg"),
        ))
        .param(
            path("template_volume", "template volume file")
                .mandatory()
                .argstr("--temp"),
        )
        .param(
            path(
                "registration_file",
                "map label coordinates to the template volume",
            )
            .argstr("--reg")
            .xor(&["no_registration"]),
        )
        .param(
            number(
                "threshold",
                "threshold value at which a voxel may be considered for membership to a label",
            )
            .argstr("--fillthresh"),
        )
        .param(
            ParameterSpec::new(
                "projection",
                SemanticType::Tuple(vec![
                    SemanticType::String,
                    SemanticType::Number,
                    SemanticType::Number,
                    SemanticType::Number,
                ]),
            )
            .with_help("projection along the surface normal as (type, start, stop, delta)")
            .argstr("--proj")
            .requires(&["subject_id", "hemisphere"]),
        )
        .param(
            text("subject_id", "subject identifier to load the surface from").argstr("--subject"),
        )
        .param(
            switch(
                "no_registration",
                "use the identity matrix for registration",
                "--identity",
            )
            .xor(&["registration_file"]),
        )
        .param(text("output_volume", "output volume").argstr("--o").output())
        .fragment(fragments::hemisphere())
        .fragment(fragments::subjects_dir("--sd"))
        .derived(fragments::subjects_dir_output())
        .build()
}

pub(super) fn aparc2aseg() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_aparc2aseg", "mri_aparc2aseg")
        .describe("Map cortical parcellation labels into the automatic segmentation volume.")
        .param(text("subject_id", "subject identifier").mandatory().argstr("--s"))
        .param(
            text("output_image", "output segmented volume")
                .argstr("--o")
                .default_value("mri/aparc+aseg.mgz")
                .output(),
        )
        .param(
            text(
                "cortex_mask",
                "mask cortical voxels with mri/ribbon.mgz (new) or mri/?h.ribbon.mgz (old)",
            )
            .argstr("--{cortex_mask}-ribbon")
            .allowed(["new", "old"])
            .default_value("new"),
        )
        .param(
            switch(
                "use_a2005s_annotation",
                "use label/?h.aparc.a2005s.annot as annotation file",
                "--a2005s",
            )
            .xor(&["use_a2009s_annotation", "annotation_file"]),
        )
        .param(
            switch(
                "use_a2009s_annotation",
                "use label/?h.aparc.a2009s.annot as annotation file",
                "--a2009s",
            )
            .xor(&["use_a2005s_annotation", "annotation_file"]),
        )
        .param(
            path("annotation_file", "use annotation file")
                .argstr("--annot")
                .xor(&["use_a2005s_annotation", "use_a2009s_annotation"]),
        )
        .param(
            integer("num_threads", "run in parallel with this number of threads")
                .argstr("--nthreads"),
        )
        .fragment(fragments::hemisphere())
        .fragment(fragments::subjects_dir("--sd"))
        .derived(fragments::subjects_dir_output())
        .build()
}

fn vertex_source(name: &str, help: &str, flag: &str) -> ParameterSpec {
    const SOURCES: &[&str] = &[
        "use_vertex_coordinates_in_surface",
        "use_vertex_coordinates_in_talairach",
        "use_vertex_area",
        "use_vertex_normal_coordinates",
    ];
    let peers: Vec<&str> = SOURCES
        .iter()
        .copied()
        .filter(|peer| *peer != name)
        .collect();
    text(name, help).argstr(flag).xor(&peers)
}

pub(super) fn surf2surf() -> Result<TaskSchema, FstaskError> {
    TaskSchema::builder("mri_surf2surf", "mri_surf2surf")
        .describe("Resample data from one surface onto another.")
        .param(
            text(
                "source_subject_id",
                "source subject identifier within the subjects directory",
            )
            .argstr("--srcsubject"),
        )
        .param(text("source_surface", "source surface file").argstr("--sval"))
        .param(vertex_source(
            "use_vertex_coordinates_in_surface",
            "extract coordinates for each vertex of the surface",
            "--sval-xyz",
        ))
        .param(vertex_source(
            "use_vertex_coordinates_in_talairach",
            "extract coordinates for each vertex and transform them to Talairach",
            "--sval-tal-xyz",
        ))
        .param(vertex_source(
            "use_vertex_area",
            "extract surface area for each vertex of the surface",
            "--sval-area",
        ))
        .param(vertex_source(
            "use_vertex_normal_coordinates",
            "extract surface normal coordinates for each vertex of the surface",
            "--sval-nxyz",
        ))
        .param(
            text("source_annotation_file", "source annotation file")
                .argstr("--sval-annot")
                .requires(&["target_annotation_file"]),
        )
        .param(text("source_format", "source format type string").argstr("--sfmt"))
        .param(
            integer("source_icosahedron_order", "source icosahedron order number")
                .argstr("--srcicoorder"),
        )
        .param(
            text(
                "registration_file",
                "apply registration to vertex coordinates",
            )
            .argstr("--reg")
            .requires(&["use_vertex_coordinates_in_surface"])
            .xor(&["inverse_registration_file"]),
        )
        .param(
            text(
                "inverse_registration_file",
                "apply inverse registration to vertex coordinates",
            )
            .argstr("--reg-inv")
            .requires(&["use_vertex_coordinates_in_surface"])
            .xor(&["registration_file"]),
        )
        .param(
            text(
                "target_subject_id",
                "target subject identifier within the subjects directory",
            )
            .argstr("--trgsubject"),
        )
        .param(
            integer("target_icosahedron_order", "target icosahedron order number")
                .argstr("--trgicoorder"),
        )
        .param(
            text("target_surface", "target surface file")
                .argstr("--tval")
                .xor(&["target_annotation_file"])
                .output(),
        )
        .param(
            text(
                "save_vertex_coordinates_from_file",
                "save target surface with different vertex coordinates",
            )
            .argstr("--tval-xyz")
            .requires(&["target_surface"]),
        )
        .param(
            text("target_annotation_file", "target annotation file")
                .argstr("--tval")
                .xor(&["target_surface"])
                .output(),
        )
        .param(text("target_format", "target format type string").argstr("--tfmt"))
        .fragment(fragments::hemisphere())
        .fragment(fragments::subjects_dir("--sd"))
        .build()
}
