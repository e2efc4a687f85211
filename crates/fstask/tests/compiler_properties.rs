use fstask::{
    ArgTemplate, Catalog, CompileOptions, FstaskError, InvocationError, ParamValue,
    ParameterSet, ParameterSpec, ReportMode, SemanticType, TaskDefinition, compile,
    compile_tokens, violations,
};

fn sample_for(ty: &SemanticType) -> ParamValue {
    match ty {
        SemanticType::String | SemanticType::Path => ParamValue::from("sample"),
        SemanticType::Integer => ParamValue::from(1),
        SemanticType::Number => ParamValue::from(1.5),
        SemanticType::Boolean => ParamValue::from(true),
        SemanticType::StringList | SemanticType::PathList => ParamValue::from(vec!["a", "b"]),
        SemanticType::NumberList => ParamValue::from(vec![1, 2]),
        SemanticType::Tuple(slots) => ParamValue::List(slots.iter().map(sample_for).collect()),
    }
}

fn sample(spec: &ParameterSpec) -> ParamValue {
    spec.allowed_values
        .as_ref()
        .and_then(|allowed| allowed.first().cloned())
        .unwrap_or_else(|| sample_for(&spec.semantic_type))
}

/// `false` for switches, the usual sample otherwise.
fn switched_off(spec: &ParameterSpec) -> ParamValue {
    if spec.semantic_type.is_boolean() {
        ParamValue::from(false)
    } else {
        sample(spec)
    }
}

#[test]
fn every_builtin_task_survives_a_definition_round_trip() {
    for schema in Catalog::builtin().unwrap().tasks() {
        let rebuilt = TaskDefinition::from(schema)
            .into_schema()
            .unwrap_or_else(|err| panic!("{}: {err}", schema.name()));
        assert_eq!(&rebuilt, schema);
    }
}

#[test]
fn empty_invocation_names_the_first_mandatory_parameter() {
    for schema in Catalog::builtin().unwrap().tasks() {
        let first_mandatory = schema.parameters().iter().find(|p| p.mandatory);
        let result = compile(schema, &ParameterSet::new(), &CompileOptions::default());
        match first_mandatory {
            Some(spec) => {
                let err = result.expect_err(schema.name());
                assert_eq!(
                    err.violations(),
                    vec![InvocationError::MissingMandatoryParameter {
                        name: spec.name.clone()
                    }],
                    "{}",
                    schema.name()
                );
            }
            None => {
                let invocation = result.unwrap_or_else(|err| panic!("{}: {err}", schema.name()));
                assert_eq!(invocation.tokens[0], schema.executable_tokens()[0]);
            }
        }
    }
}

#[test]
fn binding_both_sides_of_any_xor_pair_is_reported() {
    for schema in Catalog::builtin().unwrap().tasks() {
        for spec in schema.parameters() {
            for peer_name in &spec.xor {
                let peer = schema.parameter(peer_name).unwrap();
                for (own, other) in [
                    (sample(spec), sample(peer)),
                    (switched_off(spec), sample(peer)),
                    (sample(spec), switched_off(peer)),
                ] {
                    let params = ParameterSet::new()
                        .with(spec.name.clone(), own.clone())
                        .with(peer.name.clone(), other.clone());
                    let conflict = violations(schema, &params).into_iter().any(|err| {
                        matches!(
                            err,
                            InvocationError::MutuallyExclusiveViolation { ref first, ref second }
                                if (first == &spec.name && second == peer_name)
                                    || (first == peer_name && second == &spec.name)
                        )
                    });
                    assert!(
                        conflict,
                        "{}: {}={own} xor {}={other}",
                        schema.name(),
                        spec.name,
                        peer_name
                    );
                }
            }
        }
    }
}

#[test]
fn boolean_flags_appear_once_when_true_and_never_otherwise() {
    for schema in Catalog::builtin().unwrap().tasks() {
        for spec in schema.parameters() {
            let ArgTemplate::Flag(flag) = &spec.arg else {
                continue;
            };
            if !spec.semantic_type.is_boolean() || spec.formatter.is_some() {
                continue;
            }
            let count = |value: Option<bool>| {
                let mut params = ParameterSet::new();
                if let Some(value) = value {
                    params.insert(spec.name.clone(), value);
                }
                compile_tokens(schema, &params)
                    .unwrap()
                    .iter()
                    .filter(|token| *token == flag)
                    .count()
            };
            assert_eq!(count(Some(true)), 1, "{}: {}", schema.name(), spec.name);
            assert_eq!(count(Some(false)), 0, "{}: {}", schema.name(), spec.name);
            assert_eq!(count(None), 0, "{}: {}", schema.name(), spec.name);
        }
    }
}

#[test]
fn unpositioned_task_still_emits_defaults_and_fallbacks() {
    let schema = Catalog::builtin().unwrap().get("mri_robust_template").unwrap();
    let invocation = compile(&schema, &ParameterSet::new(), &CompileOptions::default()).unwrap();
    assert_eq!(
        invocation.command_line(),
        "mri_robust_template --template template.mgz --satit --average 1"
    );
}

#[test]
fn compilation_leaves_the_caller_parameters_untouched() {
    let schema = Catalog::builtin().unwrap().get("mri_binarize").unwrap();
    let params = ParameterSet::new()
        .with("input_volume", "aseg.nii.gz")
        .with("min_value", 1);
    let before = params.clone();
    let first = compile(&schema, &params, &CompileOptions::default()).unwrap();
    let second = compile(&schema, &params, &CompileOptions::default()).unwrap();
    assert_eq!(params, before);
    assert_eq!(first, second);
}

#[test]
fn output_dir_relocates_templated_outputs_only() {
    let schema = Catalog::builtin().unwrap().get("mri_binarize").unwrap();
    let params = ParameterSet::new()
        .with("input_volume", "aseg.nii.gz")
        .with("min_value", 1)
        .with("output_count_file", "counts/aseg.txt");
    let options = CompileOptions {
        output_dir: Some("/scratch/run1".into()),
        ..CompileOptions::default()
    };
    let invocation = compile(&schema, &params, &options).unwrap();
    assert_eq!(
        invocation.declared_outputs.get("output_volume").map(String::as_str),
        Some("/scratch/run1/aseg_mask.nii.gz")
    );
    assert_eq!(
        invocation.declared_outputs.get("output_count_file").map(String::as_str),
        Some("counts/aseg.txt")
    );
}

#[test]
fn all_errors_mode_collects_every_violation() {
    let schema = Catalog::builtin().unwrap().get("gtmseg").unwrap();
    let params = ParameterSet::new()
        .with("generate_segmentation", true)
        .with("head_segmentation", "apas+head.mgz")
        .with("upsampling_factor", "two");
    let options = CompileOptions {
        report: ReportMode::AllErrors,
        ..CompileOptions::default()
    };
    let err = compile(&schema, &params, &options).unwrap_err();
    assert!(matches!(err, FstaskError::Violations(_)));
    let kinds: Vec<&str> = err.violations().iter().map(InvocationError::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "missing_mandatory_parameter",
            "mutually_exclusive_violation",
            "invalid_value",
        ]
    );
}

#[test]
fn readonly_parameters_cannot_be_bound() {
    let schema = Catalog::builtin().unwrap().get("mris_ca_train").unwrap();
    let params = ParameterSet::new()
        .with("hemisphere", "lh")
        .with("canonical_surface", "sphere.reg")
        .with("annotation_file", "manual")
        .with("subject_ids", vec!["subj1"])
        .with("num_subjects", 3);
    let err = compile(&schema, &params, &CompileOptions::default()).unwrap_err();
    assert_eq!(err.violations()[0].kind(), "invalid_value");
}

#[test]
fn switching_off_generation_still_conflicts_with_a_custom_head() {
    let schema = Catalog::builtin().unwrap().get("gtmseg").unwrap();
    let params = ParameterSet::new()
        .with("subject_id", "subject")
        .with("generate_segmentation", false)
        .with("head_segmentation", "apas+head.mgz");
    let err = compile(&schema, &params, &CompileOptions::default()).unwrap_err();
    assert_eq!(
        err.violations(),
        vec![InvocationError::MutuallyExclusiveViolation {
            first: "generate_segmentation".into(),
            second: "head_segmentation".into(),
        }]
    );
}
