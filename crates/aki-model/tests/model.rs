use aki_model::{
    AnalyserConfig, BaselineMethod, CreatinineProbeOptions, DatasetKind, PreprocessorConfig,
    ProbeConfig, StayId, Timeframe, UrineOutputMethod,
};

#[test]
fn dataset_kind_names_round_trip() {
    for kind in DatasetKind::ALL {
        assert_eq!(kind.as_str().parse::<DatasetKind>().unwrap(), kind);
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
    assert_eq!(
        " CRRT ".parse::<DatasetKind>().unwrap(),
        DatasetKind::RenalReplacementTherapy
    );
    assert!("vitals".parse::<DatasetKind>().is_err());
    assert!(!DatasetKind::Demographics.is_time_series());
    assert!(DatasetKind::Creatinine.is_time_series());
}

#[test]
fn stay_ids_parse_and_sort() {
    assert_eq!(StayId::parse("42"), Some(StayId::Int(42)));
    assert_eq!(StayId::parse("42.0"), Some(StayId::Int(42)));
    assert_eq!(StayId::parse(" abc "), Some(StayId::Text("abc".into())));
    assert_eq!(StayId::parse("  "), None);

    let mut stays = vec![
        StayId::Text("b".into()),
        StayId::Int(10),
        StayId::Text("a".into()),
        StayId::Int(9),
    ];
    stays.sort();
    assert_eq!(
        stays,
        vec![
            StayId::Int(9),
            StayId::Int(10),
            StayId::Text("a".into()),
            StayId::Text("b".into()),
        ]
    );
}

#[test]
fn default_config_survives_json() {
    let config = AnalyserConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let back: AnalyserConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn partial_config_fills_defaults() {
    let json = r#"{
        "probes": [
            {"kind": "urine_output", "method": "strict"},
            {"kind": "relative_creatinine", "baseline_timeframe": "2d", "method": "min"}
        ],
        "preprocessors": [{"kind": "time_index"}, {"kind": "demographics"}]
    }"#;
    let config: AnalyserConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.stay_column, "stay_id");
    assert_eq!(config.probes.len(), 2);
    match &config.probes[0] {
        ProbeConfig::UrineOutput(options) => {
            assert_eq!(options.method, UrineOutputMethod::Strict);
            assert_eq!(options.weight_column, "weight");
        }
        other => panic!("unexpected probe {other:?}"),
    }
    assert_eq!(
        config.probes[1],
        ProbeConfig::RelativeCreatinine(
            CreatinineProbeOptions::default()
                .with_timeframe(Timeframe::days(2))
                .with_method(BaselineMethod::Min)
        )
    );
    assert_eq!(
        config.preprocessors,
        vec![PreprocessorConfig::TimeIndex, PreprocessorConfig::Demographics]
    );
}

#[test]
fn bad_timeframe_is_a_config_error() {
    let json = r#"{"probes": [{"kind": "absolute_creatinine", "baseline_timeframe": "soon"}]}"#;
    let err = serde_json::from_str::<AnalyserConfig>(json).unwrap_err();
    assert!(err.to_string().contains("soon"));
}

#[test]
fn oversized_timeframe_is_a_config_error() {
    let json = r#"{"probes": [{"kind": "relative_creatinine", "baseline_timeframe": "999999999999999d"}]}"#;
    let err = serde_json::from_str::<AnalyserConfig>(json).unwrap_err();
    assert!(err.to_string().contains("999999999999999d"));
}
