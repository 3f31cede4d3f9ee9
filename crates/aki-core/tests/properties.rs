use aki_core::probes::{
    absolute_stages, creatinine_baseline, relative_stages, urine_output_stages,
};
use aki_core::{Analyser, Dataset, STAGE_COLUMN};
use aki_model::{BaselineMethod, DatasetKind, UrineOutputMethod, UrineOutputProbeOptions};
use polars::prelude::*;
use proptest::prelude::*;

const HOUR_MS: i64 = 3_600_000;

fn hourly_values() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.9, 0.0..200.0f64), 0..60)
}

fn method() -> impl Strategy<Value = BaselineMethod> {
    prop_oneof![
        Just(BaselineMethod::Min),
        Just(BaselineMethod::First),
        Just(BaselineMethod::Fixed),
    ]
}

proptest! {
    #[test]
    fn urine_stages_are_bounded(values in hourly_values(), weight in 1.0..150.0f64, strict in any::<bool>()) {
        let options = UrineOutputProbeOptions {
            method: if strict { UrineOutputMethod::Strict } else { UrineOutputMethod::Mean },
            ..UrineOutputProbeOptions::default()
        };
        let stages = urine_output_stages(&values, Some(weight), &options);
        prop_assert_eq!(stages.len(), values.len());
        prop_assert!(stages.iter().all(|stage| (0..=3).contains(stage)));
    }

    #[test]
    fn less_urine_never_lowers_the_stage(
        values in hourly_values(),
        factor in 0.0..=1.0f64,
        weight in 1.0..150.0f64,
    ) {
        let options = UrineOutputProbeOptions::default();
        let lower: Vec<Option<f64>> = values.iter().map(|v| v.map(|v| v * factor)).collect();
        let before = urine_output_stages(&values, Some(weight), &options);
        let after = urine_output_stages(&lower, Some(weight), &options);
        for (b, a) in before.iter().zip(&after) {
            prop_assert!(a >= b);
        }
    }

    #[test]
    fn constant_creatinine_is_its_own_baseline(
        hours in 1usize..200,
        level in 0.1..10.0f64,
        timeframe_hours in 1i64..200,
        method in method(),
    ) {
        let times: Vec<Option<i64>> = (0..hours as i64).map(|h| Some(h * HOUR_MS)).collect();
        let values = vec![Some(level); hours];
        let baseline = creatinine_baseline(&times, &values, timeframe_hours * HOUR_MS, method);
        prop_assert!(baseline.iter().all(|b| *b == Some(level)));
        prop_assert!(absolute_stages(&values, &baseline).iter().all(|s| *s == 0));
        prop_assert!(relative_stages(&values, &baseline).iter().all(|s| *s == 0));
    }

    #[test]
    fn creatinine_stages_are_bounded(
        values in prop::collection::vec(prop::option::weighted(0.8, 0.0..12.0f64), 0..100),
        method in method(),
    ) {
        let times: Vec<Option<i64>> = (0..values.len() as i64).map(|h| Some(h * HOUR_MS)).collect();
        let baseline = creatinine_baseline(&times, &values, 24 * HOUR_MS, method);
        for stages in [absolute_stages(&values, &baseline), relative_stages(&values, &baseline)] {
            prop_assert_eq!(stages.len(), values.len());
            prop_assert!(stages.iter().all(|stage| (0..=3).contains(stage)));
        }
    }
}

fn stay_frame(column: &str, values: &[Option<f64>]) -> DataFrame {
    let times: Vec<String> = (0..values.len())
        .map(|h| format!("2023-01-{:02} {:02}:00:00", 1 + h / 24, h % 24))
        .collect();
    DataFrame::new(vec![
        Series::new("stay_id".into(), vec![1i64; values.len()]).into(),
        Series::new("charttime".into(), times).into(),
        Series::new(column.into(), values.to_vec()).into(),
    ])
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn overall_stage_is_the_maximum_criterion(
        urine in prop::collection::vec(prop::option::of(0.0..120.0f64), 1..40),
        creat in prop::collection::vec(prop::option::of(0.3..6.0f64), 1..40),
        rrt in prop::collection::vec(prop::option::of(0u8..2), 1..40),
    ) {
        let rrt: Vec<Option<f64>> = rrt.into_iter().map(|s| s.map(f64::from)).collect();
        let demographics = DataFrame::new(vec![
            Series::new("stay_id".into(), vec![1i64]).into(),
            Series::new("weight".into(), vec![75.0]).into(),
        ])
        .unwrap();
        let datasets = vec![
            Dataset::new(DatasetKind::UrineOutput, stay_frame("urineoutput", &urine)),
            Dataset::new(DatasetKind::Creatinine, stay_frame("creat", &creat)),
            Dataset::new(DatasetKind::Demographics, demographics),
            Dataset::new(DatasetKind::RenalReplacementTherapy, stay_frame("rrt_status", &rrt)),
        ];
        let df = Analyser::with_defaults(datasets).unwrap().process_stays().unwrap();
        if df.height() == 0 {
            return Ok(());
        }

        let stage_columns: Vec<Vec<Option<i64>>> = df
            .get_columns()
            .iter()
            .filter(|column| column.name().ends_with("_stage"))
            .map(|column| column.i64().unwrap().into_iter().collect())
            .collect();
        prop_assert!(!stage_columns.is_empty());
        let overall: Vec<Option<i64>> = df.column(STAGE_COLUMN).unwrap().i64().unwrap().into_iter().collect();
        for (row, stage) in overall.iter().enumerate() {
            let expected = stage_columns.iter().filter_map(|column| column[row]).max();
            prop_assert_eq!(*stage, expected);
            if let Some(stage) = stage {
                prop_assert!((0..=3).contains(stage));
            }
        }
    }
}
