use std::collections::BTreeMap;

use polars::prelude::*;
use proptest::prelude::*;

use pns_model::{
    BinaryFlagRule, BmiRule, ColumnCopy, DerivationProfile, PopulationRule, RecodeTables,
    SelfRatedHealthRule, SusRule,
};
use pns_transform::derive::{
    HEALTH_SCORE_COLUMN, MULTIMORBIDITY_COUNT_COLUMN, SUS_COLUMN, derive_health_score,
};
use pns_transform::{
    Derivation, apply_recode_tables, coerce_numeric, derive_indicators, filter_population,
    impute_median,
};

fn raw_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("idade".into(), vec!["059", "060", "085"]).into(),
        Series::new("peso_real".into(), vec!["080", "070", ""]).into(),
        Series::new("altura".into(), vec!["180", "170", "160"]).into(),
        Series::new("possui_plano_saude".into(), vec!["1", "2", "1"]).into(),
        Series::new("atendimento_sus".into(), vec!["1", "1", "1"]).into(),
        Series::new("hipertensao".into(), vec!["1", "1", "2"]).into(),
        Series::new("diabetes".into(), vec!["2", "2", "1"]).into(),
        Series::new("vacina_influenza".into(), vec!["1", "2", "1"]).into(),
        Series::new("dificuldade_vestir".into(), vec!["1", "1", "3"]).into(),
        Series::new("dificuldade_compras".into(), vec!["1", "1", "4"]).into(),
        Series::new("autoavaliacao_saude".into(), vec!["2", "2", "4"]).into(),
        Series::new("renda_percapita".into(), vec!["1000", "", "3000"]).into(),
    ])
    .unwrap()
}

fn recodes() -> RecodeTables {
    let mut tables = RecodeTables::new();
    for column in [
        "possui_plano_saude",
        "atendimento_sus",
        "hipertensao",
        "diabetes",
        "vacina_influenza",
    ] {
        tables.insert(column, "1", "Sim");
        tables.insert(column, "2", "Não");
    }
    for column in ["dificuldade_vestir", "dificuldade_compras"] {
        tables.insert(column, "1", "Nenhuma dificuldade");
        tables.insert(column, "2", "Alguma dificuldade");
        tables.insert(column, "3", "Muita dificuldade");
        tables.insert(column, "4", "Não consegue de modo algum");
    }
    for (code, label) in [("1", "Muito boa"), ("2", "Boa"), ("3", "Regular"), ("4", "Ruim")] {
        tables.insert("autoavaliacao_saude", code, label);
    }
    tables
}

fn profile() -> DerivationProfile {
    let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    DerivationProfile {
        bmi: Some(BmiRule::new("peso_real", "altura")),
        binary: BinaryFlagRule {
            columns: strings(&[
                "possui_plano_saude",
                "atendimento_sus",
                "hipertensao",
                "diabetes",
                "vacina_influenza",
            ]),
            positive_labels: strings(&["Sim"]),
            negative_labels: strings(&["Não"]),
        },
        chronic_columns: strings(&["hipertensao", "diabetes"]),
        adl_columns: strings(&["dificuldade_vestir"]),
        iadl_columns: strings(&["dificuldade_compras"]),
        difficulty_scale: BTreeMap::from([
            ("Nenhuma dificuldade".to_string(), 0),
            ("Alguma dificuldade".to_string(), 1),
            ("Muita dificuldade".to_string(), 2),
            ("Não consegue de modo algum".to_string(), 3),
        ]),
        self_rated_health: Some(SelfRatedHealthRule {
            column: "autoavaliacao_saude".to_string(),
            scale: BTreeMap::from([
                ("Muito boa".to_string(), 1.0),
                ("Boa".to_string(), 2.0),
                ("Regular".to_string(), 3.0),
                ("Ruim".to_string(), 4.0),
            ]),
        }),
        sus: Some(SusRule::new("possui_plano_saude", "atendimento_sus")),
        copies: vec![ColumnCopy {
            source: "vacina_influenza".to_string(),
            target: "cobertura_influenza".to_string(),
        }],
    }
}

fn f64s(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

fn i32s(df: &DataFrame, name: &str) -> Vec<Option<i32>> {
    df.column(name).unwrap().i32().unwrap().into_iter().collect()
}

#[test]
fn full_chain_over_three_respondents() {
    let mut df = raw_frame();

    coerce_numeric(
        &mut df,
        &["idade", "peso_real", "altura", "autoavaliacao_saude", "renda_percapita"],
    )
    .unwrap();
    let filtered = filter_population(&mut df, &PopulationRule::default()).unwrap();
    apply_recode_tables(&mut df, &recodes()).unwrap();
    let report = derive_indicators(&mut df, &profile()).unwrap();
    let imputed = impute_median(&mut df, &["renda_percapita"]).unwrap();

    assert_eq!(filtered.after, 2);
    assert_eq!(f64s(&df, "idade"), vec![Some(60.0), Some(85.0)]);

    let imc = f64s(&df, "imc");
    assert!((imc[0].unwrap() - 24.22).abs() < 0.01);
    assert_eq!(imc[1], imc[0]);
    assert_eq!(f64s(&df, "altura"), vec![Some(1.7), Some(1.6)]);

    assert_eq!(i32s(&df, SUS_COLUMN), vec![Some(1), Some(0)]);
    assert_eq!(i32s(&df, MULTIMORBIDITY_COUNT_COLUMN), vec![Some(1), Some(1)]);
    assert_eq!(i32s(&df, "functional_raw"), vec![Some(0), Some(5)]);
    assert_eq!(f64s(&df, "functional_score"), vec![Some(1.0), Some(0.0)]);
    assert_eq!(i32s(&df, "cobertura_influenza"), vec![Some(0), Some(1)]);

    let health = f64s(&df, HEALTH_SCORE_COLUMN);
    assert!(health[0].unwrap() > 0.999 && health[0].unwrap() <= 1.0);
    assert_eq!(health[1], Some(0.0));

    assert_eq!(f64s(&df, "renda_percapita"), vec![Some(3000.0), Some(3000.0)]);
    assert_eq!(imputed.total(), 1);
    assert_eq!(report.skipped_count(), 0);
}

#[test]
fn derivations_degrade_to_skips_on_partial_tables() {
    let mut df = DataFrame::new(vec![
        Series::new("idade".into(), vec![70.0, 80.0]).into(),
        Series::new("hipertensao".into(), vec!["Sim", "Não"]).into(),
    ])
    .unwrap();

    let report = derive_indicators(&mut df, &profile()).unwrap();

    assert!(report.get("bmi").is_some_and(|d| !d.is_applied()));
    assert!(matches!(report.get("binary_flags"), Some(Derivation::Applied { .. })));
    assert!(report.get("health_score").is_some_and(|d| !d.is_applied()));
    assert!(df.column(HEALTH_SCORE_COLUMN).is_err());
}

proptest! {
    #[test]
    fn health_score_stays_in_unit_interval(
        rows in proptest::collection::vec((1.0f64..=5.0, 0i32..=7, 0.0f64..=1.0), 1..40)
    ) {
        let mut df = DataFrame::new(vec![
            Series::new("auto".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()).into(),
            Series::new(
                MULTIMORBIDITY_COUNT_COLUMN.into(),
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            )
            .into(),
            Series::new("functional_score".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>())
                .into(),
        ])
        .unwrap();
        let rule = SelfRatedHealthRule { column: "auto".to_string(), scale: BTreeMap::new() };

        derive_health_score(&mut df, &rule).unwrap();

        for value in f64s(&df, HEALTH_SCORE_COLUMN) {
            let value = value.unwrap();
            prop_assert!(value.is_finite());
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
