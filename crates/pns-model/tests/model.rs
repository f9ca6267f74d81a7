use proptest::prelude::*;

use pns_model::{FieldSpec, Layout, PositionOverride, RecodeTable, SurveyModule, normalize_code};

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[ 0-9]{0,6}") {
        let once = normalize_code(&raw).to_string();
        prop_assert_eq!(normalize_code(&once), once.as_str());
    }

    #[test]
    fn zero_padding_never_changes_the_label(code in 1u32..100, padding in 0usize..4) {
        let table: RecodeTable = [(code.to_string(), "label")].into_iter().collect();
        let padded = format!("{}{}", "0".repeat(padding), code);
        prop_assert_eq!(table.lookup(&padded), Some("label"));
    }

    #[test]
    fn record_width_covers_every_field(
        fields in proptest::collection::vec((0usize..2000, 1usize..20), 1..30)
    ) {
        let layout: Layout = fields
            .iter()
            .enumerate()
            .map(|(i, (start, length))| FieldSpec::new(format!("F{i}"), *start, *length).unwrap())
            .collect();
        for field in layout.iter() {
            prop_assert!(field.end() <= layout.record_width());
        }
    }
}

#[test]
fn survey_overrides_apply_after_parse() {
    let mut layout: Layout = [
        FieldSpec::new("P00402", 602, 5).unwrap(),
        FieldSpec::new("V0029", 1381, 2).unwrap(),
    ]
    .into_iter()
    .collect();
    let overrides = [
        PositionOverride::new("P00402", 602, 3),
        PositionOverride::new("V0029", 1381, 1),
        PositionOverride::new("V00293", 1503, 1),
    ];

    let applied = layout.apply_overrides(&overrides).unwrap();

    assert_eq!(applied, 3);
    assert_eq!(layout.get("P00402").unwrap().length, 3);
    assert_eq!(layout.get("V0029").unwrap().end(), 1382);
    assert_eq!(layout.get("V00293").unwrap().start, 1503);
}

#[test]
fn module_taxonomy_covers_the_questionnaire() {
    assert_eq!(SurveyModule::ALL.len(), 27);
    assert_eq!(SurveyModule::K.description(), "Saúde dos indivíduos com 60 anos ou mais");
    assert_eq!(SurveyModule::X.description(), "");
}
