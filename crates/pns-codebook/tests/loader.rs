use std::fs;
use std::path::Path;

use pns_codebook::{CodebookError, load_codebook};
use pns_model::LayoutError;
use tempfile::TempDir;

fn bundled_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../codebook/pns2019")
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

const MINIMAL_MANIFEST: &str = r#"
[codebook]
schema = "pns-codebook"
schema_version = 1

[survey]
name = "Synthetic"

[files]
columns = "columns.csv"
recodes = "recodes.csv"

[profile]
numeric_columns = ["idade"]
"#;

#[test]
fn bundled_codebook_loads() {
    let codebook = load_codebook(&bundled_dir()).unwrap();

    assert_eq!(codebook.survey.name, "PNS 2019");
    assert_eq!(codebook.survey.chunk_size, 50_000);
    assert_eq!(codebook.desired.len(), 46);
    assert_eq!(codebook.desired.name_for("C008"), Some("idade"));
    assert_eq!(codebook.overrides.len(), 3);

    let uf = codebook.recodes.get("uf").unwrap();
    assert_eq!(uf.len(), 27);
    assert_eq!(uf.recode("35"), "São Paulo");

    let profile = &codebook.profile;
    assert_eq!(profile.population.min_age, 60.0);
    assert_eq!(profile.derivations.chronic_columns.len(), 7);
    assert_eq!(profile.derivations.binary.columns.len(), 15);
    assert_eq!(
        profile.derivations.difficulty_scale.get("Muita dificuldade"),
        Some(&2)
    );
    assert_eq!(profile.impute_columns.len(), 4);
    assert_eq!(profile.summary.len(), 6);
}

#[test]
fn synthetic_codebook_loads_in_file_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "survey.toml", MINIMAL_MANIFEST);
    write(dir.path(), "columns.csv", "code,name\nB01,beta\nA01,alpha\n");
    write(
        dir.path(),
        "recodes.csv",
        "column,code,label\nbeta,1,Sim\nbeta,2,Não\n",
    );

    let codebook = load_codebook(dir.path()).unwrap();

    let names: Vec<_> = codebook.desired.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["beta", "alpha"]);
    assert_eq!(codebook.recodes.get("beta").unwrap().recode("02"), "Não");
    assert_eq!(codebook.title(), "Synthetic");
    assert_eq!(codebook.survey.encoding, "latin1");
}

#[test]
fn invalid_override_is_a_layout_error() {
    let dir = TempDir::new().unwrap();
    let manifest = format!(
        "{MINIMAL_MANIFEST}\n[[overrides]]\ncode = \"P00402\"\noffset = 602\nlength = 0\n"
    );
    write(dir.path(), "survey.toml", &manifest);
    write(dir.path(), "columns.csv", "code,name\nP00402,altura\n");
    write(dir.path(), "recodes.csv", "column,code,label\n");

    let err = load_codebook(dir.path()).unwrap_err();

    assert!(matches!(
        err,
        CodebookError::Layout(LayoutError::NonPositiveLength { .. })
    ));
}

#[test]
fn duplicate_output_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "survey.toml", MINIMAL_MANIFEST);
    write(dir.path(), "columns.csv", "code,name\nA,x\nB,x\n");
    write(dir.path(), "recodes.csv", "column,code,label\n");

    let err = load_codebook(dir.path()).unwrap_err();
    assert!(matches!(err, CodebookError::InvalidCodebook { .. }));
}

#[test]
fn missing_manifest_reports_path() {
    let dir = TempDir::new().unwrap();
    let err = load_codebook(dir.path()).unwrap_err();
    match err {
        CodebookError::Io { path, .. } => assert!(path.ends_with("survey.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn columns_file_without_name_header_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "survey.toml", MINIMAL_MANIFEST);
    write(dir.path(), "columns.csv", "code,label\nA,x\n");

    let err = load_codebook(dir.path()).unwrap_err();
    assert!(matches!(err, CodebookError::MissingColumn { ref column, .. } if column == "name"));
}
