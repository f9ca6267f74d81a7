use std::fs;

use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use proptest::prelude::*;
use tempfile::TempDir;

use pns_ingest::{
    ExtractionPlan, IngestError, load_dictionary, load_layout, open_chunks, parse_layout,
    read_lines, resolve_encoding,
};
use pns_model::{DesiredColumns, PositionOverride};

const LAYOUT: &str = "\
data pns2019;
infile 'PNS_2019.txt' lrecl=12;
input
@00001 V0001 $2.  /* UF */
@00003 C006 $1.   /* Sexo */
@00004 C008 3.    /* Idade */
@00007 P00402 5.  /* Altura, errada */
@00010 V0026 $1.  /* Situação */
;
run;
";

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn extracts_desired_columns_from_latin1_file() {
    let dir = TempDir::new().unwrap();
    let layout_path = dir.path().join("input.sas");
    let data_path = dir.path().join("PNS_2019.txt");
    fs::write(&layout_path, LAYOUT).unwrap();
    fs::write(
        &data_path,
        b"351060170 1\r\n332 85165 2\r\n2910591\r\n".as_slice(),
    )
    .unwrap();

    let encoding = resolve_encoding("latin1").unwrap();
    let overrides = [PositionOverride::new("P00402", 6, 3)];
    let layout = load_layout(&layout_path, encoding, &overrides).unwrap();
    let desired: DesiredColumns = [
        ("C008", "idade"),
        ("V0001", "uf"),
        ("P00402", "altura"),
        ("Z999", "inexistente"),
    ]
    .into_iter()
    .collect();

    let plan = ExtractionPlan::new(&layout, &desired);
    let df = plan.extract(&read_lines(&data_path).unwrap(), encoding).unwrap();

    assert_eq!(df.get_column_names_str(), vec!["idade", "uf", "altura"]);
    assert_eq!(df.height(), 3);
    assert_eq!(
        strings(&df, "idade"),
        vec![Some("060".into()), Some("85".into()), Some("059".into())]
    );
    assert_eq!(
        strings(&df, "altura"),
        vec![Some("170".into()), Some("165".into()), Some("1".into())]
    );
    assert_eq!(plan.missing_codes(), ["Z999".to_string()]);
}

#[test]
fn short_lines_read_as_blank_padding() {
    let layout = parse_layout("@00001 A $2.\n@00005 B $3.\n");
    let plan = ExtractionPlan::all(&layout);

    let df = plan
        .extract(&[b"12345678".as_slice(), b"1".as_slice()], WINDOWS_1252)
        .unwrap();

    assert_eq!(strings(&df, "A"), vec![Some("12".into()), Some("1".into())]);
    assert_eq!(strings(&df, "B"), vec![Some("567".into()), None]);
}

#[test]
fn accented_bytes_decode_per_field() {
    let layout = parse_layout("@00001 NOME $8.\n");
    let plan = ExtractionPlan::all(&layout);

    let df = plan.extract(&[b"S\xe3o Paulo"], WINDOWS_1252).unwrap();

    assert_eq!(strings(&df, "NOME"), vec![Some("São Paul".into())]);
}

#[test]
fn chunked_and_whole_reads_agree() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("data.txt");
    let body: String = (0..7).map(|i| format!("{i:03}xx\n")).collect();
    fs::write(&data_path, body).unwrap();

    let layout = parse_layout("@00001 N $3.\n");
    let plan = ExtractionPlan::all(&layout);
    let whole = plan.extract(&read_lines(&data_path).unwrap(), WINDOWS_1252).unwrap();

    let mut stacked: Option<DataFrame> = None;
    let mut chunk_count = 0;
    for chunk in open_chunks(&data_path, 3).unwrap() {
        let part = plan.extract(&chunk.unwrap(), WINDOWS_1252).unwrap();
        chunk_count += 1;
        stacked = Some(match stacked {
            Some(mut acc) => {
                acc.vstack_mut(&part).unwrap();
                acc
            }
            None => part,
        });
    }

    assert_eq!(chunk_count, 3);
    assert!(whole.equals_missing(&stacked.unwrap()));
}

#[test]
fn dictionary_builds_layout_and_labels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dicionario.csv");
    fs::write(
        &path,
        "Posição inicial,Tamanho,Código da variável,Quesito,Tipo,Descrição\n\
         1,2,V0001,Unidade da Federação,11,Rondônia\n\
         ,,,,12,Acre\n\
         107,1,C006,Sexo,1,Homem\n\
         107,1,C006,Sexo,2,Mulher\n\
         108,3,C008,Idade,,\n",
    )
    .unwrap();

    let dictionary = load_dictionary(&path).unwrap();

    assert_eq!(dictionary.names(), vec!["V0001", "C006", "C008"]);
    assert_eq!(dictionary.colspecs(), vec![(0, 2), (106, 107), (107, 110)]);
    assert_eq!(dictionary.labels.get("V0001").unwrap().recode("12"), "Acre");
    assert_eq!(dictionary.labels.get("C006").unwrap().recode("02"), "Mulher");
    assert!(dictionary.labels.get("C008").is_none());
}

#[test]
fn dictionary_without_position_column_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dicionario.csv");
    fs::write(&path, "Tamanho,Código da variável\n2,V0001\n").unwrap();

    let err = load_dictionary(&path).unwrap_err();

    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "Posição inicial"));
}

#[test]
fn missing_layout_file_is_reported_with_path() {
    let err = load_layout(
        std::path::Path::new("/nope/input.sas"),
        WINDOWS_1252,
        &[],
    )
    .unwrap_err();
    assert!(err.to_string().contains("/nope/input.sas"));
}

proptest! {
    #[test]
    fn layout_parse_is_idempotent(
        fields in proptest::collection::vec((1usize..3000, 1usize..20), 1..20)
    ) {
        let text: String = fields
            .iter()
            .enumerate()
            .map(|(i, (position, length))| format!("@{position:05} F{i} ${length}.\n"))
            .collect();
        let first = parse_layout(&text);
        let second = parse_layout(&text);
        prop_assert_eq!(first.colspecs(), second.colspecs());
        for field in first.iter() {
            prop_assert_eq!(field.end(), field.start + field.length);
        }
    }

    #[test]
    fn extraction_is_pure(line in "[ 0-9A-Z]{0,20}", start in 0usize..25, length in 1usize..8) {
        let layout = parse_layout(&format!("@{:05} X ${}.\n", start + 1, length));
        let plan = ExtractionPlan::all(&layout);
        let first = plan.extract(&[line.as_bytes()], WINDOWS_1252).unwrap();
        let second = plan.extract(&[line.as_bytes()], WINDOWS_1252).unwrap();
        prop_assert!(first.equals_missing(&second));
    }
}
