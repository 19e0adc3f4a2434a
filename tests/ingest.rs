mod common;

use common::{csv_rows, json_rows, num, text};
use encoding_rs::{UTF_8, WINDOWS_1252};
use graphit::{
    data::Value,
    error::LoadError,
    ingest::{self, DEFAULT_ROW_LIMIT, FileKind},
};

#[test]
fn csv_trims_keys_drops_blank_headers_and_coerces_numbers() {
    let csv = " city , pop ,  ,note\nPune, 10 ,ignored,\nAgra,5.5,ignored,n/a\n";
    let records = ingest::parse_csv(csv, DEFAULT_ROW_LIMIT).expect("parse csv");

    assert_eq!(records.len(), 2);
    let keys = records[0].keys().collect::<Vec<_>>();
    assert_eq!(keys, vec!["city", "pop", "note"]);
    assert_eq!(records[0].get("pop"), Some(&num(10.0)));
    assert_eq!(records[0].get("note"), Some(&text("")));
    assert_eq!(records[1].get("pop"), Some(&num(5.5)));
    assert_eq!(records[1].get("note"), Some(&text("n/a")));
}

#[test]
fn csv_numeric_grammar_rejects_hex_and_special_words() {
    let csv = "a,b,c,d,e,f\n0x10,Infinity,1e3,-.5,+7,12abc\n";
    let records = ingest::parse_csv(csv, DEFAULT_ROW_LIMIT).expect("parse csv");
    let row = &records[0];

    assert_eq!(row.get("a"), Some(&text("0x10")));
    assert_eq!(row.get("b"), Some(&text("Infinity")));
    assert_eq!(row.get("c"), Some(&num(1000.0)));
    assert_eq!(row.get("d"), Some(&num(-0.5)));
    assert_eq!(row.get("e"), Some(&num(7.0)));
    assert_eq!(row.get("f"), Some(&text("12abc")));
}

#[test]
fn csv_row_ceiling_rejects_whole_load() {
    assert_eq!(
        ingest::parse_csv(&csv_rows(DEFAULT_ROW_LIMIT), DEFAULT_ROW_LIMIT)
            .expect("at the limit")
            .len(),
        DEFAULT_ROW_LIMIT
    );
    let err = ingest::parse_csv(&csv_rows(DEFAULT_ROW_LIMIT + 1), DEFAULT_ROW_LIMIT)
        .expect_err("over the limit");
    assert!(matches!(
        err,
        LoadError::SizeLimit {
            rows: 1001,
            limit: 1000
        }
    ));
    assert!(err.to_string().contains("Please upload a smaller file"));
}

#[test]
fn json_requires_array_of_objects() {
    for input in [r#"{"city":"Pune"}"#, "[1, 2, 3]", "not json", "42"] {
        let err = ingest::parse_json(input, DEFAULT_ROW_LIMIT).expect_err(input);
        assert!(
            matches!(err, LoadError::Format { .. }),
            "unexpected error for {input}: {err:?}"
        );
    }
}

#[test]
fn json_ceiling_counts_elements() {
    assert!(ingest::parse_json(&json_rows(DEFAULT_ROW_LIMIT), DEFAULT_ROW_LIMIT).is_ok());
    assert!(matches!(
        ingest::parse_json(&json_rows(DEFAULT_ROW_LIMIT + 1), DEFAULT_ROW_LIMIT),
        Err(LoadError::SizeLimit { rows: 1001, .. })
    ));
}

#[test]
fn json_keeps_key_order_and_scalar_kinds() {
    let records = ingest::parse_json(
        r#"[{"title":"Queen","rating":8.2,"hit":true,"sequel":null,"year":"2013"}]"#,
        DEFAULT_ROW_LIMIT,
    )
    .expect("parse json");
    let record = &records[0];

    assert_eq!(
        record.keys().collect::<Vec<_>>(),
        vec!["title", "rating", "hit", "sequel", "year"]
    );
    assert_eq!(record.get("rating"), Some(&num(8.2)));
    assert_eq!(record.get("hit"), Some(&text("true")));
    assert_eq!(record.get("sequel"), Some(&Value::Null));
    // JSON strings are never coerced
    assert_eq!(record.get("year"), Some(&text("2013")));
}

#[test]
fn load_bytes_decodes_legacy_encodings() {
    let bytes = b"city,pop\nCaf\xe9,3\n";
    let dataset = ingest::load_bytes("legacy.csv", bytes, FileKind::Csv, WINDOWS_1252, 10)
        .expect("decode windows-1252");
    assert_eq!(dataset.name, "legacy.csv");
    assert_eq!(dataset.records[0].get("city"), Some(&text("Café")));

    let err = ingest::load_bytes("broken.csv", bytes, FileKind::Csv, UTF_8, 10)
        .expect_err("invalid utf-8");
    assert!(matches!(err, LoadError::Format { .. }));
}

#[test]
fn unknown_extension_without_mime_is_unsupported() {
    let err = FileKind::detect("report.xlsx", None).expect_err("xlsx");
    assert!(matches!(err, LoadError::UnsupportedType { .. }));
    assert!(err.to_string().contains("report.xlsx"));
    assert_eq!(
        FileKind::detect("stdin", Some("application/json")).expect("mime"),
        FileKind::Json
    );
}
