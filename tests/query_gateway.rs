use sleuth::gateway::{Gateway, Value};

#[test]
fn forwards_text_verbatim_and_normalizes_rows() {
    let gateway = Gateway::open().expect("gateway");
    let result = gateway
        .execute("select case_id, case_title from case_files order by case_id")
        .expect("query ok");
    assert_eq!(result.columns, vec!["case_id", "case_title"]);
    assert_eq!(result.row_count(), 5);
    assert_eq!(result.rows[0][0], Value::Integer(1));
    assert_eq!(
        result.rows[0][1],
        Value::Text("The Phantom Receipt".to_string())
    );
}

#[test]
fn the_whole_archive_is_seeded() {
    let gateway = Gateway::open().expect("gateway");
    let count = |sql: &str| {
        let result = gateway.execute(sql).expect("query ok");
        result.rows[0][0].as_i64().expect("count")
    };
    assert_eq!(count("select count(*) from case_files"), 5);
    assert_eq!(count("select count(*) from evidence"), 6);
    assert_eq!(count("select count(*) from suspects"), 4);
    assert_eq!(count("select count(*) from witness_statements"), 4);
}

#[test]
fn engine_errors_surface_verbatim() {
    let gateway = Gateway::open().expect("gateway");
    let error = gateway.execute("select * from nowhere").unwrap_err();
    let message = format!("{}", error);
    assert!(message.contains("nowhere"), "unexpected msg: {message}");
}

#[test]
fn an_empty_result_still_reports_its_columns() {
    let gateway = Gateway::open().expect("gateway");
    let result = gateway
        .execute("select case_id from case_files where case_id = 99")
        .expect("query ok");
    assert_eq!(result.columns, vec!["case_id"]);
    assert!(result.is_empty());
}

#[test]
fn column_lookup_ignores_ascii_case() {
    let gateway = Gateway::open().expect("gateway");
    let result = gateway
        .execute("select case_id as CASE_ID from case_files")
        .expect("query ok");
    assert_eq!(result.column_index("case_id"), Some(0));
}
