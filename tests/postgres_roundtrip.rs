//! Runs against a live server only when JSON2PG_TEST_DATABASE_URL is set.

use json2pg::{import_json, ConnectionDescriptor, ImportConfig, JsonColumnType};
use postgres::{Client, NoTls};

const URL_VAR: &str = "JSON2PG_TEST_DATABASE_URL";

fn test_url() -> Option<String> {
    std::env::var(URL_VAR).ok().filter(|url| !url.trim().is_empty())
}

fn config_for(url: &str, table: &str) -> ImportConfig {
    ImportConfig {
        connection: Some(ConnectionDescriptor::parse(url).expect("descriptor")),
        table_name: Some(table.to_string()),
        ..ImportConfig::default()
    }
}

fn connect(url: &str) -> Client {
    let descriptor = ConnectionDescriptor::parse(url).expect("descriptor");
    Client::connect(descriptor.as_str(), NoTls).expect("connect")
}

#[test]
fn tags_example_lands_as_json_with_surrogate_key() {
    let Some(url) = test_url() else {
        eprintln!("skipping: {URL_VAR} not set");
        return;
    };

    let mut input = br#"[{"id":1,"tags":["a","b"]},{"id":2,"tags":["c"]}]"#.to_vec();
    let report = import_json(&mut input, &config_for(&url, "json2pg_t1")).expect("import");
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.warnings.len(), 1);

    let mut client = connect(&url);
    let rows = client
        .query(
            r#"SELECT id, tags::text, _generated_id FROM "json2pg_t1" ORDER BY _generated_id"#,
            &[],
        )
        .expect("select");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<_, i64>(0), 1);
    assert_eq!(rows[0].get::<_, String>(1), r#"["a","b"]"#);
    assert_eq!(rows[0].get::<_, i32>(2), 1);
    assert_eq!(rows[1].get::<_, String>(1), r#"["c"]"#);
    assert_eq!(rows[1].get::<_, i32>(2), 2);

    let data_type: String = client
        .query_one(
            "SELECT data_type FROM information_schema.columns \
             WHERE table_name = 'json2pg_t1' AND column_name = 'tags'",
            &[],
        )
        .expect("column type")
        .get(0);
    assert_eq!(data_type, "json");
}

#[test]
fn rerunning_replaces_the_table() {
    let Some(url) = test_url() else {
        eprintln!("skipping: {URL_VAR} not set");
        return;
    };

    let config = config_for(&url, "json2pg_rerun");
    for _ in 0..2 {
        let mut input = br#"[{"name":"a","score":1.5,"ok":true},{"name":"b","score":2,"ok":null}]"#.to_vec();
        let report = import_json(&mut input, &config).expect("import");
        assert_eq!(report.rows_written, 2);
    }

    let mut client = connect(&url);
    let count: i64 = client
        .query_one(r#"SELECT count(*) FROM "json2pg_rerun""#, &[])
        .expect("count")
        .get(0);
    assert_eq!(count, 2);

    let row = client
        .query_one(
            r#"SELECT name, score, ok FROM "json2pg_rerun" WHERE _generated_id = 2"#,
            &[],
        )
        .expect("row");
    assert_eq!(row.get::<_, String>(0), "b");
    assert_eq!(row.get::<_, f64>(1), 2.0);
    assert_eq!(row.get::<_, Option<bool>>(2), None);
}

#[test]
fn single_transaction_with_jsonb() {
    let Some(url) = test_url() else {
        eprintln!("skipping: {URL_VAR} not set");
        return;
    };

    let config = ImportConfig {
        json_type: JsonColumnType::Jsonb,
        single_transaction: true,
        ..config_for(&url, "json2pg_jsonb")
    };
    let mut input = br#"[{"doc":{"k":[1,2]}},{"doc":null}]"#.to_vec();
    import_json(&mut input, &config).expect("import");

    let mut client = connect(&url);
    let rows = client
        .query(
            r#"SELECT doc->'k'->>1, doc IS NULL FROM "json2pg_jsonb" ORDER BY _generated_id"#,
            &[],
        )
        .expect("select");
    assert_eq!(rows[0].get::<_, Option<String>>(0).as_deref(), Some("2"));
    assert!(rows[1].get::<_, bool>(1));
}
