//! Integration tests for the connection lifecycle against a scripted driver.

mod common;

use common::{MockDriver, MockError, text_row, wrapper};
use oxide_oracle_backend::{BackendError, ConfigError, ConnectionConfig, DatabaseWrapper, DbValue};
use oxide_oracle_core::{
    BoundParams, BoundValue, Charset, DatabaseOperations, DialectError, InputSize, InputSizes,
    LookupType, OracleOperations, Param, Params, PlainStyle, SESSION_INIT_SQL, SequenceInfo,
    ServerVersion,
};

// =============================================================================
// Connecting
// =============================================================================

#[test]
fn test_missing_name_fails_before_driver_call() {
    let driver = MockDriver::new();
    let mut db = DatabaseWrapper::new(ConnectionConfig::default(), driver.clone());

    let err = db.cursor().unwrap_err();
    assert!(matches!(
        err,
        BackendError::Configuration(ConfigError::Missing("name"))
    ));
    assert!(driver.state.borrow().connects.is_empty());
    assert!(!db.is_connected());
}

#[test]
fn test_connect_passes_dsn_and_credentials() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    db.cursor().unwrap();

    let state = driver.state.borrow();
    assert_eq!(
        state.connects,
        vec![(
            "jdbc:oracle:thin:@db.internal:1521:orcl".to_string(),
            "scott".to_string(),
            "tiger".to_string(),
        )]
    );
}

#[test]
fn test_dsn_defaults_host_and_port() {
    let driver = MockDriver::new();
    let mut db = DatabaseWrapper::new(ConnectionConfig::new("orcl"), driver.clone());
    db.cursor().unwrap();

    assert_eq!(
        driver.state.borrow().connects[0].0,
        "jdbc:oracle:thin:@localhost::orcl"
    );
}

#[test]
fn test_connects_once_and_initializes_session_first() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);

    db.cursor()
        .unwrap()
        .execute("SELECT 1 FROM dual", Params::none())
        .unwrap();
    db.cursor()
        .unwrap()
        .execute("SELECT 2 FROM dual", Params::none())
        .unwrap();

    let state = driver.state.borrow();
    assert_eq!(state.connects.len(), 1);
    assert_eq!(
        state.executed_sql(),
        vec![SESSION_INIT_SQL, "SELECT 1 FROM dual", "SELECT 2 FROM dual"]
    );
    assert_eq!(state.cache_size, Some(20));
    assert!(db.is_connected());
}

#[test]
fn test_every_cursor_enables_numbers_as_strings() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    db.cursor().unwrap();
    db.cursor().unwrap();

    // Session-init cursor plus two user cursors.
    assert_eq!(driver.state.borrow().numbers_as_strings, vec![true; 3]);
}

#[test]
fn test_cache_size_failure_is_ignored() {
    let driver = MockDriver::new();
    driver.state.borrow_mut().fail_cache_size = true;
    let mut db = wrapper(&driver);

    assert!(db.cursor().is_ok());
    assert_eq!(driver.state.borrow().cache_size, None);
}

#[test]
fn test_connect_error_is_passed_through() {
    let driver = MockDriver::new();
    driver.state.borrow_mut().fail_connect =
        Some(MockError::database("ORA-12541: TNS:no listener"));
    let mut db = wrapper(&driver);

    let err = db.cursor().unwrap_err();
    assert_eq!(err.to_string(), "ORA-12541: TNS:no listener");
    assert_eq!(
        err.driver_error(),
        Some(&MockError::database("ORA-12541: TNS:no listener"))
    );
    assert!(!db.is_connected());
}

#[test]
fn test_session_setup_failure_closes_handle() {
    let driver = MockDriver::new();
    driver.state.borrow_mut().fail_execute = Some((
        "ALTER SESSION".to_string(),
        MockError::database("ORA-01821: date format not recognized"),
    ));
    let mut db = wrapper(&driver);

    let err = db.cursor().unwrap_err();
    assert_eq!(err.to_string(), "ORA-01821: date format not recognized");
    assert!(!db.is_connected());
    let state = driver.state.borrow();
    assert_eq!(state.connects.len(), 1);
    assert_eq!(state.closed, 1);
}

// =============================================================================
// Closing
// =============================================================================

#[test]
fn test_close_then_cursor_fails() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    db.cursor().unwrap();

    db.close().unwrap();
    assert!(db.is_closed());
    assert_eq!(driver.state.borrow().closed, 1);
    assert!(matches!(db.cursor(), Err(BackendError::NotConnected)));
    assert!(matches!(
        db.regex_lookup(LookupType::Regex),
        Err(BackendError::NotConnected)
    ));
}

#[test]
fn test_close_twice_and_close_unconnected() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);

    db.close().unwrap();
    db.close().unwrap();
    assert!(db.is_closed());
    assert_eq!(driver.state.borrow().closed, 0);
    assert!(driver.state.borrow().connects.is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_integrity_error_is_classified() {
    let driver = MockDriver::new();
    driver.state.borrow_mut().fail_execute = Some((
        "INSERT".to_string(),
        MockError::integrity("ORA-00001: unique constraint violated"),
    ));
    let mut db = wrapper(&driver);
    let mut cursor = db.cursor().unwrap();

    let err = cursor
        .execute("INSERT INTO \"T\" VALUES (:1)", Params::positional([1_i64]))
        .unwrap_err();
    assert!(err.is_integrity_error());
    assert_eq!(err.to_string(), "ORA-00001: unique constraint violated");
}

#[test]
fn test_database_error_is_not_integrity() {
    let driver = MockDriver::new();
    driver.state.borrow_mut().fail_execute = Some((
        "MISSING".to_string(),
        MockError::database("ORA-00942: table or view does not exist"),
    ));
    let mut db = wrapper(&driver);
    let mut cursor = db.cursor().unwrap();

    let err = cursor
        .execute("SELECT * FROM MISSING", Params::none())
        .unwrap_err();
    assert!(matches!(err, BackendError::Database(_)));
    assert!(!err.is_integrity_error());
}

// =============================================================================
// Capability discovery
// =============================================================================

#[test]
fn test_regex_lookup_connects_and_discovers() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);

    let op = db.regex_lookup(LookupType::IRegex).unwrap();
    assert_eq!(op, "REGEXP_LIKE(%s, %s, 'i')");
    assert_eq!(driver.state.borrow().connects.len(), 1);
    assert_eq!(db.ops().server_version(), Some(ServerVersion::new(10, 2)));
}

#[test]
fn test_regex_lookup_on_9i_is_unsupported() {
    let driver = MockDriver::with_version(Some("Oracle9i Enterprise Edition Release 9.2.0.1.0"));
    let mut db = wrapper(&driver);

    let err = db.regex_lookup(LookupType::Regex).unwrap_err();
    assert!(matches!(
        err,
        BackendError::Dialect(DialectError::Unsupported { .. })
    ));
}

#[test]
fn test_regex_lookup_gives_up_after_one_retry() {
    let driver = MockDriver::with_version(Some("no version here"));
    let mut db = wrapper(&driver);

    let err = db.regex_lookup(LookupType::Regex).unwrap_err();
    assert!(matches!(err, BackendError::CapabilityDiscovery(_)));
    // Once while connecting. The retry does not query again.
    assert_eq!(driver.state.borrow().version_queries, 1);

    // A later call on the open connection rediscovers once more.
    let err = db.regex_lookup(LookupType::Regex).unwrap_err();
    assert!(matches!(err, BackendError::CapabilityDiscovery(_)));
    assert_eq!(driver.state.borrow().version_queries, 2);
    assert_eq!(driver.state.borrow().connects.len(), 1);
}

#[test]
fn test_version_query_failure_does_not_fail_connect() {
    let driver = MockDriver::with_version(None);
    let mut db = wrapper(&driver);

    assert!(db.cursor().is_ok());
    assert_eq!(db.ops().server_version(), None);
}

#[test]
fn test_preresolved_ops_skip_round_trip() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver)
        .with_operations(OracleOperations::with_version(ServerVersion::new(11, 2)));

    assert_eq!(
        db.lookup_operator(LookupType::Regex).unwrap(),
        "REGEXP_LIKE(%s, %s, 'c')"
    );
    assert!(driver.state.borrow().connects.is_empty());
}

#[test]
fn test_non_regex_lookup_needs_no_connection() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);

    assert_eq!(
        db.lookup_operator(LookupType::StartsWith).unwrap(),
        "LIKEC %s ESCAPE '\\'"
    );
    assert!(driver.state.borrow().connects.is_empty());
}

// =============================================================================
// Cursors
// =============================================================================

#[test]
fn test_fetchmany_defaults_to_arraysize_and_ends_empty() {
    let driver = MockDriver::new();
    let rows: Vec<_> = (0..150).map(|i| text_row(&[&i.to_string()])).collect();
    driver.respond("FROM \"BIG\"", rows);
    let mut db = wrapper(&driver);
    let mut cursor = db.cursor().unwrap();

    cursor
        .execute("SELECT \"ID\" FROM \"BIG\"", Params::none())
        .unwrap();
    assert_eq!(cursor.arraysize(), 100);
    assert_eq!(cursor.fetchmany(None).unwrap().len(), 100);
    assert_eq!(cursor.fetchmany(Some(30)).unwrap().len(), 30);
    assert_eq!(cursor.fetchall().unwrap().len(), 20);
    assert!(cursor.fetchmany(None).unwrap().is_empty());
    assert_eq!(cursor.fetchone().unwrap(), None);
}

#[test]
fn test_statements_are_normalized() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    let ops = *db.ops();
    let autoinc = ops.autoinc_sql("blog_post", "id").unwrap();

    {
        let mut cursor = db.cursor().unwrap();
        for sql in autoinc.into_statements() {
            cursor.execute(&sql, Params::none()).unwrap();
        }
        cursor
            .execute("DELETE FROM \"BLOG_POST\";\n", Params::none())
            .unwrap();
    }

    let state = driver.state.borrow();
    let executed = state.executed_sql();
    assert!(executed[1].starts_with("DECLARE"));
    assert!(executed[1].ends_with("END;"));
    assert!(executed[2].starts_with("CREATE OR REPLACE TRIGGER BLOG_POST_TR"));
    assert!(executed[2].ends_with("END;"));
    assert_eq!(executed[3], "DELETE FROM \"BLOG_POST\"");
}

#[test]
fn test_flush_statements_run_in_order() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    let ops = *db.ops();
    let statements = ops.sql_flush(
        &PlainStyle,
        &["blog_post", "blog_tag"],
        &[SequenceInfo::for_table("blog_post")],
    );

    {
        let mut cursor = db.cursor().unwrap();
        for sql in &statements {
            cursor.execute(sql, Params::none()).unwrap();
        }
    }

    let state = driver.state.borrow();
    let executed = &state.executed_sql()[1..];
    assert_eq!(executed.len(), 3);
    assert_eq!(executed[0], "DELETE FROM \"BLOG_POST\"");
    assert_eq!(executed[1], "DELETE FROM \"BLOG_TAG\"");
    assert!(executed[2].contains("LOCK TABLE \"BLOG_POST\" IN SHARE MODE"));
}

#[test]
fn test_long_text_is_bound_as_nclob() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    let body = "x".repeat(4001);

    db.cursor()
        .unwrap()
        .execute(
            "INSERT INTO \"DOC\" (\"BODY\", \"TITLE\") VALUES (:1, :2)",
            Params::positional([body.as_str(), "short"]),
        )
        .unwrap();

    let state = driver.state.borrow();
    let BoundParams::Positional(params) = &state.executed[1].1 else {
        panic!("expected positional parameters");
    };
    assert_eq!(params[0].input_size, Some(InputSize::Nclob));
    assert_eq!(params[1].input_size, None);
    assert_eq!(params[1].value, BoundValue::Text(b"short".to_vec()));
}

#[test]
fn test_text_uses_connection_charset() {
    let driver = MockDriver::new();
    let mut db = DatabaseWrapper::new(common::config().charset(Charset::Latin1), driver.clone());
    let mut cursor = db.cursor().unwrap();

    cursor
        .execute("SELECT :1 FROM dual", Params::positional(["café"]))
        .unwrap();
    let err = cursor
        .execute("SELECT :1 FROM dual", Params::positional(["€"]))
        .unwrap_err();
    assert!(matches!(
        err,
        BackendError::Dialect(DialectError::Unencodable { ch: '€', .. })
    ));
    drop(cursor);

    let state = driver.state.borrow();
    // The unencodable statement never reached the driver.
    assert_eq!(state.executed.len(), 2);
    let BoundParams::Positional(params) = &state.executed[1].1 else {
        panic!("expected positional parameters");
    };
    assert_eq!(params[0].value, BoundValue::Text(vec![b'c', b'a', b'f', 0xE9]));
}

#[test]
fn test_executemany_collects_input_sizes() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    let long = "y".repeat(5000);
    let batch = vec![
        Params::positional([Param::new("a"), Param::new(1_i64)]),
        Params::positional([Param::new(long.as_str()), Param::new(2_i64)]),
    ];

    let mut cursor = db.cursor().unwrap();
    cursor
        .executemany("INSERT INTO \"T\" VALUES (:1, :2);", &batch)
        .unwrap();
    assert_eq!(cursor.rowcount(), Some(2));
    drop(cursor);

    let state = driver.state.borrow();
    let (sql, bound, sizes) = &state.batches[0];
    assert_eq!(sql, "INSERT INTO \"T\" VALUES (:1, :2)");
    assert_eq!(bound.len(), 2);
    assert_eq!(
        sizes.as_ref(),
        Some(&InputSizes::Positional(vec![Some(InputSize::Nclob), None]))
    );
}

// =============================================================================
// Helpers built on cursors
// =============================================================================

#[test]
fn test_last_insert_id() {
    let driver = MockDriver::new();
    driver.respond(
        "BLOG_POST_SQ.currval",
        vec![vec![DbValue::Number("42".to_string())]],
    );
    let mut db = wrapper(&driver);

    assert_eq!(db.last_insert_id("blog_post", "id").unwrap(), Some(42));
    assert_eq!(
        driver.state.borrow().executed_sql()[1],
        "SELECT BLOG_POST_SQ.currval FROM dual"
    );
}

#[test]
fn test_last_insert_id_rejects_garbage() {
    let driver = MockDriver::new();
    driver.respond("currval", vec![text_row(&["forty-two"])]);
    let mut db = wrapper(&driver);

    assert!(matches!(
        db.last_insert_id("blog_post", "id"),
        Err(BackendError::UnexpectedValue(_))
    ));
}

#[test]
fn test_introspection_lowercases_names() {
    let driver = MockDriver::new();
    driver.respond(
        "USER_TABLES",
        vec![text_row(&["BLOG_POST"]), text_row(&["AUTH_USER"])],
    );
    driver.respond("USER_SEQUENCES", vec![text_row(&["BLOG_POST_SQ"])]);
    let mut db = wrapper(&driver);

    assert_eq!(db.table_names().unwrap(), vec!["blog_post", "auth_user"]);
    assert_eq!(db.sequence_names().unwrap(), vec!["blog_post_sq"]);
}

#[test]
fn test_capabilities_json() {
    let driver = MockDriver::new();
    let mut db = wrapper(&driver);
    db.cursor().unwrap();

    let json: serde_json::Value = serde_json::from_str(&db.capabilities_json().unwrap()).unwrap();
    assert_eq!(json["vendor"], "oracle");
    assert_eq!(json["server_version"], "10.2");
    assert_eq!(json["features"]["interprets_empty_strings_as_nulls"], true);
}
