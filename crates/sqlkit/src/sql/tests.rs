use super::*;
use crate::error::DbError;
use crate::value::SqlValue;

#[test]
fn compiles_placeholders_in_order() {
    let compiled = NamedSql::compile("SELECT * FROM t WHERE id = :id AND name = :name").unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM t WHERE id = ? AND name = ?");
    assert_eq!(compiled.names(), &["id".to_string(), "name".to_string()]);
    assert_eq!(compiled.placeholder_count(), 2);
}

#[test]
fn repeated_name_yields_repeated_entries() {
    let compiled =
        NamedSql::compile("SELECT * FROM t WHERE a = :v OR b = :v OR c = :other").unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM t WHERE a = ? OR b = ? OR c = ?");
    assert_eq!(
        compiled.names(),
        &["v".to_string(), "v".to_string(), "other".to_string()]
    );
}

#[test]
fn template_without_placeholders_passes_through() {
    let text = "SELECT 1 FROM dual";
    let compiled = NamedSql::compile(text).unwrap();
    assert_eq!(compiled.sql(), text);
    assert!(compiled.names().is_empty());
}

#[test]
fn colon_inside_literal_is_not_a_placeholder() {
    let text = "SELECT * FROM t WHERE name = ':literal'";
    let compiled = NamedSql::compile(text).unwrap();
    assert_eq!(compiled.sql(), text);
    assert_eq!(compiled.placeholder_count(), 0);
}

#[test]
fn doubled_quote_keeps_literal_state() {
    let text = "SELECT 'it''s :not a param' FROM t WHERE x = :x";
    let compiled = NamedSql::compile(text).unwrap();
    assert_eq!(compiled.sql(), "SELECT 'it''s :not a param' FROM t WHERE x = ?");
    assert_eq!(compiled.names(), &["x".to_string()]);
}

#[test]
fn double_colon_cast_is_literal() {
    let text = "SELECT total::bigint FROM orders WHERE id = :id";
    let compiled = NamedSql::compile(text).unwrap();
    assert_eq!(compiled.sql(), "SELECT total::bigint FROM orders WHERE id = ?");
    assert_eq!(compiled.names(), &["id".to_string()]);
}

#[test]
fn trailing_and_lone_colons_are_literal() {
    let compiled = NamedSql::compile("SELECT 'a' : , : 'b' FROM t WHERE x = :").unwrap();
    assert_eq!(compiled.sql(), "SELECT 'a' : , : 'b' FROM t WHERE x = :");
    assert_eq!(compiled.placeholder_count(), 0);
}

#[test]
fn digits_and_underscore_are_identifier_chars() {
    let compiled = NamedSql::compile("WHERE a = :p1 AND b = :user_name").unwrap();
    assert_eq!(compiled.sql(), "WHERE a = ? AND b = ?");
    assert_eq!(
        compiled.names(),
        &["p1".to_string(), "user_name".to_string()]
    );
}

#[test]
fn unterminated_literal_is_malformed() {
    let err = NamedSql::compile("SELECT * FROM t WHERE name = 'oops").unwrap_err();
    match err {
        DbError::MalformedTemplate { offset } => assert_eq!(offset, 29),
        other => panic!("expected MalformedTemplate, got {other:?}"),
    }
}

#[test]
fn resolves_named_params_in_placeholder_order() {
    let compiled = NamedSql::compile("SELECT * FROM t WHERE id = :id AND name = :name").unwrap();
    let values = Params::named()
        .bind("name", "a")
        .bind("id", 5)
        .resolve(&compiled)
        .unwrap();
    assert_eq!(values, vec![SqlValue::Int(5), SqlValue::Text("a".into())]);
}

#[test]
fn repeated_name_is_bound_per_occurrence() {
    let compiled = NamedSql::compile("WHERE a = :v OR b = :v").unwrap();
    let values = Params::named().bind("v", 7).resolve(&compiled).unwrap();
    assert_eq!(values, vec![SqlValue::Int(7), SqlValue::Int(7)]);
}

#[test]
fn missing_named_param_is_an_error() {
    let compiled = NamedSql::compile("WHERE id = :id AND name = :name").unwrap();
    let err = Params::named().bind("id", 1).resolve(&compiled).unwrap_err();
    match err {
        DbError::UnresolvedParameter(name) => assert_eq!(name, "name"),
        other => panic!("expected UnresolvedParameter, got {other:?}"),
    }
}

#[test]
fn named_null_binds_sql_null() {
    let compiled = NamedSql::compile("WHERE note = :note").unwrap();
    let values = Params::named()
        .bind("note", Option::<&str>::None)
        .resolve(&compiled)
        .unwrap();
    assert_eq!(values, vec![SqlValue::Null]);
}

#[test]
fn positional_count_must_match() {
    let compiled = NamedSql::compile("WHERE a = :a AND b = :b").unwrap();
    let err = Params::positional([1]).resolve(&compiled).unwrap_err();
    match err {
        DbError::ParameterCountMismatch { expected, got } => {
            assert_eq!((expected, got), (2, 1));
        }
        other => panic!("expected ParameterCountMismatch, got {other:?}"),
    }
}

#[test]
fn no_params_against_plain_sql() {
    let compiled = NamedSql::compile("DELETE FROM t").unwrap();
    assert!(Params::None.resolve(&compiled).unwrap().is_empty());

    let compiled = NamedSql::compile("DELETE FROM t WHERE id = :id").unwrap();
    assert!(matches!(
        Params::None.resolve(&compiled),
        Err(DbError::ParameterCountMismatch { expected: 1, got: 0 })
    ));
}
