//! Tests for declarative query schemas.

use rstest::rstest;
use serde_json::json;

use super::*;

const SORTS: &[&str] = &["price", "year"];

fn input(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[rstest]
#[case(QuerySchema::string(), TypeTag::String, true)]
#[case(QuerySchema::integer().optional(), TypeTag::Integer, false)]
#[case(QuerySchema::boolean().nullable(), TypeTag::Boolean, true)]
#[case(QuerySchema::uuid().nullable().optional(), TypeTag::Uuid, false)]
#[case(QuerySchema::one_of(SORTS).with_default("price"), TypeTag::Enum, false)]
fn describe_unwraps_to_leaf(
    #[case] schema: QuerySchema,
    #[case] tag: TypeTag,
    #[case] required: bool,
) {
    let doc = schema.describe();
    assert_eq!(doc.type_tag, tag);
    assert_eq!(doc.required, required);
}

#[rstest]
#[case(QuerySchema::one_of(SORTS).with_default("year").optional())]
#[case(QuerySchema::one_of(SORTS).with_default("year").nullable())]
#[case(QuerySchema::one_of(SORTS).with_default("year").nullable().optional())]
fn nested_default_is_reported_and_applied(#[case] schema: QuerySchema) {
    let doc = schema.describe();
    assert_eq!(doc.default, Some(json!("year")));
    assert_eq!(doc.enum_members, Some(SORTS));
    assert!(!doc.required);

    assert_eq!(schema.validate(None), Ok(Some(json!("year"))));
}

#[rstest]
fn outer_default_wins_over_inner() {
    let schema = QuerySchema::integer().with_default(5).optional().with_default(7);
    assert_eq!(schema.describe().default, Some(json!(7)));
    assert_eq!(schema.validate(None), Ok(Some(json!(7))));
}

#[rstest]
fn optional_without_default_yields_absent() {
    assert_eq!(QuerySchema::uuid().optional().validate(None), Ok(None));
}

#[rstest]
fn nullable_accepts_explicit_null_only() {
    let schema = QuerySchema::integer().nullable();
    assert_eq!(schema.validate(Some(&Value::Null)), Ok(Some(Value::Null)));
    let missing = schema.validate(None).expect_err("still required");
    assert_eq!(missing.code(), IssueCode::Required);
}

#[rstest]
#[case(json!("42"), json!(42))]
#[case(json!(42), json!(42))]
#[case(json!(" 7 "), json!(7))]
fn integers_accept_text_and_numbers(#[case] raw: Value, #[case] expected: Value) {
    assert_eq!(QuerySchema::integer().validate(Some(&raw)), Ok(Some(expected)));
}

#[rstest]
#[case(json!("abc"), IssueCode::InvalidType)]
#[case(json!(0), IssueCode::TooSmall)]
#[case(json!("101"), IssueCode::TooBig)]
fn integer_failures_are_classified(#[case] raw: Value, #[case] code: IssueCode) {
    let schema = QuerySchema::integer().min(1).max(100);
    let issue = schema.validate(Some(&raw)).expect_err("rejected");
    assert_eq!(issue.code(), code);
}

#[rstest]
#[case("", IssueCode::TooSmall)]
#[case("abcdef", IssueCode::TooBig)]
fn string_length_is_counted_in_characters(#[case] raw: &str, #[case] code: IssueCode) {
    let schema = QuerySchema::string().min_len(1).max_len(5);
    let issue = schema.validate(Some(&json!(raw))).expect_err("rejected");
    assert_eq!(issue.code(), code);
    assert!(schema.validate(Some(&json!("ñandú"))).is_ok());
}

#[rstest]
#[case(json!("true"), true)]
#[case(json!(false), false)]
fn booleans_accept_text_and_literals(#[case] raw: Value, #[case] expected: bool) {
    assert_eq!(
        QuerySchema::boolean().validate(Some(&raw)),
        Ok(Some(Value::Bool(expected)))
    );
}

#[rstest]
fn uuid_is_normalised() {
    let raw = json!("3FA85F64-5717-4562-B3FC-2C963F66AFA6");
    assert_eq!(
        QuerySchema::uuid().validate(Some(&raw)),
        Ok(Some(json!("3fa85f64-5717-4562-b3fc-2c963f66afa6")))
    );
    let issue = QuerySchema::uuid()
        .validate(Some(&json!("nope")))
        .expect_err("rejected");
    assert_eq!(issue.code(), IssueCode::InvalidString);
}

#[rstest]
fn enum_issue_lists_options() {
    let issue = QuerySchema::one_of(SORTS)
        .validate(Some(&json!("colour")))
        .expect_err("rejected");
    assert_eq!(issue.code(), IssueCode::InvalidEnumValue);
    assert_eq!(issue.received(), Some(&json!("colour")));
    assert_eq!(
        issue.options(),
        Some(["price".to_owned(), "year".to_owned()].as_slice())
    );
}

#[rstest]
fn validate_fields_collects_every_issue_with_paths() {
    let fields = [
        QueryField::new("sort", "", QuerySchema::one_of(SORTS).optional()),
        QueryField::new("page", "", QuerySchema::integer().min(1).with_default(1)),
    ];
    let issues = validate_fields(
        &fields,
        &input(json!({ "sort": "colour", "page": "0", "extra": "1" })),
    )
    .expect_err("rejected");

    let paths: Vec<_> = issues.iter().map(|issue| issue.path().join(".")).collect();
    assert_eq!(paths, ["sort", "page", "extra"]);
    assert_eq!(issues[2].code(), IssueCode::UnrecognizedKey);
}

#[rstest]
fn validate_fields_fills_defaults_and_skips_absent() {
    let mut fields = pagination_fields().to_vec();
    fields.push(QueryField::new("search", "", QuerySchema::string().optional()));

    let output = validate_fields(&fields, &Map::new()).expect("valid");
    assert_eq!(Value::Object(output), json!({ "page": 1, "limit": 20 }));
}

#[rstest]
fn openapi_parameters_mirror_the_schema() {
    let fields = [
        QueryField::new("order", "Sort direction.", QuerySchema::one_of(SORTS).with_default("price")),
        QueryField::new("modelId", "Model filter.", QuerySchema::uuid().optional()),
        QueryField::new("q", "Required term.", QuerySchema::string().min_len(2)),
    ];
    let rendered = serde_json::to_value(openapi_parameters(&fields)).expect("serialises");

    assert_eq!(rendered[0]["name"], json!("order"));
    assert_eq!(rendered[0]["in"], json!("query"));
    assert_eq!(rendered[0]["required"], json!(false));
    assert_eq!(rendered[0]["schema"]["default"], json!("price"));
    assert_eq!(rendered[0]["schema"]["enum"], json!(["price", "year"]));
    assert_eq!(rendered[1]["schema"]["format"], json!("uuid"));
    assert_eq!(rendered[2]["required"], json!(true));
    assert_eq!(rendered[2]["schema"]["minLength"], json!(2));
}
