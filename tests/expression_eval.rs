use rust_data_cleansing::DataError;
use rust_data_cleansing::expr::{PostfixToken, SeriesExpression};
use rust_data_cleansing::frame::DataFrame;
use rust_data_cleansing::io::{CsvOptions, read_csv_from_path};
use rust_data_cleansing::series::BinaryOp;
use rust_data_cleansing::types::{DataType, Value};

fn sensors() -> DataFrame {
    read_csv_from_path("tests/fixtures/sensors.csv", &CsvOptions::default()).unwrap()
}

#[test]
fn float_times_integer_column() {
    let df = sensors();
    let out = SeriesExpression::parse("temp * factor", &df)
        .unwrap()
        .evaluate()
        .unwrap();

    assert_eq!(out.label(), "temp");
    assert_eq!(out.dtype(), Some(DataType::Float64));
    assert_eq!(
        out.values(),
        &[Value::Float64(40.0), Value::Float64(102.0), Value::Null]
    );
}

#[test]
fn grouped_sum_divided_is_float_with_nulls() {
    let df = sensors();
    let out = SeriesExpression::parse("( temp + humidity ) / 2", &df)
        .unwrap()
        .evaluate()
        .unwrap();
    assert_eq!(out.values(), &[Value::Float64(30.0), Value::Null, Value::Null]);
}

#[test]
fn integer_arithmetic_stays_integer() {
    let df = sensors();
    let out = SeriesExpression::parse("humidity - factor * 10", &df)
        .unwrap()
        .evaluate()
        .unwrap();
    assert_eq!(out.dtype(), Some(DataType::Int64));
    assert_eq!(
        out.values(),
        &[Value::Int64(20), Value::Null, Value::Int64(50)]
    );
}

#[test]
fn postfix_tokens_reference_frame_columns() {
    let df = sensors();
    let expr = SeriesExpression::parse("temp * ( humidity + 1 ) / factor", &df).unwrap();
    assert_eq!(expr.postfix_string(), "temp humidity 1 + * factor /");

    let tokens = expr.postfix();
    assert_eq!(tokens.len(), 7);
    assert!(matches!(tokens[0], PostfixToken::Column(s) if s.label() == "temp"));
    assert_eq!(tokens[2], PostfixToken::Literal(Value::Int64(1)));
    assert_eq!(tokens[3], PostfixToken::Operator(BinaryOp::Add));
}

#[test]
fn text_column_operand_fails() {
    let df = sensors();
    let err = SeriesExpression::parse("sensor + 1", &df)
        .unwrap()
        .evaluate()
        .unwrap_err();
    assert_eq!(
        err,
        DataError::InvalidOperand {
            op: '+',
            value: "s1".to_string(),
            position: 0,
        }
    );
}

#[test]
fn unknown_label_fails_at_parse_time() {
    let df = sensors();
    let err = SeriesExpression::parse("temp * pressure", &df).unwrap_err();
    assert_eq!(
        err,
        DataError::ColumnNotFound {
            label: "pressure".to_string()
        }
    );
}

#[test]
fn source_frame_is_not_modified() {
    let df = sensors();
    let before = df.clone();
    let _ = SeriesExpression::parse("temp + temp", &df)
        .unwrap()
        .evaluate()
        .unwrap();
    assert_eq!(df, before);
}
