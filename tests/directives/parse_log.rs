//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


use zi_wrangle::directives::parse_log::PARSE_ERROR_COLUMN;
use zi_wrangle::{ZiError, ZiRecipeRunner, ZiRow, ZiValue};

use crate::run;

const LINE: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;

#[test]
fn test_parse_as_log_adds_field_columns() {
    let out = run("parse-as-log :line common", vec![ZiRow::new().with("line", LINE)]).unwrap();

    let row = &out[0];
    assert_eq!(row.get("line"), Some(&ZiValue::from(LINE)));
    assert_eq!(row.get("ip_connection_client_host"), Some(&ZiValue::from("127.0.0.1")));
    assert_eq!(row.get("http_uri_request_firstline_uri"), Some(&ZiValue::from("/apache_pb.gif")));
    assert_eq!(row.get("string_request_status_last"), Some(&ZiValue::from("200")));
    assert!(row.get(PARSE_ERROR_COLUMN).is_none());
}

#[test]
fn test_parse_as_log_accepts_bytes() {
    let input = ZiRow::new().with("line", ZiValue::Bytes(LINE.as_bytes().to_vec()));
    let out = run("parse-as-log :line common", vec![input]).unwrap();
    assert_eq!(out[0].get("bytes_response_body_bytes"), Some(&ZiValue::from("2326")));
}

#[test]
fn test_parse_as_log_flags_unmatched_lines() {
    let runner = ZiRecipeRunner::new("parse-as-log :line common");
    let mut pipeline = runner.compile().unwrap().into_pipeline();
    let out = pipeline
        .run(vec![ZiRow::new().with("line", "garbage"), ZiRow::new().with("other", 1)])
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].get(PARSE_ERROR_COLUMN), Some(&ZiValue::Int(1)));
    assert!(out[1].get(PARSE_ERROR_COLUMN).is_none());
    assert_eq!(pipeline.issues().len(), 1);
    assert_eq!(pipeline.issues()[0].row, 0);
}

#[test]
fn test_parse_as_log_custom_format() {
    let recipe = r#"parse-as-log :line '%v:%p "%r" %D'"#;
    let out = run(recipe, vec![ZiRow::new().with("line", r#"example.com:443 "POST /api HTTP/2" 1250"#)]).unwrap();

    let row = &out[0];
    assert_eq!(row.get("string_connection_server_name"), Some(&ZiValue::from("example.com")));
    assert_eq!(row.get("port_connection_server_port"), Some(&ZiValue::from("443")));
    assert_eq!(row.get("http_method_request_firstline_method"), Some(&ZiValue::from("POST")));
    assert_eq!(
        row.get("microseconds_response_server_processing_time"),
        Some(&ZiValue::from("1250"))
    );
}

#[test]
fn test_parse_as_log_rejects_non_text_values() {
    let err = run("parse-as-log :line common", vec![ZiRow::new().with("line", 42)]).unwrap_err();
    assert!(matches!(err, ZiError::DirectiveExecution { .. }));
    assert!(err.to_string().contains("invalid type"));
}
