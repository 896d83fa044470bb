use super::operation::Operation;
use super::request_common::{
    HTTPRequestMethod, Params, build_url, encode_query, is_login_resource, join_path,
};
use serde_json::json;
use std::collections::HashSet;

const BASE: &str = "https://api.example.org:443";

fn decode_pairs(query: &str) -> HashSet<(String, String)> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                percent_encoding::percent_decode_str(k).decode_utf8_lossy().into_owned(),
                percent_encoding::percent_decode_str(v).decode_utf8_lossy().into_owned(),
            )
        })
        .collect()
}

#[test]
fn test_method_normalization() {
    assert_eq!(HTTPRequestMethod::from_name(" POST "), HTTPRequestMethod::Post);
    assert_eq!(HTTPRequestMethod::from_name("Patch"), HTTPRequestMethod::Patch);
    assert_eq!(HTTPRequestMethod::from_name("options"), HTTPRequestMethod::Get);
    assert_eq!(HTTPRequestMethod::parse("head"), None);
    assert_eq!(HTTPRequestMethod::Delete.to_string(), "delete");
    assert!(HTTPRequestMethod::Put.carries_body());
    assert!(!HTTPRequestMethod::Delete.carries_body());
}

#[test]
fn test_read_timeouts() {
    assert_eq!(HTTPRequestMethod::Get.read_timeout().as_secs(), 120);
    assert_eq!(HTTPRequestMethod::Post.read_timeout().as_secs(), 30);
    assert_eq!(HTTPRequestMethod::Delete.read_timeout().as_secs(), 30);
}

#[test]
fn test_leading_slash_is_stripped_once() {
    assert_eq!(build_url(BASE, "foo/1"), build_url(BASE, "/foo/1"));
    assert_eq!(build_url(BASE, "/foo/1"), format!("{BASE}/foo/1"));
    assert_eq!(build_url(BASE, "//foo"), format!("{BASE}//foo"));
    assert_eq!(build_url(BASE, "  devices "), format!("{BASE}/devices"));
}

#[test]
fn test_empty_and_query_only_resources() {
    assert_eq!(build_url(BASE, ""), BASE);
    assert_eq!(build_url(BASE, "/"), BASE);
    assert_eq!(build_url(BASE, "?a=1"), format!("{BASE}?a=1"));
}

#[test]
fn test_query_encoding_decodes_to_params() {
    let mut params = Params::new();
    params.insert("a".into(), json!("1"));
    params.insert("b".into(), json!("2"));
    let expected: HashSet<(String, String)> =
        [("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())].into();
    assert_eq!(decode_pairs(&encode_query(&params)), expected);
}

#[test]
fn test_query_encoding_escapes() {
    let mut params = Params::new();
    params.insert("name".into(), json!("a b&c=d"));
    params.insert("limit".into(), json!(10));
    params.insert("path".into(), json!("x/y"));
    let query = encode_query(&params);
    assert!(query.contains("name=a%20b%26c%3Dd"));
    assert!(query.contains("limit=10"));
    assert!(query.contains("path=x/y"));
}

#[test]
fn test_join_path_skips_empty() {
    assert_eq!(join_path(&["devices", "", "4"]), "devices/4");
    assert_eq!(join_path::<&str>(&[]), "");
}

#[test]
fn test_login_detection() {
    assert!(is_login_resource("auth/login"));
    assert!(is_login_resource("login?user=x"));
    assert!(!is_login_resource("login/devices"));
    assert!(!is_login_resource("devices"));
}

#[test]
fn test_operation_parse() {
    let op = Operation::parse("get_devices_4").unwrap();
    assert_eq!(op.method(), HTTPRequestMethod::Get);
    assert_eq!(op.segments(), ["devices".to_string(), "4".to_string()]);
    assert_eq!(op.resource(&["ports", "", "7"]), "devices/4/ports/7");

    let bare = Operation::parse("delete").unwrap();
    assert_eq!(bare.method(), HTTPRequestMethod::Delete);
    assert_eq!(bare.resource::<&str>(&[]), "");
}

#[test]
fn test_unknown_operation() {
    assert_eq!(Operation::parse("foo_bar"), None);
    assert_eq!(Operation::parse(""), None);
    assert_eq!(Operation::parse("_devices"), None);
}

#[test]
fn test_operation_verbs_are_case_sensitive() {
    assert_eq!(Operation::parse("GET_devices"), None);
    assert_eq!(Operation::parse("Post"), None);
    assert_eq!(Operation::parse(" get_devices"), None);
    assert_eq!(HTTPRequestMethod::from_name("GET"), HTTPRequestMethod::Get);
}
