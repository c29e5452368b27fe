//! Builder semantics: cloning, headers, URL resolution, query merging, and
//! body providers, all observed through materialized requests.

use fronde::{ContentType, Error, Fronde, Method, RawBody};

#[derive(Debug, serde::Serialize)]
struct SearchParams {
    q: &'static str,
    page: u32,
}

fn base() -> Fronde {
    Fronde::new().base("http://api.test/")
}

// ============================================================================
// Cloning
// ============================================================================

#[test]
fn clone_branches_headers_independently() {
    let parent = base().set("X-Shared", "parent");

    let child = parent.clone().set("X-Shared", "child").add("X-Extra", "1");

    let parent_request = parent.request().expect("parent request");
    assert_eq!(parent_request.header("X-Shared"), Some("parent"));
    assert!(parent_request.header("X-Extra").is_none());

    let child_request = child.request().expect("child request");
    assert_eq!(child_request.header("X-Shared"), Some("child"));
    assert_eq!(child_request.header("X-Extra"), Some("1"));
}

#[test]
fn clone_branches_query_sources_independently() {
    let parent = base().query_values([("a", "1")]);
    let child = parent.clone().query_values([("b", "2")]);

    let parent_url = parent.request().expect("parent request").url().clone();
    assert_eq!(parent_url.query(), Some("a=1"));

    let child_url = child.request().expect("child request").url().clone();
    assert_eq!(child_url.query(), Some("a=1&b=2"));
}

#[test]
fn clone_branches_method_and_url() {
    let parent = base();
    let foo = parent.clone().get("foo/");
    let bar = parent.clone().post("bar/");

    assert_eq!(foo.request().expect("foo").url().as_str(), "http://api.test/foo/");
    assert_eq!(bar.request().expect("bar").url().as_str(), "http://api.test/bar/");
    assert_eq!(bar.request().expect("bar").method(), Method::Post);
    // the parent is untouched
    assert_eq!(parent.request().expect("parent").url().as_str(), "http://api.test/");
    assert_eq!(parent.request().expect("parent").method(), Method::Get);
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn set_replaces_all_values() {
    let request = base()
        .set("X-Token", "one")
        .set("X-Token", "two")
        .request()
        .expect("request");

    let values: Vec<_> = request.headers().get_all("x-token").iter().collect();
    assert_eq!(values, ["two"]);
}

#[test]
fn add_appends_values_in_order() {
    let request = base()
        .add("Accept", "application/json")
        .add("Accept", "text/plain")
        .request()
        .expect("request");

    let values: Vec<_> = request.headers().get_all("accept").iter().collect();
    assert_eq!(values, ["application/json", "text/plain"]);
}

#[test]
fn header_keys_are_case_insensitive() {
    let request = base()
        .set("x-custom", "lower")
        .set("X-CUSTOM", "upper")
        .request()
        .expect("request");

    let values: Vec<_> = request.headers().get_all("X-Custom").iter().collect();
    assert_eq!(values, ["upper"]);
}

#[test]
fn bulk_header_variants_preserve_value_order() {
    let mut bulk = fronde::HeaderMap::new();
    bulk.append("x-many", "1".parse().expect("value"));
    bulk.append("x-many", "2".parse().expect("value"));

    let request = base()
        .set("X-Many", "stale")
        .set_headers(&bulk)
        .request()
        .expect("request");
    let values: Vec<_> = request.headers().get_all("x-many").iter().collect();
    assert_eq!(values, ["1", "2"]);

    let request = base()
        .set("X-Many", "kept")
        .add_headers(&bulk)
        .request()
        .expect("request");
    let values: Vec<_> = request.headers().get_all("x-many").iter().collect();
    assert_eq!(values, ["kept", "1", "2"]);
}

#[test]
fn basic_auth_sets_authorization_header() {
    // "user:pass" -> "dXNlcjpwYXNz"
    let request = base()
        .set_basic_auth("user", "pass")
        .request()
        .expect("request");

    assert_eq!(request.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[test]
fn basic_auth_overwrites_existing_authorization() {
    let request = base()
        .set("Authorization", "Bearer stale")
        .set_basic_auth("user", "pass")
        .request()
        .expect("request");

    let values: Vec<_> = request.headers().get_all("authorization").iter().collect();
    assert_eq!(values, ["Basic dXNlcjpwYXNz"]);
}

// ============================================================================
// URL resolution
// ============================================================================

#[test]
fn path_extends_base_with_trailing_slash() {
    let fronde = base().path("a/").path("b");
    assert_eq!(fronde.url(), "http://api.test/a/b");
}

#[test]
fn absolute_path_replaces_path_component() {
    let fronde = base().path("one/two/").path("/rooted");
    assert_eq!(fronde.url(), "http://api.test/rooted");
}

#[test]
fn dot_segments_normalize() {
    let fronde = base().path("a/b/").path("../c");
    assert_eq!(fronde.url(), "http://api.test/a/c");
}

#[test]
fn base_replaces_url_outright() {
    let fronde = base().path("ignored/").base("http://other.test/fresh");
    assert_eq!(fronde.url(), "http://other.test/fresh");
}

#[test]
fn method_setters_set_method_and_path() {
    let fronde = base().put("items/7");
    let request = fronde.request().expect("request");
    assert_eq!(request.method(), Method::Put);
    assert_eq!(request.url().as_str(), "http://api.test/items/7");
}

#[test]
fn method_alone_does_not_touch_path() {
    let fronde = base().path("items/").method(Method::Delete);
    let request = fronde.request().expect("request");
    assert_eq!(request.method(), Method::Delete);
    assert_eq!(request.url().as_str(), "http://api.test/items/");
}

#[test]
fn path_failure_is_absorbed_until_request() {
    // an unparseable base makes path a silent no-op
    let fronde = Fronde::new().base("::not a url::").path("users/");
    assert_eq!(fronde.url(), "::not a url::");

    let err = fronde.request().expect_err("should fail");
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn empty_url_fails_at_request_time() {
    let err = Fronde::new().request().expect_err("should fail");
    assert!(matches!(err, Error::InvalidUrl(_)));
}

// ============================================================================
// Query merging
// ============================================================================

#[test]
fn query_values_merge_with_existing_query() {
    let request = Fronde::new()
        .base("http://api.test/?a=0")
        .query_values([("a", "1")])
        .query_values([("a", "2")])
        .request()
        .expect("request");

    assert_eq!(request.url().query(), Some("a=0&a=1&a=2"));
}

#[test]
fn query_struct_and_values_merge_sorted() {
    let request = base()
        .query_struct(SearchParams { q: "rust", page: 2 })
        .query_values([("zebra", "last")])
        .request()
        .expect("request");

    assert_eq!(request.url().query(), Some("page=2&q=rust&zebra=last"));
}

#[test]
fn path_query_participates_in_merge() {
    let request = base()
        .get("c?x=1")
        .query_values([("y", "2")])
        .request()
        .expect("request");

    assert_eq!(request.url().as_str(), "http://api.test/c?x=1&y=2");
}

#[test]
fn no_query_leaves_url_bare() {
    let request = base().get("plain").request().expect("request");
    assert_eq!(request.url().as_str(), "http://api.test/plain");
    assert_eq!(request.url().query(), None);
}

// ============================================================================
// Body providers
// ============================================================================

#[test]
fn body_json_sets_content_type_and_payload() {
    let request = base()
        .post("items")
        .body_json(serde_json::json!({"n": 5}))
        .request()
        .expect("request");

    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(request.body().expect("body").as_ref(), br#"{"n":5}"#);
}

#[test]
fn body_form_sets_content_type_and_encodes_pairs() {
    let request = base()
        .post("login")
        .body_form(vec![("user", "alice"), ("mode", "full access")])
        .request()
        .expect("request");

    assert_eq!(
        request.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.body().expect("body").as_ref(), b"user=alice&mode=full+access");
}

#[test]
fn raw_body_replaces_provider_but_keeps_content_type() {
    // current behavior: the JSON provider's header survives the replacement
    let request = base()
        .post("items")
        .body_json(serde_json::json!({"stale": true}))
        .body("raw bytes")
        .request()
        .expect("request");

    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(request.body().expect("body").as_ref(), b"raw bytes");
}

#[test]
fn last_provider_wins() {
    let request = base()
        .post("items")
        .body("first")
        .body_provider(RawBody::new("second"))
        .request()
        .expect("request");

    assert_eq!(request.body().expect("body").as_ref(), b"second");
}

#[test]
fn content_type_strings() {
    assert_eq!(ContentType::Json.to_string(), "application/json");
    assert_eq!(
        ContentType::FormUrlEncoded.to_string(),
        "application/x-www-form-urlencoded"
    );
}

#[test]
fn body_encoding_failure_surfaces_at_request_time() {
    struct Broken;

    impl serde::Serialize for Broken {
        fn serialize<S: serde::Serializer>(
            &self,
            _serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unsupported payload"))
        }
    }

    let fronde = base().post("items").body_json(Broken);
    let err = fronde.request().expect_err("should fail");
    assert!(matches!(err, Error::JsonSerialization(_)));
}
