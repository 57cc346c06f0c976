// Iconify API wrapper against a local mock server


use iconfetch::iconify::{CssOptions, Flip, IconStyle, Rotation, SearchOptions, SvgOptions};
use iconfetch::{Error, IconifyClient};
use test_helpers::TestEnvironment;
use wiremock::matchers::{any, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(env: &TestEnvironment, server: &MockServer) -> IconifyClient {
    IconifyClient::new(&env.config(server)).unwrap()
}

#[tokio::test]
async fn test_collections() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .and(query_param("prefixes", "mdi,fa6-regular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mdi": { "name": "Material Design Icons", "total": 7447, "category": "General" },
            "fa6-regular": { "name": "Font Awesome Regular", "total": 163,
                             "license": { "title": "CC BY 4.0", "spdx": "CC-BY-4.0" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let sets = iconify.collections(&["mdi", "fa6-regular"]).await.unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets["mdi"].total, Some(7447));
    assert_eq!(sets["fa6-regular"].license.as_ref().unwrap().spdx.as_deref(), Some("CC-BY-4.0"));

    // Identical query within the query TTL comes from the cache
    iconify.collections(&["mdi", "fa6-regular"]).await.unwrap();
}

#[tokio::test]
async fn test_collection_with_info_and_chars() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collection"))
        .and(query_param("prefix", "el"))
        .and(query_param("info", "1"))
        .and(query_param("chars", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prefix": "el",
            "total": 2,
            "uncategorized": ["home", "heart"],
            "info": { "name": "Elusive Icons" },
            "chars": { "f15b": "home" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let collection = iconify.collection("el", true, true).await.unwrap();
    assert_eq!(collection.prefix, "el");
    assert_eq!(collection.uncategorized, vec!["home", "heart"]);
    assert_eq!(collection.chars["f15b"], "home");
    assert_eq!(collection.info.unwrap().name, "Elusive Icons");
}

#[tokio::test]
async fn test_last_modified() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/last-modified"))
        .and(query_param("prefixes", "mdi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lastModified": { "mdi": 1700000000 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/last-modified"))
        .and(query_param("prefixes", "broken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "nope" })))
        .mount(&server)
        .await;

    let iconify = client(&env, &server);

    let times = iconify.last_modified(&["mdi"]).await.unwrap();
    assert_eq!(times["mdi"].timestamp(), 1_700_000_000);

    let err = iconify.last_modified(&["broken"]).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponseShape { .. }));
}

#[tokio::test]
async fn test_svg_options() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mdi/account.svg"))
        .and(query_param("height", "48"))
        .and(query_param("rotate", "90deg"))
        .and(query_param("flip", "horizontal"))
        .and(query_param("box", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mdi/home.svg"))
        .and(query_param("rotate", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg id=\"home\"/>"))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);

    let options = SvgOptions::default()
        .height(48)
        .rotate(Rotation::from_value(90))
        .flip(Flip::Horizontal)
        .viewbox_box(true);
    assert_eq!(iconify.svg(&["mdi:account"], &options).await.unwrap(), b"<svg/>");

    let options = SvgOptions::default().rotate(Rotation::Turns(2));
    assert_eq!(
        iconify.svg(&["mdi", "home"], &options).await.unwrap(),
        b"<svg id=\"home\"/>"
    );
}

#[tokio::test]
async fn test_invalid_keys_make_no_requests() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let options = SvgOptions::default();

    assert!(matches!(iconify.svg(&[], &options).await, Err(Error::InvalidIdentifier(_))));
    assert!(matches!(
        iconify.svg(&["mdi-account"], &options).await,
        Err(Error::InvalidIdentifier(_))
    ));
    assert!(matches!(
        iconify.css(&["mdi"], &CssOptions::default()).await,
        Err(Error::InvalidIdentifier(_))
    ));
    assert!(matches!(iconify.icon_data(&[]).await, Err(Error::InvalidIdentifier(_))));
}

#[tokio::test]
async fn test_css_missing_icons_do_not_fail() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mdi.css"))
        .and(query_param("icons", "home,nope"))
        .and(query_param("format", "compact"))
        .and(query_param("square", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "/* Could not find icon: nope */\n.icon--mdi { display: inline-block; }\n.icon--mdi--home { --svg: url(x); }\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let options = CssOptions {
        format: Some(iconfetch::iconify::StylesheetFormat::Compact),
        square: true,
        ..Default::default()
    };

    let css = iconify.css(&["mdi", "home", "nope"], &options).await.unwrap();
    assert!(css.contains(".icon--mdi--home"));
}

#[tokio::test]
async fn test_icon_data_not_found() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mdi.json"))
        .and(query_param("icons", "home,nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prefix": "mdi",
            "icons": { "home": { "body": "<path d=\"M10 20v-6h4v6\"/>" } },
            "width": 24,
            "height": 24,
            "not_found": ["nope"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let data = iconify.icon_data(&["mdi", "home", "nope"]).await.unwrap();
    assert!(data.icons.contains_key("home"));
    assert_eq!(data.not_found, vec!["nope"]);
    assert_eq!(data.width, Some(24.0));
}

#[tokio::test]
async fn test_search_limit_is_clamped() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "home"))
        .and(query_param("limit", "32"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "icons": ["mdi:home"], "total": 1, "limit": 32, "start": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "home"))
        .and(query_param("limit", "999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "icons": [], "total": 0, "limit": 999, "start": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);

    let small = iconify.search("home", &SearchOptions::default().limit(5)).await.unwrap();
    assert_eq!(small.icons, vec!["mdi:home"]);
    assert_eq!(small.limit, 32);

    let large = iconify.search("home", &SearchOptions::default().limit(100_000)).await.unwrap();
    assert_eq!(large.limit, 999);
}

#[tokio::test]
async fn test_search_filters() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "cat palette=false style=stroke"))
        .and(query_param("prefixes", "mdi,tabler"))
        .and(query_param("category", "General"))
        .and(query_param("start", "64"))
        .and(query_param_is_missing("prefix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "icons": ["tabler:cat"], "total": 1, "limit": 64, "start": 64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    let options = SearchOptions::default()
        .prefix("mdi")
        .prefix("tabler")
        .category("General")
        .start(64)
        .palette(false)
        .style(IconStyle::Stroke);

    let results = iconify.search("cat", &options).await.unwrap();
    assert_eq!(results.icons, vec!["tabler:cat"]);
    assert_eq!(results.start, 64);
}

#[tokio::test]
async fn test_keywords() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keywords"))
        .and(query_param("prefix", "hom"))
        .and(query_param_is_missing("keyword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prefix": "hom", "exists": false, "matches": ["home", "homepage"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/keywords"))
        .and(query_param("keyword", "arrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "keyword": "arrow", "exists": true, "matches": ["arrow", "arrows", "uparrow"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);

    // Prefix wins when both are given
    let by_prefix = iconify.keywords(Some("hom"), Some("ignored")).await.unwrap();
    assert_eq!(by_prefix.matches, vec!["home", "homepage"]);
    assert!(!by_prefix.exists);

    let by_keyword = iconify.keywords(None, Some("arrow")).await.unwrap();
    assert!(by_keyword.exists);
    assert_eq!(by_keyword.matches.len(), 3);

    let err = iconify.keywords(None, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));
}

#[tokio::test]
async fn test_version() {
    let env = TestEnvironment::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Iconify API version 3.1.1 (Europe)\n"))
        .expect(1)
        .mount(&server)
        .await;

    let iconify = client(&env, &server);
    assert_eq!(iconify.version().await.unwrap(), "Iconify API version 3.1.1 (Europe)");
    // Cached for a day
    assert_eq!(iconify.version().await.unwrap(), "Iconify API version 3.1.1 (Europe)");
}
