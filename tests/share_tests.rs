mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use calsocial_share::models::{EntityKind, PreviewResult};
use calsocial_share::redirect::ShareLinks;
use calsocial_share::render::render_share_page;

use common::{Canned, StubUpstream};

fn source_header(headers: &axum::http::HeaderMap) -> &str {
    headers
        .get("x-preview-source")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn circle_preview_fills_title_and_member_count() {
    let upstream = StubUpstream::start(vec![(
        "/circles/uid/abc123/preview",
        Canned::json(json!({ "name": "Book Club", "memberCount": 5 })),
    )])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/circle/abc123").await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(source_header(&headers), "api");

    assert!(body.contains("<title>Book Club</title>"));
    assert!(body.contains(r#"<div class="preview-count" id="memberCount">5 members</div>"#));
    assert!(body.contains(
        r#"<meta property="og:description" content="Join this circle on calsocial!" />"#
    ));
    assert!(body.contains(r#"data-populated="true""#));
    assert_eq!(upstream.hits(), vec!["/circles/uid/abc123/preview"]);
}

#[tokio::test]
async fn event_preview_renders_every_api_field() {
    let upstream = StubUpstream::start(vec![(
        "/events/e42/preview",
        Canned::json(json!({
            "title": "Rooftop Party",
            "description": "Bring snacks",
            "imageUrl": "https://img.example.com/roof.jpg",
            "emoji": "🎉",
            "startDate": "2025-03-15T19:00:00Z",
            "location": "Central Park",
            "city": "New York",
            "attendeeCount": 3,
            "openInvite": false
        })),
    )])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, _, body) = common::get(app, "/event/e42").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body.contains(r#"<meta property="og:title" content="Rooftop Party" />"#));
    assert!(body.contains(r#"<meta name="twitter:title" content="Rooftop Party" />"#));
    assert!(body.contains(r#"<meta property="og:description" content="Bring snacks" />"#));
    assert!(body.contains(
        r#"<meta property="og:image" content="https://img.example.com/roof.jpg" />"#
    ));
    assert!(body.contains(
        r#"<meta name="twitter:image" content="https://img.example.com/roof.jpg" />"#
    ));
    assert!(body.contains(r#"<meta property="og:url" content="https://cal.social/event/e42" />"#));
    assert!(body.contains(r#"<div class="preview-emoji">🎉</div>"#));
    assert!(body.contains(r#"<span id="eventDate">Saturday, March 15, 2025 at 7:00 PM</span>"#));
    assert!(body.contains(r#"<span id="eventLocation">Central Park</span>"#));
    assert!(body.contains(r#"id="attendeeCount">3 people are invited</div>"#));
}

#[tokio::test]
async fn upstream_values_are_escaped_in_tags_and_body() {
    let upstream = StubUpstream::start(vec![(
        "/events/x/preview",
        Canned::json(json!({
            "title": "\"><script>alert(1)</script>",
            "description": "Tom & Jerry's <b>party</b>"
        })),
    )])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, _, body) = common::get(app, "/event/x").await;
    assert_eq!(status, StatusCode::OK);

    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(!body.contains("<b>party</b>"));
    assert!(body.contains(
        r#"<meta property="og:title" content="&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;" />"#
    ));
    assert!(!body.contains("Jerry's"));
    let description = html_escape::encode_quoted_attribute("Tom & Jerry's <b>party</b>");
    assert!(description.starts_with("Tom &amp; Jerry&"));
    assert!(body.contains(&format!(
        r#"<meta name="twitter:description" content="{description}" />"#
    )));
    assert!(body.contains(&format!(
        r#"<p class="preview-description">{description}</p>"#
    )));
    // The page's own script element is the only one.
    assert_eq!(body.matches("<script>").count(), 1);
}

#[tokio::test]
async fn failed_preview_falls_back_to_plain_text_title() {
    let upstream = StubUpstream::start(vec![
        (
            "/circles/uid/c1/preview",
            Canned::status(StatusCode::INTERNAL_SERVER_ERROR),
        ),
        ("/circles/uid/c1/name", Canned::text("  Hiking Crew \n")),
    ])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/circle/c1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "fallback");

    assert!(body.contains("<title>Hiking Crew</title>"));
    assert!(body.contains(
        r#"<meta name="twitter:description" content="Join this circle on calsocial!" />"#
    ));
    assert!(body.contains(
        r#"<meta property="og:image" content="https://cal.social/assets/smallLogo.png" />"#
    ));
    assert!(!body.contains(r#"id="memberCount""#));
    assert_eq!(
        upstream.hits(),
        vec!["/circles/uid/c1/preview", "/circles/uid/c1/name"]
    );
}

#[tokio::test]
async fn malformed_json_falls_back_to_event_title_endpoint() {
    let upstream = StubUpstream::start(vec![
        (
            "/events/e7/preview",
            Canned {
                status: StatusCode::OK,
                content_type: "application/json",
                body: "{not json".to_string(),
            },
        ),
        ("/events/e7/title", Canned::text("Board Games Night")),
    ])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/event/e7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "fallback");
    assert!(body.contains("<title>Board Games Night</title>"));
    assert!(body.contains(
        r#"<meta property="og:description" content="Join this event on calsocial!" />"#
    ));
}

#[tokio::test]
async fn both_endpoints_failing_serves_the_default_page() {
    let upstream = StubUpstream::start(vec![]).await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/event/missing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "default");

    let config = common::test_config(&upstream.base_url);
    let expected = render_share_page(
        &PreviewResult::defaults(EntityKind::Event, &config.default_image_url),
        &ShareLinks::new(&config, EntityKind::Event, "missing"),
        &config,
    );
    assert_eq!(body, expected);
    assert!(body.contains(r#"data-populated="false" hidden"#));
    assert!(body.contains("Open this event in the calsocial app."));
}

#[tokio::test]
async fn unreachable_upstream_still_answers_200_with_defaults() {
    let app = common::create_test_app(common::UNREACHABLE_API);

    let (status, headers, body) = common::get(app, "/circle/abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "default");
    assert!(body.contains("<title>calsocial circle</title>"));
}

#[tokio::test]
async fn blank_fallback_title_keeps_defaults() {
    let upstream =
        StubUpstream::start(vec![("/circles/uid/c2/name", Canned::text("   "))]).await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/circle/c2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "default");
    assert!(body.contains("<title>calsocial circle</title>"));
}

#[tokio::test]
async fn share_page_headers() {
    let app = common::create_test_app(common::UNREACHABLE_API);

    let (status, headers, _) = common::get(app, "/event/e1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=120"
    );
}

#[tokio::test]
async fn page_embeds_links_for_the_client_script() {
    let app = common::create_test_app(common::UNREACHABLE_API);

    let (_, _, body) = common::get(app, "/circle/abc123").await;
    assert!(body.contains(r#"id="shareConfig""#));
    assert!(body.contains("&quot;deepLink&quot;:&quot;calsocial://circle/abc123&quot;"));
    assert!(body.contains(
        "&quot;universalLink&quot;:&quot;https://cal.social/circle/abc123&quot;"
    ));
    assert!(body.contains(r#"<link rel="canonical" href="https://cal.social/circle/abc123" />"#));
    assert!(body.contains(r#"id="openAppButton">Open in calsocial</button>"#));
    assert!(body.contains("var OPEN_TIMEOUT_MS = 2000;"));
}

#[tokio::test]
async fn percent_encoded_ids_are_passed_upstream_encoded() {
    let upstream = StubUpstream::start(vec![(
        "/events/a%20b/preview",
        Canned::json(json!({ "title": "Spaced Out" })),
    )])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, headers, body) = common::get(app, "/event/a%20b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source_header(&headers), "api");
    assert!(body.contains("<title>Spaced Out</title>"));
    assert!(body.contains("calsocial://event/a%20b"));
}

#[tokio::test]
async fn api_values_are_rendered_exactly_as_sent() {
    let upstream = StubUpstream::start(vec![(
        "/circles/uid/ws/preview",
        Canned::json(json!({ "name": "  Book Club ", "description": " Monthly reads" })),
    )])
    .await;
    let app = common::create_test_app(&upstream.base_url);

    let (status, _, body) = common::get(app, "/circle/ws").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>  Book Club </title>"));
    assert!(body.contains(r#"<meta property="og:title" content="  Book Club " />"#));
    assert!(body.contains(r#"<meta name="twitter:description" content=" Monthly reads" />"#));
}
