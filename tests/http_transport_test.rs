use httpmock::prelude::*;
use site_forms::config::settings::HttpSection;
use site_forms::core::FormRequest;
use site_forms::{ReqwestTransport, Transport};
use url::Url;

fn form_request(url: &str, body: &str) -> FormRequest {
    FormRequest {
        url: Url::parse(url).unwrap(),
        body: body.to_string(),
        headers: vec![
            (
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
            ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
        ],
    }
}

#[tokio::test]
async fn test_posts_urlencoded_body_with_background_header() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-requested-with", "XMLHttpRequest")
            .body("email=ada%40example.com&message=hi");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"success": true}));
    });

    let transport = ReqwestTransport::new().unwrap();
    let reply = transport
        .post_form(form_request(
            &server.url("/contact"),
            "email=ada%40example.com&message=hi",
        ))
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(reply.status, 200);
    assert!(!reply.redirected);
    assert!(reply.is_json());
    assert_eq!(reply.json().unwrap(), serde_json::json!({"success": true}));
}

#[tokio::test]
async fn test_redirect_to_same_url_is_reported() {
    let server = MockServer::start();
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(302).header("Location", "/");
    });
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>home</html>");
    });

    let transport = ReqwestTransport::new().unwrap();
    let reply = transport
        .post_form(form_request(&server.url("/"), "email=a%40b.co"))
        .await
        .unwrap();

    post_mock.assert();
    get_mock.assert();
    assert!(reply.redirected);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.url.as_str(), server.url("/"));
    assert_eq!(reply.body, b"<html>home</html>");
}

#[tokio::test]
async fn test_http_error_status_is_not_a_transport_error() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/failed");
        then.status(500).body("boom");
    });

    let transport = ReqwestTransport::new().unwrap();
    let reply = transport
        .post_form(form_request(&server.url("/failed"), ""))
        .await;

    api_mock.assert();
    let reply = tokio_test::assert_ok!(reply);
    assert_eq!(reply.status, 500);
    assert!(!reply.is_success());
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = ReqwestTransport::from_settings(&HttpSection {
        timeout_seconds: Some(5),
        ..HttpSection::default()
    })
    .unwrap();
    let result = transport
        .post_form(form_request(&format!("http://127.0.0.1:{}/contact", port), ""))
        .await;

    let error = result.unwrap_err();
    assert!(error.is_transport());
}

#[tokio::test]
async fn test_redirect_loop_gives_up() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/loop");
        then.status(307).header("Location", "/loop");
    });

    let transport = ReqwestTransport::new().unwrap();
    let result = transport
        .post_form(form_request(&server.url("/loop"), "a=1"))
        .await;

    assert!(result.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_multiple_choices_is_returned_as_is() {
    let server = MockServer::start();
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/contact");
        then.status(300).header("Location", "/elsewhere");
    });
    let elsewhere_mock = server.mock(|when, then| {
        when.path("/elsewhere");
        then.status(200);
    });

    let transport = ReqwestTransport::new().unwrap();
    let reply = transport
        .post_form(form_request(&server.url("/contact"), "email=a%40b.co"))
        .await
        .unwrap();

    post_mock.assert();
    elsewhere_mock.assert_hits(0);
    assert_eq!(reply.status, 300);
    assert!(!reply.redirected);
    assert_eq!(reply.url.as_str(), server.url("/contact"));
}
