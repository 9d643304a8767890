use anyhow::Result;
use httpmock::prelude::*;
use site_forms::core::{Page, Query};
use site_forms::{FormSettings, HeadlessDriver, PageFixture, ReqwestTransport, Step, SubmissionOutcome};
use tempfile::TempDir;

fn fixture(base_url: &str) -> String {
    format!(
        r##"
base_url = "{}"

[[links]]
href = "#contact"

[[sections]]
id = "contact"

[[forms]]
id = "contact-form"
action = "/contact"
submit_label = "Submit Your Information"

[[forms.fields]]
name = "email"
type = "email"
required = true

[[forms.fields]]
name = "message"
type = "textarea"
required = true

[[forms]]
id = "newsletter-form"
action = "/"
submit_label = "Subscribe"

[[forms.fields]]
name = "email"
type = "email"
required = true
"##,
        base_url
    )
}

fn steps(raw: &[&str]) -> Vec<Step> {
    raw.iter().map(|s| s.parse().unwrap()).collect()
}

#[tokio::test]
async fn test_newsletter_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .header("x-requested-with", "XMLHttpRequest")
            .body("email=reader%40example.com");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"subscribed": true}));
    });

    let fixture_path = temp_dir.path().join("page.toml");
    tokio::fs::write(&fixture_path, fixture(&server.url("/"))).await?;
    let settings_path = temp_dir.path().join("forms.toml");
    tokio::fs::write(&settings_path, "[banner]\nvisible_ms = 60000\n").await?;

    let page = PageFixture::from_file(&fixture_path)?.build()?;
    let settings = FormSettings::from_file(&settings_path)?;
    let transport = ReqwestTransport::from_settings(&settings.http)?;
    let mut driver = HeadlessDriver::new(page, transport, settings);

    let outcomes = driver
        .run(&steps(&[
            "fill:newsletter-form.email=reader@example.com",
            "submit:newsletter-form",
        ]))
        .await?;

    api_mock.assert();
    assert_eq!(outcomes, vec![SubmissionOutcome::Succeeded]);

    let page = driver.page();
    let banners = page.query_all(page.document(), Query::Class("alert-success"));
    assert_eq!(banners.len(), 1);

    let snapshot = serde_json::to_value(page.snapshot())?;
    let rendered = snapshot.to_string();
    assert!(rendered.contains("Thank you for subscribing to our newsletter!"));
    Ok(())
}

#[tokio::test]
async fn test_contact_redirect_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/contact");
        then.status(303).header("Location", "/contact/thanks");
    });
    let thanks_mock = server.mock(|when, then| {
        when.method(GET).path("/contact/thanks");
        then.status(200).body("thanks");
    });

    let page = PageFixture::from_toml_str(&fixture(&server.url("/")))?.build()?;
    let transport = ReqwestTransport::new()?;
    let mut driver = HeadlessDriver::new(page, transport, FormSettings::default());

    let outcomes = driver
        .run(&steps(&[
            "fill:contact-form.email=ada@example.com",
            "fill:contact-form.message=Hello",
            "blur:contact-form.email",
            "submit:contact-form",
        ]))
        .await?;

    post_mock.assert();
    thanks_mock.assert();
    assert!(matches!(outcomes[0], SubmissionOutcome::Redirected(_)));
    assert_eq!(driver.page().navigations(), vec![server.url("/contact/thanks")]);
    assert!(driver
        .page()
        .query_all(driver.page().document(), Query::Class("alert"))
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_clicks_and_invalid_submit_send_nothing() -> Result<()> {
    let server = MockServer::start();
    let any_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let page = PageFixture::from_toml_str(&fixture(&server.url("/")))?.build()?;
    let mut driver = HeadlessDriver::new(page, ReqwestTransport::new()?, FormSettings::default());

    let outcomes = driver
        .run(&steps(&["click:#contact", "submit:contact-form"]))
        .await?;

    any_mock.assert_hits(0);
    assert_eq!(outcomes, vec![SubmissionOutcome::Invalid]);
    assert_eq!(driver.page().history(), vec!["#contact".to_string()]);
    assert!(driver.page().navigations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_step_targets_are_errors() -> Result<()> {
    let page = PageFixture::from_toml_str(&fixture("https://example.test/"))?.build()?;
    let mut driver = HeadlessDriver::new(page, ReqwestTransport::new()?, FormSettings::default());

    assert!(driver.apply(&"submit:nope".parse()?).is_err());
    assert!(driver.apply(&"fill:contact-form.phone=1".parse()?).is_err());
    assert!(driver.apply(&"click:#elsewhere".parse()?).is_err());
    Ok(())
}
