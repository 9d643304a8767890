use crate::config::settings::HttpSection;
use crate::domain::model::{FormRequest, HttpReply};
use crate::domain::ports::Transport;
use crate::utils::error::{FormsError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Method, StatusCode};
use std::time::Duration;

/// Same hop limit browsers apply to fetch.
const MAX_REDIRECTS: usize = 20;

/// `Transport` backed by reqwest. Redirects are followed here rather than by reqwest so
/// the reply can report whether any hop happened, even when the final URL equals the
/// request URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::from_settings(&HttpSection::default())
    }

    pub fn from_settings(http: &HttpSection) -> Result<Self> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = http.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

/// Only these statuses are followed; any other 3xx comes back as a plain reply, as with fetch.
fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(&self, request: FormRequest) -> Result<HttpReply> {
        let mut url = request.url.clone();
        let mut method = Method::POST;
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let mut builder = self.client.request(method.clone(), url.clone());
            for (name, value) in &request.headers {
                if method == Method::GET && name.eq_ignore_ascii_case("content-type") {
                    continue;
                }
                builder = builder.header(name, value);
            }
            if method == Method::POST {
                builder = builder.body(request.body.clone());
            }

            let response = builder.send().await?;
            let status = response.status();
            tracing::debug!("{} {} -> {}", method, url, status);

            if is_followed_redirect(status) {
                if let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                {
                    url = url.join(location)?;
                    redirected = true;
                    if matches!(
                        status,
                        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
                    ) {
                        method = Method::GET;
                    }
                    continue;
                }
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let final_url = response.url().clone();
            let body = response.bytes().await?.to_vec();

            return Ok(HttpReply {
                status: status.as_u16(),
                redirected,
                url: final_url,
                content_type,
                body,
            });
        }

        Err(FormsError::TransportFailure {
            message: format!("too many redirects starting at {}", request.url),
        })
    }
}
