//! HTTP session against the portal
//!
//! A blocking `reqwest` client with an in-memory cookie jar. The jar lives as
//! long as the [`SessionClient`] and is never written anywhere.

use crate::portal::form::{Form, Method};
use crate::portal::{Page, PortalConfig};
use crate::types::ExportError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;

/// Cookie-keeping HTTP session
#[derive(Debug)]
pub struct SessionClient {
    http: Client,
}

impl SessionClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ExportError> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http })
    }

    /// GET a page and parse it as HTML
    pub fn fetch_page(&self, url: &Url) -> Result<Page, ExportError> {
        log::debug!("GET {}", url);
        let response = self.send(self.http.get(url.clone()), url)?;
        Self::into_page(response)
    }

    /// Submit a form the way its `method` says and parse the resulting page
    pub fn submit_form(&self, form: &Form) -> Result<Page, ExportError> {
        let pairs = form.pairs();
        let request = match form.method() {
            Method::Get => {
                let mut url = form.action().clone();
                url.set_query(None);
                url.query_pairs_mut().extend_pairs(&pairs);
                log::debug!("GET {} (form)", url);
                self.http.get(url)
            }
            Method::Post => {
                log::debug!("POST {} ({} fields)", form.action(), pairs.len());
                self.http.post(form.action().clone()).form(&pairs)
            }
        };

        let response = self.send(request, form.action())?;
        Self::into_page(response)
    }

    /// GET a non-HTML payload
    pub fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, ExportError> {
        log::debug!("GET {} (download)", url);
        let response = self.send(self.http.get(url.clone()), url)?;
        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ExportError> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::connectivity(
                url.as_str(),
                format!("server answered {}", status),
            ));
        }
        Ok(response)
    }

    fn into_page(response: Response) -> Result<Page, ExportError> {
        let url = response.url().clone();
        let body = response.text()?;
        Ok(Page::parse(url, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client() -> SessionClient {
        let config = PortalConfig::new("http://127.0.0.1:9/dkb/-").unwrap();
        SessionClient::new(&config).unwrap()
    }

    #[test]
    fn test_cookies_are_kept_between_requests() {
        let mut server = mockito::Server::new();
        let login = server
            .mock("GET", "/start")
            .with_header("set-cookie", "session=s1; Path=/")
            .with_body("<html></html>")
            .create();
        let next = server
            .mock("GET", "/next")
            .match_header("cookie", Matcher::Regex("session=s1".to_string()))
            .with_body("<html><body>ok</body></html>")
            .create();

        let session = client();
        let base = Url::parse(&server.url()).unwrap();
        session.fetch_page(&base.join("/start").unwrap()).unwrap();
        session.fetch_page(&base.join("/next").unwrap()).unwrap();

        login.assert();
        next.assert();
    }

    #[test]
    fn test_get_form_sends_fields_in_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/find")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".to_string(), "visa".to_string()),
                Matcher::UrlEncoded("go".to_string(), "Suchen".to_string()),
            ]))
            .with_body("<html></html>")
            .create();

        let page_url = Url::parse(&server.url()).unwrap();
        let page = Page::parse(
            page_url,
            r#"<form action="/find?stale=1"><input name="q"><input type="submit" name="go" value="Suchen"></form>"#,
        );
        let mut form = page.form_with_field("q").unwrap();
        form.set("q", "visa").unwrap();

        client().submit_form(&form).unwrap();
        mock.assert();
    }

    #[test]
    fn test_http_error_status_is_connectivity_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/down").with_status(503).create();

        let url = Url::parse(&server.url()).unwrap().join("/down").unwrap();
        let result = client().fetch_page(&url);
        assert!(matches!(result, Err(ExportError::Connectivity { .. })));
    }

    #[test]
    fn test_unreachable_host_is_connectivity_error() {
        // Port 9 (discard) is closed on test machines
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = client().fetch_bytes(&url);
        assert!(matches!(result, Err(ExportError::Connectivity { .. })));
    }
}
