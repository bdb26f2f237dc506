//! Reading parameters out of HTTP requests.

use http::Request;
use paramguard::Params;
use serde_json::Value;

/// Parameters of an HTTP request: body parameters first, then the query
/// string.
///
/// Query values are always strings; schemas for query-only fields should
/// declare `"type": "String"` and use `test` for numeric formats.
#[derive(Debug)]
pub struct RequestParams<'a, B> {
    request: &'a Request<B>,
    query: Vec<(String, String)>,
}

impl<'a, B> RequestParams<'a, B> {
    /// Wrap a request, decoding its query string once.
    pub fn new(request: &'a Request<B>) -> Self {
        let query = request
            .uri()
            .query()
            .and_then(|q| match serde_urlencoded::from_str::<Vec<(String, String)>>(q) {
                Ok(pairs) => Some(pairs),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring undecodable query string");
                    None
                }
            })
            .unwrap_or_default();

        Self { request, query }
    }

    /// The wrapped request.
    pub fn request(&self) -> &Request<B> {
        self.request
    }

    /// The first query-string value for `key`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

impl<B: Params> Params for RequestParams<'_, B> {
    fn param(&self, key: &str) -> Option<Value> {
        self.request
            .body()
            .param(key)
            .filter(|value| !value.is_null())
            .or_else(|| self.query(key).map(|value| Value::String(value.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_wins_over_query() {
        let request = Request::builder()
            .uri("/users?name=query&page=2")
            .body(json!({"name": "body"}))
            .unwrap();
        let params = RequestParams::new(&request);

        assert_eq!(params.param("name"), Some(json!("body")));
        assert_eq!(params.param("page"), Some(json!("2")));
        assert_eq!(params.param("missing"), None);
    }

    #[test]
    fn query_is_percent_decoded() {
        let request = Request::builder()
            .uri("/search?q=caf%C3%A9+au+lait")
            .body(())
            .unwrap();
        let params = RequestParams::new(&request);

        assert_eq!(params.query("q"), Some("café au lait"));
    }

    #[test]
    fn no_query_string() {
        let request = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(RequestParams::new(&request).param("q"), None);
    }
}
