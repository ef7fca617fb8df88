//! Browser `fetch` transport for the API client

use api_client::{ApiRequest, ApiResponse, ClientError, Transport};
use async_trait::async_trait;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    pub fn new() -> Self {
        Self
    }

    async fn fetch(&self, request: &ApiRequest) -> Result<(u16, String), JsValue> {
        let window = web_sys::window().ok_or("No window")?;

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &request.body {
            let body_str =
                serde_json::to_string(body).map_err(|e| JsValue::from_str(&e.to_string()))?;
            opts.set_body(&JsValue::from_str(&body_str));
        }

        let js_request = Request::new_with_str_and_init(&request.path, &opts)?;
        js_request.headers().set("Accept", "application/json")?;
        if request.body.is_some() {
            js_request
                .headers()
                .set("Content-Type", "application/json")?;
        }

        let response = JsFuture::from(window.fetch_with_request(&js_request)).await?;
        let response: Response = response.dyn_into()?;
        let text = JsFuture::from(response.text()?).await?;

        Ok((response.status(), text.as_string().unwrap_or_default()))
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> api_client::Result<ApiResponse> {
        let (status, text) = self.fetch(&request).await.map_err(|e| {
            ClientError::Network(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
        })?;
        let body = parse_body(status, &text)?;
        Ok(ApiResponse { status, body })
    }
}

/// Successful bodies must be JSON. Error bodies are often plain text from a
/// proxy, so those are kept as a string for the error message.
pub(crate) fn parse_body(status: u16, text: &str) -> api_client::Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Ok(Value::String(text.trim().to_string())),
        Err(e) => Err(ClientError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(parse_body(204, "").unwrap(), Value::Null);
        assert_eq!(parse_body(200, "  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_json_body() {
        assert_eq!(
            parse_body(200, r#"{"items": []}"#).unwrap(),
            json!({"items": []})
        );
    }

    #[test]
    fn test_plain_text_error_body_kept() {
        let body = parse_body(502, "Bad Gateway\n").unwrap();
        assert_eq!(body, Value::String("Bad Gateway".to_string()));
    }

    #[test]
    fn test_plain_text_success_body_is_parse_error() {
        assert!(matches!(
            parse_body(200, "<html>"),
            Err(ClientError::Parse(_))
        ));
    }
}
