//! Assembly of the document-creation request.

use crate::transport::DocumentRequest;
use crate::types::Signature;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

pub const DOCUMENT_CREATE_PATH: &str = "/api/v3/lk/documents/create";

/// Append [`DOCUMENT_CREATE_PATH`] to `base_url`, keeping any path prefix
/// the base already carries (e.g. a gateway mount point).
pub(crate) fn document_endpoint(base_url: &Url) -> Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(DOCUMENT_CREATE_PATH.trim_start_matches('/')).map_err(|e| {
        Error::configuration_with_context(
            "cannot build document endpoint",
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_details(e.to_string())
                .with_source("request_builder"),
        )
    })
}

/// `POST <endpoint>` with a JSON body and the `Signature` header.
pub(crate) fn build_create_request(
    endpoint: &Url,
    body: String,
    signature: &Signature,
) -> Result<DocumentRequest> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(signature.as_str()).map_err(|_| {
        Error::validation_with_context(
            "signature is not a valid header value",
            ErrorContext::new()
                .with_field_path("signature")
                .with_source("request_builder"),
        )
    })?;
    headers.insert(HeaderName::from_static("signature"), value);

    Ok(DocumentRequest {
        method: Method::POST,
        url: endpoint.clone(),
        headers,
        body,
    })
}
