//! Header names and MIME types callers commonly pass to the builder.

/// `Content-Type` header name
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Content-Disposition` header name
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
/// `User-Agent` header name
pub const USER_AGENT: &str = "User-Agent";

/// JSON
pub const MIME_JSON: &str = "application/json";
/// HTML
pub const MIME_HTML: &str = "text/html";
/// HTML with an explicit UTF-8 charset
pub const MIME_HTML_UTF8: &str = "text/html; charset=UTF-8";
/// XML, not meant to be read by people
pub const MIME_XML: &str = "application/xml";
/// XML, readable by people
pub const MIME_XML_TEXT: &str = "text/xml";
/// Plain text
pub const MIME_PLAIN: &str = "text/plain";
/// Simple URL-encoded form
pub const MIME_FORM_URLENCODED: &str = "x-www-form-urlencoded";
