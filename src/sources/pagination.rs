//! Cursor extraction from `Link` response headers.
//!
//! The order API pages with an opaque `page_info` token carried in a header
//! of the form `<https://...?page_info=abc>; rel="next", <...>; rel="previous"`.

use reqwest::header::{HeaderMap, LINK};

/// Query parameter carrying the cursor.
const CURSOR_PARAM: &str = "page_info";

/// Relation we follow.
const NEXT_REL: &str = r#"rel="next""#;

/// Read the raw `Link` header from a response, if present and valid UTF-8.
pub fn link_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(LINK).and_then(|value| value.to_str().ok())
}

/// Return the decoded cursor for the `next` relation of a `Link` header.
///
/// Returns `None` when the header is absent or empty, has no `next`
/// segment, or the `next` URL has no cursor parameter.
pub fn next_page_info(header: Option<&str>) -> Option<String> {
    let header = header?.trim();
    if header.is_empty() {
        return None;
    }

    header.split(',').find_map(|segment| {
        let mut parts = segment.split(';');
        let url = parts.next()?.trim();
        let rel = parts.next()?.trim();

        if rel != NEXT_REL {
            return None;
        }

        let url = url.trim_start_matches('<').trim_end_matches('>');
        cursor_from_url(url)
    })
}

fn cursor_from_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CURSOR_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_next_among_multiple_relations() {
        let header = r#"<url1>; rel="prev", <url2?page_info=ABC>; rel="next""#;
        assert_eq!(next_page_info(Some(header)), Some("ABC".to_string()));
    }

    #[test]
    fn test_no_header() {
        assert_eq!(next_page_info(None), None);
        assert_eq!(next_page_info(Some("")), None);
        assert_eq!(next_page_info(Some("   ")), None);
    }

    #[test]
    fn test_only_previous_relation() {
        let header = r#"<https://shop.example/orders.json?page_info=XYZ>; rel="previous""#;
        assert_eq!(next_page_info(Some(header)), None);
    }

    #[test]
    fn test_encoded_cursor_is_decoded() {
        let header = r#"<https://shop.example/admin/api/2024-01/orders.json?limit=250&page_info=ab%2Bc%3D%3D>; rel="next""#;
        assert_eq!(next_page_info(Some(header)), Some("ab+c==".to_string()));
    }

    #[test]
    fn test_next_without_cursor_param() {
        let header = r#"<https://shop.example/orders.json?limit=250>; rel="next""#;
        assert_eq!(next_page_info(Some(header)), None);
    }

    #[test]
    fn test_malformed_segments() {
        assert_eq!(next_page_info(Some("garbage")), None);
        assert_eq!(next_page_info(Some(r#"<url?page_info=A>; rel=next"#)), None);
    }

    #[test]
    fn test_link_header_from_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(link_header(&headers), None);

        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://x/y?page_info=Q>; rel="next""#),
        );
        assert_eq!(next_page_info(link_header(&headers)), Some("Q".to_string()));
    }
}
