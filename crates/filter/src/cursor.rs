use feedsieve_client::RequestDescriptor;
use tracing::debug;
use url::Url;

pub const OFFSET_PARAM: &str = "offset";

/// Request for the page that starts at `offset`.
///
/// Same method, headers and body; only the `offset` query parameter changes.
/// The first existing `offset` is replaced in place and any duplicates are
/// dropped, otherwise it is appended. An unparseable URL returns the request
/// unchanged.
pub fn advance(request: &RequestDescriptor, offset: &str) -> RequestDescriptor {
    let mut url = match Url::parse(&request.url) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, url = %request.url, "Cannot parse feed URL, offset left unchanged");
            return request.clone();
        }
    };

    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == OFFSET_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), offset.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((OFFSET_PARAM.to_string(), offset.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);

    let mut next = request.clone();
    next.url = url.into();
    next
}
