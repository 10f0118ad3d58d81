use http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Result of converting a broker header multimap into an HTTP `HeaderMap`
#[derive(Debug, Default)]
pub struct ConvertedHeaders {
    pub headers: HeaderMap,
    /// Header names whose name or value could not be represented
    pub rejected: Vec<String>,
}

/// Convert the broker's header multimap into an HTTP `HeaderMap`
///
/// Every value of every header is appended, so multi-valued headers survive. Entries
/// that are not valid HTTP are skipped and reported in `rejected`.
pub fn map_to_headers(map: &HashMap<String, Vec<String>>) -> ConvertedHeaders {
    let mut converted = ConvertedHeaders::default();

    for (name, values) in map.iter() {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            converted.rejected.push(name.clone());
            continue;
        };

        for value in values {
            match HeaderValue::from_str(value) {
                Ok(header_value) => {
                    converted.headers.append(header_name.clone(), header_value);
                }
                Err(_) => converted.rejected.push(name.clone()),
            }
        }
    }

    converted
}
