mod encoding;
mod headers;

pub use encoding::{base64_body, decode_body, encode_body};
pub use headers::{ConvertedHeaders, map_to_headers};
