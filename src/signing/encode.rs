//! RFC 5849 percent-encoding and form helpers.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::_prelude::*;

/// Everything except the RFC 3986 unreserved set (`ALPHA / DIGIT / "-" / "." / "_" / "~"`).
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value` per RFC 5849 section 3.6 (uppercase hex, UTF-8 octets).
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Serializes parameters as an `application/x-www-form-urlencoded` body using the same
/// encoding the signature base string uses, so signed values and sent values agree.
pub fn form_encode<K, V>(params: &[(K, V)]) -> String
where
	K: AsRef<str>,
	V: AsRef<str>,
{
	params
		.iter()
		.map(|(key, value)| {
			format!("{}={}", percent_encode(key.as_ref()), percent_encode(value.as_ref()))
		})
		.collect::<Vec<_>>()
		.join("&")
}

/// Parses an `application/x-www-form-urlencoded` body; later duplicates win.
pub fn form_decode(body: &str) -> BTreeMap<String, String> {
	url::form_urlencoded::parse(body.trim().as_bytes()).into_owned().collect()
}
