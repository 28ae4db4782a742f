/// Percent-decodes a request path.
///
/// `%XY` becomes the byte `0xXY` when both `X` and `Y` are hex digits and
/// `+` becomes a space. A truncated or non-hex escape, or a result that is
/// not UTF-8, yields `None`.
///
/// # Example
///
/// ```
/// # use quill::handler::decode::decode_url;
/// assert_eq!(decode_url("/a%20b+c").as_deref(), Some("/a b c"));
/// assert_eq!(decode_url("/bad%4"), None);
/// ```
pub fn decode_url(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = hex_value(*bytes.get(i + 1)?)?;
                let lo = hex_value(*bytes.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8(out).ok()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
