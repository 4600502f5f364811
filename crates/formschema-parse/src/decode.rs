//! Conversions from lopdf objects to Rust values.

use lopdf::Object;

/// Decode a PDF text string.
///
/// UTF-16BE when prefixed with the `FE FF` byte-order mark, otherwise UTF-8
/// with a Latin-1 fallback.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Convert a numeric object (Integer or Real) to `f64`.
pub fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Name bytes as a string, without the leading `/`.
pub fn name_to_string(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Raw bytes of a stream, decompressed when it declares a `/Filter`.
pub fn stream_content(stream: &lopdf::Stream) -> Result<Vec<u8>, lopdf::Error> {
    if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

/// Render a direct value object as display text.
///
/// Strings and names decode to their text, numbers and booleans to their
/// literal form, and arrays of those join with `", "`. Anything else
/// (dictionaries, streams, null, references) yields `None`.
pub fn object_to_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(_) => name_to_string(obj),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(f) => Some(f.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Array(items) => {
            let values: Vec<String> = items.iter().filter_map(object_to_text).collect();
            (!values.is_empty()).then(|| values.join(", "))
        }
        _ => None,
    }
}
