//! Single-byte legacy text decoding.

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

/// Look up an encoding by WHATWG label (`latin1`, `iso-8859-1`, `utf-8`, ...).
///
/// Note that `latin1` resolves to windows-1252, a superset for every
/// printable byte.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Decode raw bytes, replacing malformed sequences.
pub fn decode(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_decodes_accented_bytes() {
        let encoding = resolve_encoding("latin1").unwrap();
        assert_eq!(decode(encoding, b"S\xe3o Paulo"), "São Paulo");
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(IngestError::UnknownEncoding { .. })
        ));
    }
}
