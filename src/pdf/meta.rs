use std::collections::BTreeMap;

use lopdf::{Document, Object};

use super::{PdfError, PdfSource};

/// Key/value pairs from the document information dictionary. An empty map
/// is the explicit "no metadata" signal.
pub type PdfMetadata = BTreeMap<String, String>;

pub fn read_metadata(source: &PdfSource) -> Result<PdfMetadata, PdfError> {
    let doc = source.open()?;
    let mut metadata = BTreeMap::new();

    let Ok(info) = doc.trailer.get(b"Info") else {
        return Ok(metadata);
    };
    let info = resolve(&doc, info)?;
    let dict = info
        .as_dict()
        .map_err(|err| PdfError::Parse(format!("malformed Info dictionary: {err}")))?;

    for (key, value) in dict.iter() {
        let key = String::from_utf8_lossy(key).to_string();
        match resolve(&doc, value)? {
            Object::String(bytes, _) => {
                metadata.insert(key, decode_text_string(bytes));
            }
            Object::Name(name) => {
                metadata.insert(key, String::from_utf8_lossy(name).to_string());
            }
            other => {
                log::debug!("skipping non-text metadata entry {key}: {other:?}");
            }
        }
    }
    Ok(metadata)
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, PdfError> {
    match object {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|err| PdfError::Parse(format!("dangling reference: {err}"))),
        other => Ok(other),
    }
}

/// PDF text strings are either UTF-16BE with a BOM or single-byte encoded.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    }
}
