use std::io::{Cursor, Read};

use tracing::debug;

use super::TextExtractor;
use crate::errors::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the inflated size of `word/document.xml`.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Extracts the raw text of a `.docx` (WordprocessingML) document.
///
/// Every paragraph is followed by a blank line; tabs and line breaks inside
/// a paragraph are preserved.
pub struct DocxExtractor {
    max_document_bytes: u64,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        DocxExtractor::with_limit(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        DocxExtractor::default()
    }

    /// Refuses documents whose body inflates past `max_document_bytes`.
    pub fn with_limit(max_document_bytes: u64) -> Self {
        DocxExtractor { max_document_bytes }
    }
}

impl TextExtractor for DocxExtractor {
    fn get_name(&self) -> &str {
        "docx"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::InvalidArchive(e.to_string()))?;

        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| ExtractionError::MissingPart(DOCUMENT_PART.to_string()))?;
        if part.size() > self.max_document_bytes {
            return Err(ExtractionError::TooLarge(self.max_document_bytes));
        }

        // the declared size can lie, so the read is bounded as well
        let mut xml = String::new();
        part.take(self.max_document_bytes.saturating_add(1))
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::InvalidContent(e.to_string()))?;
        if xml.len() as u64 > self.max_document_bytes {
            return Err(ExtractionError::TooLarge(self.max_document_bytes));
        }

        let text = text_from_document_xml(&xml)?;
        debug!(
            xml_bytes = xml.len(),
            text_chars = text.chars().count(),
            "Extracted docx text"
        );
        Ok(text)
    }
}

/// Walks the tags of `document.xml`, keeping the character data of `<w:t>` runs.
fn text_from_document_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut text = String::new();
    let mut in_text_run = false;
    // <w:tab> inside <w:tabs> declares a tab stop, not a tab character
    let mut in_tab_stops = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text_run {
            text.push_str(&decode_entities(&rest[..open])?);
        }
        let close = rest[open..].find('>').ok_or_else(|| {
            ExtractionError::InvalidContent("unterminated tag in document body".to_string())
        })? + open;
        let tag = &rest[open + 1..close];
        rest = &rest[close + 1..];

        // Comments, processing instructions and declarations carry no text.
        if tag.starts_with('!') || tag.starts_with('?') {
            continue;
        }

        let self_closing = tag.ends_with('/');
        let (closing, name) = match tag.strip_prefix('/') {
            Some(name) => (true, name),
            None => (false, tag.trim_end_matches('/')),
        };
        let name = name
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default();

        match (name, closing) {
            ("w:t", false) => in_text_run = !self_closing,
            ("w:t", true) => in_text_run = false,
            ("w:tabs", false) => in_tab_stops = !self_closing,
            ("w:tabs", true) => in_tab_stops = false,
            ("w:tab", false) if !in_tab_stops => text.push('\t'),
            ("w:br", false) | ("w:cr", false) => text.push('\n'),
            ("w:p", true) => text.push_str("\n\n"),
            ("w:p", false) if self_closing => text.push_str("\n\n"),
            _ => {}
        }
    }

    Ok(text)
}

/// Decodes the predefined XML entities and numeric character references.
fn decode_entities(raw: &str) -> Result<String, ExtractionError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let semi = rest[amp..].find(';').ok_or_else(|| {
            ExtractionError::InvalidContent("unterminated entity in document body".to_string())
        })? + amp;
        let entity = &rest[amp + 1..semi];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => {
                return Err(ExtractionError::InvalidContent(format!(
                    "unknown entity '&{};'",
                    entity
                )))
            }
        }
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    /// Builds a minimal `.docx` archive around the given `<w:body>` content.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", FileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCUMENT_PART, FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p><w:p><w:r><w:t>Second</w:t></w:r></w:p>"#,
        );
        let text = DocxExtractor::new().extract(&docx).unwrap();
        assert_eq!(text, "Hello world\n\nSecond\n\n");
    }

    #[test]
    fn tabs_breaks_and_entities() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b &amp; c</w:t><w:br/><w:t>&lt;d&gt; &#233;&#x41;</w:t></w:r></w:p>"#,
        );
        let text = DocxExtractor::new().extract(&docx).unwrap();
        assert_eq!(text, "a\tb & c\n<d> \u{e9}A\n\n");
    }

    #[test]
    fn deleted_text_and_properties_are_ignored() {
        let docx = docx_with_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:delText>gone</w:delText></w:r><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        let text = DocxExtractor::new().extract(&docx).unwrap();
        assert_eq!(text, "kept\n\n");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        let docx = docx_with_body("");
        assert_eq!(DocxExtractor::new().extract(&docx).unwrap(), "");
    }

    #[test]
    fn rejects_bytes_that_are_not_an_archive() {
        let err = DocxExtractor::new()
            .extract(b"definitely not a zip file")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidArchive(_)));
    }

    #[test]
    fn rejects_archive_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("readme.txt", FileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = DocxExtractor::new().extract(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingPart(_)));
    }

    #[test]
    fn rejects_unknown_entities() {
        let docx = docx_with_body(r#"<w:p><w:r><w:t>&bogus;</w:t></w:r></w:p>"#);
        assert!(DocxExtractor::new().extract(&docx).is_err());
    }

    #[test]
    fn rejects_document_that_inflates_past_the_limit() {
        let body = "<w:p><w:r><w:t>aaaaaaaaaaaaaaaa</w:t></w:r></w:p>".repeat(4096);
        let docx = docx_with_body(&body);
        assert!(docx.len() < 16 * 1024);

        let err = DocxExtractor::with_limit(16 * 1024)
            .extract(&docx)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::TooLarge(16384)));

        let text = DocxExtractor::new().extract(&docx).unwrap();
        assert_eq!(text.len(), 18 * 4096);
    }
}
