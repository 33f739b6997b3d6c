//! Access to the text-bearing parts of a `.docx` archive.
//!
//! Parts are discovered from `[Content_Types].xml`: the main document part
//! plus every header and footer part. Everything else in the archive is
//! copied through untouched when the package is rebuilt.

use super::xml::{XmlDocument, XmlNode};
use super::DocxError;
use log::debug;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const MAIN_SUFFIX: &str = ".main+xml";
const HEADER_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const FOOTER_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Body,
    Header,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    /// Archive entry name, without the leading slash used in content types.
    pub name: String,
    pub kind: PartKind,
}

/// A validated view over the bytes of a template. Never mutates them.
pub struct DocxPackage<'a> {
    bytes: &'a [u8],
    text_parts: Vec<TextPart>,
}

impl<'a> DocxPackage<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let content_types = XmlDocument::parse(&read_part(&mut archive, CONTENT_TYPES_PART)?)?;
        let text_parts = text_parts(&content_types);

        if !text_parts.iter().any(|p| p.kind == PartKind::Body) {
            return Err(DocxError::MissingPart("main document".to_string()));
        }
        for part in &text_parts {
            if archive.index_for_name(&part.name).is_none() {
                return Err(DocxError::MissingPart(part.name.clone()));
            }
        }
        debug!("package opened with {} text parts", text_parts.len());

        Ok(Self { bytes, text_parts })
    }

    /// Parses every text part, main document first.
    pub fn parts(&self) -> Result<Vec<(TextPart, XmlDocument)>, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes))?;
        self.text_parts
            .iter()
            .map(|part| {
                let source = read_part(&mut archive, &part.name)?;
                Ok((part.clone(), XmlDocument::parse(&source)?))
            })
            .collect()
    }

    /// Builds a new archive where each text part has been passed through
    /// `edit`. Other entries are copied raw, in their original order.
    pub fn rewrite<F>(&self, mut edit: F) -> Result<Vec<u8>, DocxError>
    where
        F: FnMut(&TextPart, &mut XmlDocument),
    {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            match self.text_parts.iter().find(|p| p.name == name) {
                Some(part) => {
                    let method = match entry.compression() {
                        CompressionMethod::Stored => CompressionMethod::Stored,
                        _ => CompressionMethod::Deflated,
                    };
                    let mut raw = Vec::new();
                    entry.read_to_end(&mut raw)?;
                    drop(entry);

                    let mut document = XmlDocument::parse(&decode(&name, raw)?)?;
                    edit(part, &mut document);

                    writer.start_file(name, SimpleFileOptions::default().compression_method(method))?;
                    writer.write_all(&document.to_bytes()?)?;
                }
                None => writer.raw_copy_file(entry)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, DocxError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(DocxError::MissingPart(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    decode(name, raw)
}

fn decode(name: &str, raw: Vec<u8>) -> Result<String, DocxError> {
    String::from_utf8(raw).map_err(|_| DocxError::Encoding(name.to_string()))
}

fn text_parts(content_types: &XmlDocument) -> Vec<TextPart> {
    let Some(root) = content_types.root() else {
        return Vec::new();
    };

    let mut parts: Vec<TextPart> = root
        .children
        .iter()
        .filter(|n| n.is_element("Override"))
        .filter_map(XmlNode::as_element)
        .filter_map(|o| {
            let name = o.attribute("PartName")?.trim_start_matches('/').to_string();
            let content_type = o.attribute("ContentType")?;
            let kind = if content_type.ends_with(MAIN_SUFFIX) {
                PartKind::Body
            } else if content_type == HEADER_TYPE {
                PartKind::Header
            } else if content_type == FOOTER_TYPE {
                PartKind::Footer
            } else {
                return None;
            };
            Some(TextPart { name, kind })
        })
        .collect();

    parts.sort_by_key(|p| p.kind != PartKind::Body);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fixtures::{paragraph, DocxBuilder};

    #[test]
    fn discovers_body_header_and_footer_parts() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["body"]))
            .header(&paragraph(&["head"]))
            .footer(&paragraph(&["foot"]))
            .build();
        let package = DocxPackage::open(&bytes).unwrap();
        let kinds: Vec<_> = package.text_parts.iter().map(|p| p.kind).collect();
        assert_eq!(kinds[0], PartKind::Body);
        assert!(kinds.contains(&PartKind::Header));
        assert!(kinds.contains(&PartKind::Footer));
        assert_eq!(package.text_parts[0].name, "word/document.xml");
    }

    #[test]
    fn rejects_archive_without_content_types() {
        let bytes = DocxBuilder::new().body(&paragraph(&["x"])).without_content_types().build();
        assert!(matches!(
            DocxPackage::open(&bytes),
            Err(DocxError::MissingPart(name)) if name == CONTENT_TYPES_PART
        ));
    }

    #[test]
    fn rejects_bytes_that_are_not_an_archive() {
        assert!(matches!(
            DocxPackage::open(b"definitely not a zip"),
            Err(DocxError::Archive(_))
        ));
    }

    #[test]
    fn rewrite_copies_other_entries() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["x"]))
            .extra("word/media/image1.png", b"\x89PNG fake")
            .build();
        let package = DocxPackage::open(&bytes).unwrap();
        let output = package.rewrite(|_, _| {}).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(output)).unwrap();
        let mut image = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut image)
            .unwrap();
        assert_eq!(image, b"\x89PNG fake");
        assert!(archive.by_name("word/document.xml").is_ok());
    }
}
