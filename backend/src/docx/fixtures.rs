//! In-memory `.docx` packages for tests.

use quick_xml::escape::escape;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

pub fn styled_run(properties: &str, text: &str) -> String {
    format!(
        r#"<w:r><w:rPr>{}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        properties,
        escape(text)
    )
}

pub fn bold_run(text: &str) -> String {
    styled_run("<w:b/>", text)
}

/// Paragraph with one plain run per fragment.
pub fn paragraph(fragments: &[&str]) -> String {
    let runs: Vec<String> = fragments.iter().map(|f| run(f)).collect();
    raw_paragraph(&runs.concat())
}

pub fn raw_paragraph(inner: &str) -> String {
    format!("<w:p>{}</w:p>", inner)
}

/// Single-column table, one cell per row holding the given paragraph markup.
pub fn table(cells: &[String]) -> String {
    let rows: Vec<String> = cells
        .iter()
        .map(|c| format!("<w:tr><w:tc>{}</w:tc></w:tr>", c))
        .collect();
    format!("<w:tbl>{}</w:tbl>", rows.concat())
}

pub struct DocxBuilder {
    body: String,
    headers: Vec<String>,
    footers: Vec<String>,
    extras: Vec<(String, Vec<u8>)>,
    content_types: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            headers: Vec::new(),
            footers: Vec::new(),
            extras: Vec::new(),
            content_types: true,
        }
    }

    pub fn body(mut self, markup: &str) -> Self {
        self.body.push_str(markup);
        self
    }

    pub fn header(mut self, markup: &str) -> Self {
        self.headers.push(markup.to_string());
        self
    }

    pub fn footer(mut self, markup: &str) -> Self {
        self.footers.push(markup.to_string());
        self
    }

    pub fn extra(mut self, name: &str, bytes: &[u8]) -> Self {
        self.extras.push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn without_content_types(mut self) -> Self {
        self.content_types = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut overrides = vec![override_entry(
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        )];
        let mut parts = vec![(
            "word/document.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                W_NS, self.body
            ),
        )];

        for (kind, root, markups) in [("header", "hdr", &self.headers), ("footer", "ftr", &self.footers)] {
            for (i, markup) in markups.iter().enumerate() {
                let name = format!("word/{}{}.xml", kind, i + 1);
                overrides.push(override_entry(
                    &format!("/{}", name),
                    &format!(
                        "application/vnd.openxmlformats-officedocument.wordprocessingml.{}+xml",
                        kind
                    ),
                ));
                parts.push((
                    name,
                    format!(r#"<w:{root} xmlns:w="{}">{}</w:{root}>"#, W_NS, markup, root = root),
                ));
            }
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        if self.content_types {
            writer.start_file("[Content_Types].xml", options).unwrap();
            write!(
                writer,
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
                overrides.concat()
            )
            .unwrap();
        }
        for (name, xml) in parts {
            writer.start_file(name, options).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        for (name, bytes) in self.extras {
            writer.start_file(name, options).unwrap();
            writer.write_all(&bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

fn override_entry(part_name: &str, content_type: &str) -> String {
    format!(
        r#"<Override PartName="{}" ContentType="{}"/>"#,
        part_name, content_type
    )
}

/// Raw XML of one archive entry.
pub fn read_entry(package: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut xml = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
    xml
}
