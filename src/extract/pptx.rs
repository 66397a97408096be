// PPTX text extraction: slides in order, one line per text-bearing shape

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Display;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::ExtractError;

const SLIDE_PREFIX: &str = "ppt/slides/slide";
const SLIDE_SUFFIX: &str = ".xml";

fn pptx_err<E: Display>(err: E) -> ExtractError {
    ExtractError::Pptx(err.to_string())
}

pub(super) fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(pptx_err)?;

    // slide10.xml sorts after slide9.xml
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(SLIDE_PREFIX)?
                .strip_suffix(SLIDE_SUFFIX)?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, name) in slides {
        let mut xml = String::new();
        archive
            .by_name(&name)
            .map_err(pptx_err)?
            .read_to_string(&mut xml)?;

        for shape in shape_texts(&xml)? {
            text.push_str(&shape);
            text.push('\n');
        }
    }

    Ok(text)
}

/// Text of every `<p:sp>` shape that has a text body, paragraphs joined by newlines
fn shape_texts(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut shapes = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_shape = false;
    let mut has_text_body = false;
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(pptx_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => {
                    in_shape = true;
                    has_text_body = false;
                    paragraphs.clear();
                }
                b"p:txBody" if in_shape => has_text_body = true,
                b"a:p" if in_shape => current.clear(),
                b"a:t" if in_shape => in_run_text = true,
                _ => {}
            },
            Event::Empty(e) if in_shape => match e.name().as_ref() {
                b"a:p" => paragraphs.push(String::new()),
                b"a:br" => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                current.push_str(&t.decode().map_err(pptx_err)?);
            }
            Event::GeneralRef(r) if in_run_text => {
                if let Some(ch) = r.resolve_char_ref().map_err(pptx_err)? {
                    current.push(ch);
                } else {
                    let name = r.decode().map_err(pptx_err)?;
                    if let Some(resolved) = quick_xml::escape::resolve_xml_entity(&name) {
                        current.push_str(resolved);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_run_text = false,
                b"a:p" if in_shape => paragraphs.push(std::mem::take(&mut current)),
                b"p:sp" => {
                    if in_shape && has_text_body {
                        shapes.push(paragraphs.join("\n"));
                    }
                    in_shape = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
