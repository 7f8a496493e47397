use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{Result, WordCountError};

/// Part of the package holding the main document body
const DOCUMENT_PART: &str = "word/document.xml";

/// Read the plain text of every paragraph of a .docx file, in order
pub fn read_docx_paragraphs(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| WordCountError::document(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| WordCountError::document(path, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| WordCountError::document(path, format!("{}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| WordCountError::document(path, e))?;

    parse_document_xml(&xml).map_err(|e| WordCountError::document(path, e))
}

/// Extract paragraph text from WordprocessingML
///
/// Only paragraphs that are direct children of the body are returned; table
/// cells and text boxes are skipped. Text runs are concatenated, tabs become
/// `\t` and line breaks `\n`.
pub fn parse_document_xml(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    // Paragraphs opened inside the current body paragraph (text boxes)
    let mut nested = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"w:p" if is_body_child(&stack) => current = Some(String::new()),
                    b"w:p" if current.is_some() => nested += 1,
                    b"w:t" => in_text = true,
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => match e.name().as_ref() {
                // A self-closing paragraph is still a (blank) paragraph
                b"w:p" if is_body_child(&stack) => paragraphs.push(String::new()),
                // Tab stops under w:pPr/w:tabs share the name; only run content counts
                b"w:tab" if nested == 0 && is_run_child(&stack) => push_char(&mut current, '\t'),
                b"w:br" | b"w:cr" if nested == 0 && is_run_child(&stack) => {
                    push_char(&mut current, '\n')
                }
                _ => {}
            },
            Event::Text(t) if in_text && nested == 0 => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => {
                stack.pop();
                match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" if nested > 0 => nested -= 1,
                    b"w:p" if is_body_child(&stack) => {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn is_body_child(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|parent| parent.as_slice() == b"w:body")
}

fn is_run_child(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|parent| parent.as_slice() == b"w:r")
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(text) = current.as_mut() {
        text.push(c);
    }
}
