//! Small helpers over `lopdf` shared by the filler and the assembler.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

/// US Letter, in points.
pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;
pub const PAGE_MARGIN: i64 = 50;

pub const PDF_VERSION: &str = "1.5";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Resource name under which [`helvetica`] is registered.
pub const FONT_NAME: &str = "F1";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("failed to encode PDF content: {0}")]
    Encode(String),
    #[error("failed to write PDF: {0}")]
    Write(String),
    #[error("malformed PDF: {0}")]
    Structure(String),
}

pub fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))
}

pub fn save(document: &mut Document) -> Result<Vec<u8>, PdfError> {
    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(buffer)
}

pub fn encode_content(operations: Vec<Operation>) -> Result<Vec<u8>, PdfError> {
    Content { operations }
        .encode()
        .map_err(|e| PdfError::Encode(e.to_string()))
}

/// Standard Helvetica with WinAnsi encoding; needs no embedding.
pub fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

pub fn int(value: i64) -> Object {
    Object::Integer(value)
}

pub fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
    Object::Array(vec![int(x0), int(y0), int(x1), int(y1)])
}

pub fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Integer or real as `f64`.
pub fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Follow a reference to its target; direct objects are returned as is.
pub fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.objects.get(id),
        other => Some(other),
    }
}

pub fn resolve_dict<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

pub fn dict_by_id(document: &Document, id: ObjectId) -> Option<&Dictionary> {
    match document.objects.get(&id)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

pub fn dict_by_id_mut(document: &mut Document, id: ObjectId) -> Option<&mut Dictionary> {
    match document.objects.get_mut(&id)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// PDF text string: plain literal for ASCII, UTF-16BE with BOM otherwise.
pub fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Inverse of [`text_string`]; non-UTF-16 strings are read as Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Bytes for a `Tj` operand under WinAnsiEncoding. Unmappable characters
/// become `?`.
pub fn win_ansi(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Helvetica advance widths for `' '..='~'`, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const FALLBACK_WIDTH: u16 = 1000;
const ELLIPSIS: &str = "...";

fn char_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in points when drawn in Helvetica at `size`.
pub fn text_width(text: &str, size: i64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    f64::from(units) * size as f64 / 1000.0
}

/// `text` cut down to fit `max_width` points, ending in `...` when cut.
pub fn fit_text(text: &str, size: i64, max_width: f64) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - text_width(ELLIPSIS, size);
    let mut fitted = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let advance = f64::from(char_width(c)) * size as f64 / 1000.0;
        if width + advance > budget {
            break;
        }
        width += advance;
        fitted.push(c);
    }
    let mut fitted = fitted.trim_end().to_string();
    fitted.push_str(ELLIPSIS);
    fitted
}

/// Operations drawing one line of Helvetica text with its baseline at `(x, y)`.
pub fn text_line(x: i64, y: i64, size: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(FONT_NAME), int(size)]),
        Operation::new("Td", vec![int(x), int(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Builds a one-page Letter document with Helvetica registered as
/// [`FONT_NAME`] and any number of image XObjects.
pub struct SinglePageBuilder {
    document: Document,
    font_id: ObjectId,
    xobjects: Dictionary,
}

impl SinglePageBuilder {
    pub fn new() -> Self {
        let mut document = Document::with_version(PDF_VERSION);
        let font_id = document.add_object(helvetica());
        Self {
            document,
            font_id,
            xobjects: Dictionary::new(),
        }
    }

    /// Register an image XObject under `resource_name`.
    pub fn add_image(&mut self, resource_name: &str, image: Stream) {
        let image_id = self.document.add_object(image);
        self.xobjects.set(resource_name, image_id);
    }

    pub fn build(mut self, operations: Vec<Operation>) -> Result<Document, PdfError> {
        let content = encode_content(operations)?;
        let mut resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => self.font_id },
        };
        if !self.xobjects.is_empty() {
            resources.set("XObject", self.xobjects);
        }

        let document = &mut self.document;
        let pages_id = document.new_object_id();
        let content_id = document.add_object(Stream::new(dictionary! {}, content));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT),
            "Contents" => content_id,
            "Resources" => resources,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => int(1),
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        Ok(self.document)
    }
}

impl Default for SinglePageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
