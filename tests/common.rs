#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dealer_forms_server::cache::{ArtifactStore, InMemoryArtifactStore};
use dealer_forms_server::clock::{Clock, ManualClock};
use dealer_forms_server::documents::DocumentService;
use dealer_forms_server::filler::TemplateFiller;
use dealer_forms_server::mapping::FieldMapper;
use dealer_forms_server::templates::{RepositoryError, TemplateCatalog, TemplateRepository};
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// In-memory template repository. Ids listed as failing return a storage error.
#[derive(Default)]
pub struct MockTemplateRepository {
    templates: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, id: &str, bytes: Vec<u8>) -> Self {
        self.templates.insert(id.to_string(), bytes);
        self
    }

    pub fn with_failure(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TemplateRepository for MockTemplateRepository {
    async fn get_template_bytes(
        &self,
        template_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(template_id) {
            return Err(RepositoryError::Status {
                status: 500,
                body: "storage unavailable".to_string(),
            });
        }
        Ok(self.templates.get(template_id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        let mut ids: Vec<String> = self.templates.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
    ))
}

pub fn filler(repository: MockTemplateRepository, clock: Arc<ManualClock>) -> TemplateFiller {
    TemplateFiller::new(
        Arc::new(repository),
        FieldMapper::default(),
        TemplateCatalog::default(),
        clock,
    )
}

pub fn service(repository: MockTemplateRepository, clock: Arc<ManualClock>) -> DocumentService {
    let clock: Arc<dyn Clock> = clock;
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(InMemoryArtifactStore::new(clock.clone()));
    DocumentService::new(
        Arc::new(repository),
        FieldMapper::default(),
        TemplateCatalog::default(),
        clock,
        artifacts,
    )
}

pub enum FixtureField {
    Text(&'static str),
    Checkbox(&'static str),
    Radio(&'static str, &'static [&'static str]),
    Dropdown(&'static str, &'static [&'static str]),
    Signature(&'static str),
}

fn literal(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
    Object::Array(vec![x0.into(), y0.into(), x1.into(), y1.into()])
}

fn empty_appearance(doc: &mut Document) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect(0, 0, 12, 12),
        },
        Vec::new(),
    ))
}

fn state_appearances(doc: &mut Document, on_states: &[&str]) -> Object {
    let mut normal = lopdf::Dictionary::new();
    for state in on_states {
        let id = empty_appearance(doc);
        normal.set(*state, id);
    }
    let off = empty_appearance(doc);
    normal.set("Off", off);
    Object::Dictionary(dictionary! { "N" => normal })
}

/// A Letter-sized PDF with `pages` pages, each drawing `Page <n>`, and an
/// AcroForm whose widgets sit on the first page.
pub fn form_pdf(pages: usize, fields: &[FixtureField]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for number in 1..=pages.max(1) {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12i64.into()]),
                Operation::new("Td", vec![72i64.into(), 720i64.into()]),
                Operation::new("Tj", vec![literal(&format!("Page {}", number))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect(0, 0, 612, 792),
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        page_ids.push(page_id);
    }
    let first_page = page_ids[0];

    let mut field_refs: Vec<Object> = Vec::new();
    let mut annotations: Vec<Object> = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let y = 700 - 40 * index as i64;
        match field {
            FixtureField::Text(name) => {
                let id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Tx",
                    "T" => literal(name),
                    "Rect" => rect(200, y, 400, y + 20),
                    "DA" => literal("/Helv 10 Tf 0 g"),
                    "P" => first_page,
                });
                field_refs.push(id.into());
                annotations.push(id.into());
            }
            FixtureField::Checkbox(name) => {
                let appearances = state_appearances(&mut doc, &["Yes"]);
                let id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Btn",
                    "T" => literal(name),
                    "Rect" => rect(200, y, 212, y + 12),
                    "AP" => appearances,
                    "AS" => "Off",
                    "V" => "Off",
                    "P" => first_page,
                });
                field_refs.push(id.into());
                annotations.push(id.into());
            }
            FixtureField::Radio(name, options) => {
                let parent_id = doc.new_object_id();
                let mut kids = Vec::new();
                for (offset, option) in options.iter().enumerate() {
                    let x = 200 + 60 * offset as i64;
                    let appearances = state_appearances(&mut doc, &[*option]);
                    let kid = doc.add_object(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Widget",
                        "Parent" => parent_id,
                        "Rect" => rect(x, y, x + 12, y + 12),
                        "AP" => appearances,
                        "AS" => "Off",
                        "P" => first_page,
                    });
                    kids.push(Object::from(kid));
                    annotations.push(kid.into());
                }
                doc.objects.insert(
                    parent_id,
                    Object::Dictionary(dictionary! {
                        "FT" => "Btn",
                        "Ff" => 1i64 << 15,
                        "T" => literal(name),
                        "Kids" => kids,
                    }),
                );
                field_refs.push(parent_id.into());
            }
            FixtureField::Dropdown(name, options) => {
                let id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Ch",
                    "Ff" => 1i64 << 17,
                    "T" => literal(name),
                    "Opt" => options.iter().map(|option| literal(option)).collect::<Vec<_>>(),
                    "Rect" => rect(200, y, 400, y + 20),
                    "DA" => literal("/Helv 10 Tf 0 g"),
                    "P" => first_page,
                });
                field_refs.push(id.into());
                annotations.push(id.into());
            }
            FixtureField::Signature(name) => {
                let id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Sig",
                    "T" => literal(name),
                    "Rect" => rect(200, y, 400, y + 30),
                    "P" => first_page,
                });
                field_refs.push(id.into());
                annotations.push(id.into());
            }
        }
    }

    if let Ok(Object::Dictionary(page)) = doc.get_object_mut(first_page) {
        page.set("Annots", annotations);
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !field_refs.is_empty() {
        let acroform_id = doc.add_object(dictionary! {
            "Fields" => field_refs,
            "DA" => literal("/Helv 0 Tf 0 g"),
            "DR" => dictionary! { "Font" => dictionary! { "Helv" => font_id } },
        });
        catalog.set("AcroForm", acroform_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([180, 40, 40]));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).unwrap()
}

pub fn page_count(bytes: &[u8]) -> usize {
    load(bytes).get_pages().len()
}

/// Text drawn by `Tj` operators on every page, in page order.
pub fn text_lines(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let content = doc.get_page_content(page_id).unwrap();
        for operation in Content::decode(&content).unwrap().operations {
            if operation.operator != "Tj" {
                continue;
            }
            if let Some(Object::String(bytes, _)) = operation.operands.first() {
                lines.push(bytes.iter().map(|&b| b as char).collect());
            }
        }
    }
    lines
}

/// `/V` of the field whose `/T` is `name`, searching the AcroForm tree.
pub fn field_value(doc: &Document, name: &str) -> Option<Object> {
    dealer_forms_server::filler::form::enumerate_fields(doc)
        .into_iter()
        .find(|field| field.name == name)
        .and_then(|field| {
            doc.get_object(field.id)
                .ok()
                .and_then(|object| object.as_dict().ok())
                .and_then(|dict| dict.get(b"V").ok().cloned())
        })
}

pub fn widget_state(doc: &Document, widget: ObjectId) -> Option<String> {
    doc.get_object(widget)
        .ok()
        .and_then(|object| object.as_dict().ok())
        .and_then(|dict| dict.get(b"AS").ok())
        .and_then(|state| state.as_name().ok())
        .map(|state| String::from_utf8_lossy(state).into_owned())
}
