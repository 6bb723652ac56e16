//! Concatenates the pages of several documents into one.
//!
//! Each source document is renumbered into its own id range, its page tree is
//! flattened (inheritable attributes are pushed down onto the pages) and every
//! object except the catalog and page-tree nodes is moved into the output.
//! Each document's AcroForm fields are grouped under a parent field named
//! `doc<n>` (its 1-based position), so equal field names from different
//! templates stay distinct and filled values stay addressable.

use std::collections::HashSet;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};

use crate::filler::form;
use crate::pdf::{self, dict_by_id, dict_by_id_mut, resolve_dict, PdfError, PAGE_HEIGHT, PAGE_WIDTH};

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 32;
const FIELD_GROUP_PREFIX: &str = "doc";

#[derive(Default)]
struct MergedForm {
    fields: Vec<Object>,
    default_resources: Option<Object>,
    default_appearance: Option<Object>,
}

pub fn merge_documents(documents: Vec<Document>) -> Result<Document, PdfError> {
    let mut merged = Document::with_version(pdf::PDF_VERSION);
    let mut next_id: u32 = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut form = MergedForm::default();

    for (index, mut document) in documents.into_iter().enumerate() {
        document.renumber_objects_with(next_id);
        next_id = document
            .objects
            .keys()
            .map(|(id, _)| *id)
            .max()
            .map_or(next_id, |max| max + 1);

        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        inherit_page_attributes(&mut document, &pages);

        let mut skipped = page_tree_nodes(&document);
        if let Some(catalog_id) = form::catalog_id(&document) {
            skipped.insert(catalog_id);
            if let Some(Object::Reference(acroform_id)) = dict_by_id(&document, catalog_id)
                .and_then(|catalog| catalog.get(b"AcroForm").ok())
            {
                skipped.insert(*acroform_id);
            }
        }
        if let Some(group) = collect_form(&mut document, &mut form, (next_id, 0), index + 1) {
            merged.objects.insert((next_id, 0), group);
            next_id += 1;
        }

        for (id, object) in document.objects {
            if !skipped.contains(&id) {
                merged.objects.insert(id, object);
            }
        }
        page_ids.extend(pages);
    }

    if page_ids.is_empty() {
        return Err(PdfError::Structure("no pages to merge".to_string()));
    }

    let pages_id = (next_id, 0);
    let catalog_id = (next_id + 1, 0);

    for page_id in &page_ids {
        if let Some(page) = dict_by_id_mut(&mut merged, *page_id) {
            page.set("Parent", pages_id);
            if !page.has(b"MediaBox") {
                page.set("MediaBox", pdf::rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT));
            }
        }
    }

    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => pdf::int(page_ids.len() as i64),
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !form.fields.is_empty() {
        catalog.set("AcroForm", form.into_dictionary());
    }
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", catalog_id);
    merged.max_id = catalog_id.0;

    Ok(merged)
}

impl MergedForm {
    fn into_dictionary(self) -> Dictionary {
        let mut acroform = dictionary! {
            "Fields" => self.fields,
            "NeedAppearances" => true,
        };
        if let Some(resources) = self.default_resources {
            acroform.set("DR", resources);
        }
        if let Some(appearance) = self.default_appearance {
            acroform.set("DA", appearance);
        }
        acroform
    }
}

/// Moves the document's top-level fields under a new group field with id
/// `group_id` and returns that group, or `None` when there are no fields.
fn collect_form(
    document: &mut Document,
    form: &mut MergedForm,
    group_id: ObjectId,
    position: usize,
) -> Option<Object> {
    let fields = form::acroform_fields(document);
    if let Some(acroform) = form::acroform(document) {
        if form.default_resources.is_none() {
            form.default_resources = acroform.get(b"DR").ok().cloned();
        }
        if form.default_appearance.is_none() {
            form.default_appearance = acroform.get(b"DA").ok().cloned();
        }
    }
    if fields.is_empty() {
        return None;
    }

    for field in &fields {
        if let Object::Reference(field_id) = field {
            if let Some(dict) = dict_by_id_mut(document, *field_id) {
                dict.set("Parent", group_id);
            }
        }
    }
    form.fields.push(Object::Reference(group_id));

    let name = format!("{}{}", FIELD_GROUP_PREFIX, position);
    Some(Object::Dictionary(dictionary! {
        "T" => Object::String(name.into_bytes(), StringFormat::Literal),
        "Kids" => fields,
    }))
}

fn is_pages_node(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Pages")
}

fn page_tree_nodes(document: &Document) -> HashSet<ObjectId> {
    document
        .objects
        .iter()
        .filter_map(|(id, object)| match object {
            Object::Dictionary(dict) if is_pages_node(dict) => Some(*id),
            _ => None,
        })
        .collect()
}

fn inherit_page_attributes(document: &mut Document, page_ids: &[ObjectId]) {
    for &page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = match dict_by_id(document, page_id) {
            Some(page) => INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited_value(document, page, key).map(|v| (*key, v.clone())))
                .collect(),
            None => continue,
        };

        if let Some(page) = dict_by_id_mut(document, page_id) {
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
    }
}

fn inherited_value<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = parent_of(document, page);
    for _ in 0..MAX_TREE_DEPTH {
        let current = node?;
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        node = parent_of(document, current);
    }
    None
}

fn parent_of<'a>(document: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    resolve_dict(document, dict.get(b"Parent").ok()?)
}
