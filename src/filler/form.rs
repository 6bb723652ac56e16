//! AcroForm access: enumerate terminal fields and set them by kind.

use lopdf::content::Operation;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use crate::pdf::{
    self, decode_text_string, dict_by_id, dict_by_id_mut, resolve, resolve_dict, PdfError,
};

const FLAG_RADIO: i64 = 1 << 15;
const FLAG_PUSHBUTTON: i64 = 1 << 16;
const FLAG_MULTI_SELECT: i64 = 1 << 21;

const MAX_FIELD_DEPTH: usize = 16;
const OFF_STATE: &str = "Off";
const DEFAULT_ON_STATE: &str = "Yes";

/// Resource name of the font used in regenerated text appearances.
const APPEARANCE_FONT: &str = "Helv";

const TRUTHY_VALUES: [&str; 5] = ["true", "yes", "1", "checked", "x"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox { on_state: String },
    RadioGroup { options: Vec<String> },
    Dropdown { options: Vec<String> },
    Unsupported { reason: String },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: ObjectId,
    /// Fully qualified name, e.g. `page1.FirstName`.
    pub name: String,
    /// The field's own `/T`, e.g. `FirstName`.
    pub partial_name: String,
    pub kind: FieldKind,
    pub widgets: Vec<ObjectId>,
}

#[derive(Debug, Error)]
pub enum FieldFillError {
    #[error("field '{field}' cannot be filled: {reason}")]
    UnsupportedKind { field: String, reason: String },
    #[error("'{value}' is not an option of field '{field}'")]
    InvalidOption { field: String, value: String },
    #[error("field '{field}' is missing from the document")]
    MissingObject { field: String },
    #[error("appearance for field '{field}' could not be built: {source}")]
    Appearance {
        field: String,
        #[source]
        source: PdfError,
    },
}

pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    TRUTHY_VALUES
        .iter()
        .any(|truthy| truthy.eq_ignore_ascii_case(value))
}

pub(crate) fn catalog_id(document: &Document) -> Option<ObjectId> {
    match document.trailer.get(b"Root").ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

pub(crate) fn acroform(document: &Document) -> Option<&Dictionary> {
    let catalog = dict_by_id(document, catalog_id(document)?)?;
    resolve_dict(document, catalog.get(b"AcroForm").ok()?)
}

/// Top-level field references of the document's AcroForm.
pub(crate) fn acroform_fields(document: &Document) -> Vec<Object> {
    acroform(document)
        .and_then(|form| form.get(b"Fields").ok())
        .and_then(|fields| resolve(document, fields))
        .and_then(|fields| match fields {
            Object::Array(items) => Some(items.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Every terminal field in document order.
pub fn enumerate_fields(document: &Document) -> Vec<FormField> {
    let mut fields = Vec::new();
    collect_fields(
        document,
        &acroform_fields(document),
        "",
        Inherited::default(),
        0,
        &mut fields,
    );
    fields
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<Vec<u8>>,
    flags: i64,
}

fn collect_fields(
    document: &Document,
    references: &[Object],
    parent_name: &str,
    inherited: Inherited,
    depth: usize,
    out: &mut Vec<FormField>,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }

    for reference in references {
        let Object::Reference(id) = reference else {
            continue;
        };
        let Some(dict) = dict_by_id(document, *id) else {
            continue;
        };

        let partial_name = match dict.get(b"T") {
            Ok(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => String::new(),
        };
        let name = match (parent_name.is_empty(), partial_name.is_empty()) {
            (_, true) => parent_name.to_string(),
            (true, false) => partial_name.clone(),
            (false, false) => format!("{}.{}", parent_name, partial_name),
        };

        let field_type = match dict.get(b"FT") {
            Ok(Object::Name(value)) => Some(value.clone()),
            _ => inherited.field_type.clone(),
        };
        let flags = dict
            .get(b"Ff")
            .ok()
            .and_then(pdf::number)
            .map(|value| value as i64)
            .unwrap_or(inherited.flags);

        let kids = match dict.get(b"Kids").ok().and_then(|kids| resolve(document, kids)) {
            Some(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let field_kids: Vec<Object> = kids
            .iter()
            .filter(|kid| resolve_dict(document, kid).is_some_and(|kid| kid.has(b"T")))
            .cloned()
            .collect();

        if !field_kids.is_empty() {
            let inherited = Inherited {
                field_type: field_type.clone(),
                flags,
            };
            collect_fields(document, &field_kids, &name, inherited, depth + 1, out);
            continue;
        }

        let widgets: Vec<ObjectId> = if kids.is_empty() {
            vec![*id]
        } else {
            kids.iter()
                .filter_map(|kid| match kid {
                    Object::Reference(kid_id) => Some(*kid_id),
                    _ => None,
                })
                .collect()
        };

        let kind = classify(document, dict, field_type.as_deref(), flags, &widgets);
        out.push(FormField {
            id: *id,
            name,
            partial_name,
            kind,
            widgets,
        });
    }
}

fn classify(
    document: &Document,
    dict: &Dictionary,
    field_type: Option<&[u8]>,
    flags: i64,
    widgets: &[ObjectId],
) -> FieldKind {
    match field_type {
        Some(b"Tx") => FieldKind::Text,
        Some(b"Btn") if flags & FLAG_PUSHBUTTON != 0 => FieldKind::Unsupported {
            reason: "push button".to_string(),
        },
        Some(b"Btn") if flags & FLAG_RADIO != 0 => FieldKind::RadioGroup {
            options: appearance_states(document, widgets),
        },
        Some(b"Btn") => FieldKind::Checkbox {
            on_state: appearance_states(document, widgets)
                .into_iter()
                .next()
                .unwrap_or_else(|| DEFAULT_ON_STATE.to_string()),
        },
        Some(b"Ch") if flags & FLAG_MULTI_SELECT != 0 => FieldKind::Unsupported {
            reason: "multi-select list".to_string(),
        },
        Some(b"Ch") => FieldKind::Dropdown {
            options: choice_options(document, dict),
        },
        Some(b"Sig") => FieldKind::Unsupported {
            reason: "signature".to_string(),
        },
        Some(other) => FieldKind::Unsupported {
            reason: format!("field type {}", String::from_utf8_lossy(other)),
        },
        None => FieldKind::Unsupported {
            reason: "missing field type".to_string(),
        },
    }
}

/// Non-`Off` normal appearance states across `widgets`, first seen first.
fn appearance_states(document: &Document, widgets: &[ObjectId]) -> Vec<String> {
    let mut states = Vec::new();
    for widget in widgets {
        for state in widget_states(document, *widget) {
            if state != OFF_STATE && !states.contains(&state) {
                states.push(state);
            }
        }
    }
    states
}

fn widget_states(document: &Document, widget: ObjectId) -> Vec<String> {
    let normal = dict_by_id(document, widget)
        .and_then(|widget| widget.get(b"AP").ok())
        .and_then(|ap| resolve_dict(document, ap))
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|normal| resolve_dict(document, normal));

    normal
        .map(|normal| {
            normal
                .iter()
                .map(|(state, _)| String::from_utf8_lossy(state).into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Export values of a choice field's `/Opt`.
fn choice_options(document: &Document, dict: &Dictionary) -> Vec<String> {
    let Some(Object::Array(options)) = dict.get(b"Opt").ok().and_then(|opt| resolve(document, opt))
    else {
        return Vec::new();
    };

    options
        .iter()
        .filter_map(|option| match resolve(document, option)? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Array(pair) => match pair.first()? {
                Object::String(bytes, _) => Some(decode_text_string(bytes)),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Write `value` into `field` according to its kind.
pub fn fill_field(
    document: &mut Document,
    field: &FormField,
    value: &str,
    font_id: ObjectId,
) -> Result<(), FieldFillError> {
    match &field.kind {
        FieldKind::Text => fill_text(document, field, value, font_id),
        FieldKind::Checkbox { on_state } => fill_checkbox(document, field, value, on_state),
        FieldKind::RadioGroup { options } => fill_radio(document, field, value, options),
        FieldKind::Dropdown { options } => fill_dropdown(document, field, value, options),
        FieldKind::Unsupported { reason } => Err(FieldFillError::UnsupportedKind {
            field: field.name.clone(),
            reason: reason.clone(),
        }),
    }
}

fn field_dict_mut<'a>(
    document: &'a mut Document,
    field: &FormField,
) -> Result<&'a mut Dictionary, FieldFillError> {
    dict_by_id_mut(document, field.id).ok_or_else(|| FieldFillError::MissingObject {
        field: field.name.clone(),
    })
}

fn fill_text(
    document: &mut Document,
    field: &FormField,
    value: &str,
    font_id: ObjectId,
) -> Result<(), FieldFillError> {
    let font_size = dict_by_id(document, field.id)
        .ok_or_else(|| FieldFillError::MissingObject {
            field: field.name.clone(),
        })
        .map(default_font_size)?;

    // Appearances are built before anything is written, so a failure leaves
    // the field as it was.
    let mut appearances = Vec::new();
    for widget in &field.widgets {
        let Some((width, height)) = dict_by_id(document, *widget).and_then(widget_size) else {
            continue;
        };
        let appearance = text_appearance(value, width, height, font_size, font_id).map_err(
            |source| FieldFillError::Appearance {
                field: field.name.clone(),
                source,
            },
        )?;
        appearances.push((*widget, appearance));
    }

    field_dict_mut(document, field)?.set("V", pdf::text_string(value));
    for (widget, appearance) in appearances {
        let appearance_id = document.add_object(appearance);
        if let Some(widget) = dict_by_id_mut(document, widget) {
            widget.set("AP", dictionary! { "N" => appearance_id });
        }
    }
    Ok(())
}

fn fill_checkbox(
    document: &mut Document,
    field: &FormField,
    value: &str,
    on_state: &str,
) -> Result<(), FieldFillError> {
    let state = if is_truthy(value) { on_state } else { OFF_STATE };
    field_dict_mut(document, field)?.set("V", pdf::name(state));
    select_widget_states(document, field, state);
    Ok(())
}

fn fill_radio(
    document: &mut Document,
    field: &FormField,
    value: &str,
    options: &[String],
) -> Result<(), FieldFillError> {
    if !options.iter().any(|option| option == value) {
        return Err(FieldFillError::InvalidOption {
            field: field.name.clone(),
            value: value.to_string(),
        });
    }
    field_dict_mut(document, field)?.set("V", pdf::name(value));
    select_widget_states(document, field, value);
    Ok(())
}

fn fill_dropdown(
    document: &mut Document,
    field: &FormField,
    value: &str,
    options: &[String],
) -> Result<(), FieldFillError> {
    if !options.iter().any(|option| option == value) {
        return Err(FieldFillError::InvalidOption {
            field: field.name.clone(),
            value: value.to_string(),
        });
    }
    field_dict_mut(document, field)?.set("V", pdf::text_string(value));
    Ok(())
}

/// Point every widget's `/AS` at `state` if it has that appearance, else `Off`.
fn select_widget_states(document: &mut Document, field: &FormField, state: &str) {
    for widget in &field.widgets {
        let has_state = widget_states(document, *widget)
            .iter()
            .any(|candidate| candidate == state);
        let selected = if has_state { state } else { OFF_STATE };
        if let Some(widget) = dict_by_id_mut(document, *widget) {
            widget.set("AS", pdf::name(selected));
        }
    }
}

/// Size from the field's `/DA` (`/Helv 10 Tf 0 g`); `0` means auto.
fn default_font_size(dict: &Dictionary) -> Option<f64> {
    let Ok(Object::String(bytes, _)) = dict.get(b"DA") else {
        return None;
    };
    let appearance = String::from_utf8_lossy(bytes);
    let tokens: Vec<&str> = appearance.split_whitespace().collect();
    tokens
        .windows(2)
        .find(|pair| pair[1] == "Tf")
        .and_then(|pair| pair[0].parse::<f64>().ok())
        .filter(|size| *size > 0.0)
}

fn widget_size(widget: &Dictionary) -> Option<(f64, f64)> {
    let Ok(Object::Array(corners)) = widget.get(b"Rect") else {
        return None;
    };
    let values: Vec<f64> = corners.iter().filter_map(pdf::number).collect();
    if values.len() != 4 {
        return None;
    }
    let width = (values[2] - values[0]).abs();
    let height = (values[3] - values[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn text_appearance(
    value: &str,
    width: f64,
    height: f64,
    font_size: Option<f64>,
    font_id: ObjectId,
) -> Result<Stream, PdfError> {
    let size = font_size
        .unwrap_or_else(|| (height * 0.7).min(12.0))
        .max(4.0)
        .round() as i64;
    let baseline = ((height - size as f64) / 2.0 + size as f64 * 0.22).max(1.0).round() as i64;
    let text = value.replace(['\r', '\n'], " ");

    let operations = vec![
        Operation::new("BMC", vec![pdf::name("Tx")]),
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![pdf::name(APPEARANCE_FONT), pdf::int(size)]),
        Operation::new("Td", vec![pdf::int(2), pdf::int(baseline)]),
        Operation::new(
            "Tj",
            vec![Object::String(pdf::win_ansi(&text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("EMC", vec![]),
    ];
    let content = pdf::encode_content(operations)?;

    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => pdf::rect(0, 0, width.round() as i64, height.round() as i64),
            "Resources" => dictionary! {
                "Font" => dictionary! { APPEARANCE_FONT => font_id },
            },
        },
        content,
    ))
}

/// Ask viewers to rebuild appearances for fields we did not draw ourselves.
pub fn set_need_appearances(document: &mut Document) {
    let Some(catalog_id) = catalog_id(document) else {
        return;
    };
    let entry = dict_by_id(document, catalog_id)
        .and_then(|catalog| catalog.get(b"AcroForm").ok())
        .cloned();

    match entry {
        Some(Object::Reference(form_id)) => {
            if let Some(form) = dict_by_id_mut(document, form_id) {
                form.set("NeedAppearances", true);
            }
        }
        Some(Object::Dictionary(_)) => {
            if let Some(Object::Dictionary(form)) = dict_by_id_mut(document, catalog_id)
                .and_then(|catalog| catalog.get_mut(b"AcroForm").ok())
            {
                form.set("NeedAppearances", true);
            }
        }
        _ => {}
    }
}
