//! Synthetic one-page rendering used when no template PDF exists.

use lopdf::content::Operation;

use crate::models::{Confidence, ConfidenceMap, DataRecord};
use crate::pdf::{self, PdfError, SinglePageBuilder, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH};
use crate::templates::TemplateDescriptor;

const TITLE_SIZE: i64 = 18;
const LINE_SIZE: i64 = 11;
const LINE_HEIGHT: i64 = 20;
const TITLE_GAP: i64 = 40;

pub const NOT_PROVIDED: &str = "[NOT PROVIDED]";

pub struct FallbackRender {
    pub bytes: Vec<u8>,
    pub fields_processed: usize,
    pub fields_total: usize,
}

/// One printed line for `label`. Values without a confidence tag are printed
/// bare.
pub fn fallback_line(
    label: &str,
    value: Option<&str>,
    confidence: Option<&Confidence>,
) -> String {
    match (value, confidence) {
        (Some(value), Some(confidence)) => {
            format!("{}: {} ({} confidence)", label, value, confidence)
        }
        (Some(value), None) => format!("{}: {}", label, value),
        (None, _) => format!("{}: {}", label, NOT_PROVIDED),
    }
}

/// One line per entry in the descriptor's field table, in table order.
pub fn fallback_lines(
    descriptor: &TemplateDescriptor,
    data: &DataRecord,
    confidence: &ConfidenceMap,
) -> Vec<String> {
    descriptor
        .category
        .fields()
        .iter()
        .map(|(key, label)| fallback_line(label, data.get(key), confidence.get(*key)))
        .collect()
}

pub fn render(
    descriptor: &TemplateDescriptor,
    data: &DataRecord,
    confidence: &ConfidenceMap,
) -> Result<FallbackRender, PdfError> {
    let fields = descriptor.category.fields();
    let fields_processed = fields.iter().filter(|(key, _)| data.contains(key)).count();

    let title_y = PAGE_HEIGHT - PAGE_MARGIN - TITLE_SIZE;
    let mut operations: Vec<Operation> =
        pdf::text_line(PAGE_MARGIN, title_y, TITLE_SIZE, &descriptor.title);
    let line_width = (PAGE_WIDTH - 2 * PAGE_MARGIN) as f64;
    let mut y = title_y - TITLE_GAP;
    for line in fallback_lines(descriptor, data, confidence) {
        let line = pdf::fit_text(&line, LINE_SIZE, line_width);
        operations.extend(pdf::text_line(PAGE_MARGIN, y, LINE_SIZE, &line));
        y -= LINE_HEIGHT;
    }

    let mut document = SinglePageBuilder::new().build(operations)?;
    Ok(FallbackRender {
        bytes: pdf::save(&mut document)?,
        fields_processed,
        fields_total: fields.len(),
    })
}
