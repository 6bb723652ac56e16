//! Raster images rendered as labelled Letter pages.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba};
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Stream};
use thiserror::Error;

use crate::pdf::{self, PdfError, SinglePageBuilder, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH};

pub const SUPPORTED_MEDIA_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

const LABEL_SIZE: i64 = 16;
/// Vertical space reserved for the label above the image band.
const LABEL_BAND: i64 = 30;
const IMAGE_RESOURCE: &str = "Im1";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImagePurpose {
    DriversLicense,
    InsuranceCard,
    NewCarOdometer,
    NewCarVin,
    TradeInOdometer,
    TradeInVin,
    TradeInRegistration,
    Other(String),
}

impl ImagePurpose {
    pub fn label(&self) -> &str {
        match self {
            ImagePurpose::DriversLicense => "Driver's License",
            ImagePurpose::InsuranceCard => "Insurance Card",
            ImagePurpose::NewCarOdometer => "New Car Odometer",
            ImagePurpose::NewCarVin => "New Car VIN",
            ImagePurpose::TradeInOdometer => "Trade-In Odometer",
            ImagePurpose::TradeInVin => "Trade-In VIN",
            ImagePurpose::TradeInRegistration => "Trade-In Registration",
            ImagePurpose::Other(label) => label,
        }
    }
}

impl fmt::Display for ImagePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImagePurpose {
    type Err = std::convert::Infallible;

    /// Accepts `drivers_license`, `driversLicense`, `Driver's License` and so on;
    /// anything unrecognised becomes `Other` with the trimmed input as label.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = crate::mapping::normalize_field_name(value);
        Ok(match normalized.as_str() {
            "driverslicense" | "license" | "dl" => ImagePurpose::DriversLicense,
            "insurancecard" | "insurance" => ImagePurpose::InsuranceCard,
            "newcarodometer" | "odometer" => ImagePurpose::NewCarOdometer,
            "newcarvin" | "vin" => ImagePurpose::NewCarVin,
            "tradeinodometer" | "tradeodometer" => ImagePurpose::TradeInOdometer,
            "tradeinvin" | "tradevin" => ImagePurpose::TradeInVin,
            "tradeinregistration" | "registration" => ImagePurpose::TradeInRegistration,
            _ => {
                let label = value.trim();
                ImagePurpose::Other(if label.is_empty() {
                    "Image".to_string()
                } else {
                    label.to_string()
                })
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImagePage {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub purpose: ImagePurpose,
}

impl ImagePage {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, purpose: ImagePurpose) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            purpose,
        }
    }

    pub fn label(&self) -> &str {
        self.purpose.label()
    }

    pub fn is_supported(&self) -> bool {
        is_supported_media_type(&self.media_type)
    }
}

pub fn is_supported_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    SUPPORTED_MEDIA_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(essence))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Fit `image_width x image_height` into the band, preserving aspect ratio,
/// centred both ways.
pub fn fit_into_band(
    image_width: u32,
    image_height: u32,
    band_x: i64,
    band_y: i64,
    band_width: i64,
    band_height: i64,
) -> Placement {
    let image_width = f64::from(image_width.max(1));
    let image_height = f64::from(image_height.max(1));
    let image_aspect = image_width / image_height;
    let band_aspect = band_width as f64 / band_height as f64;

    let (width, height) = if image_aspect > band_aspect {
        (band_width as f64, band_width as f64 / image_aspect)
    } else {
        (band_height as f64 * image_aspect, band_height as f64)
    };
    let width = (width.round() as i64).clamp(1, band_width);
    let height = (height.round() as i64).clamp(1, band_height);

    Placement {
        x: band_x + (band_width - width) / 2,
        y: band_y + (band_height - height) / 2,
        width,
        height,
    }
}

/// Placement of an image on the standard page, below the label band.
pub fn page_placement(image_width: u32, image_height: u32) -> Placement {
    let band_width = PAGE_WIDTH - 2 * PAGE_MARGIN;
    let band_height = PAGE_HEIGHT - 2 * PAGE_MARGIN - LABEL_BAND;
    fit_into_band(
        image_width,
        image_height,
        PAGE_MARGIN,
        PAGE_MARGIN,
        band_width,
        band_height,
    )
}

#[derive(Debug, Error)]
pub enum ImagePageError {
    #[error("unsupported format: {0}")]
    Unsupported(String),
    #[error("unreadable image: {0}")]
    Decode(String),
    #[error("image could not be re-encoded: {0}")]
    Encode(String),
    #[error("page could not be built: {0}")]
    Pdf(#[from] PdfError),
}

/// Render `page` as a one-page document: label on the top margin line, image
/// fitted into the band below.
pub fn render_image_page(page: &ImagePage) -> Result<Document, ImagePageError> {
    if !page.is_supported() {
        return Err(ImagePageError::Unsupported(page.media_type.clone()));
    }

    let decoded = image::load_from_memory(&page.bytes)
        .map_err(|e| ImagePageError::Decode(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    let jpeg = encode_jpeg(decoded)?;

    let placement = page_placement(width, height);
    let mut operations: Vec<Operation> = pdf::text_line(
        PAGE_MARGIN,
        PAGE_HEIGHT - PAGE_MARGIN - LABEL_SIZE,
        LABEL_SIZE,
        page.label(),
    );
    operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                pdf::int(placement.width),
                pdf::int(0),
                pdf::int(0),
                pdf::int(placement.height),
                pdf::int(placement.x),
                pdf::int(placement.y),
            ],
        ),
        Operation::new("Do", vec![pdf::name(IMAGE_RESOURCE)]),
        Operation::new("Q", vec![]),
    ]);

    let mut builder = SinglePageBuilder::new();
    builder.add_image(IMAGE_RESOURCE, image_stream(width, height, jpeg));
    builder.build(operations).map_err(ImagePageError::Pdf)
}

/// Baseline JPEG of the image in RGB. Transparent areas come out white.
fn encode_jpeg(image: DynamicImage) -> Result<Vec<u8>, ImagePageError> {
    let rgb = if image.color().has_alpha() {
        flatten_onto_white(&image)
    } else {
        image.to_rgb8()
    };
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| ImagePageError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |channel: u8| {
            ((u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn image_stream(width: u32, height: u32, jpeg: Vec<u8>) -> Stream {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => pdf::int(i64::from(width)),
            "Height" => pdf::int(i64::from(height)),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => pdf::int(8),
            "Filter" => "DCTDecode",
        },
        jpeg,
    );
    stream.allows_compression = false;
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_from_str() {
        assert_eq!("drivers_license".parse::<ImagePurpose>().unwrap(), ImagePurpose::DriversLicense);
        assert_eq!("newCarOdometer".parse::<ImagePurpose>().unwrap(), ImagePurpose::NewCarOdometer);
        assert_eq!(
            "Service Record".parse::<ImagePurpose>().unwrap(),
            ImagePurpose::Other("Service Record".to_string())
        );
    }

    #[test]
    fn test_purpose_labels() {
        assert_eq!(ImagePurpose::DriversLicense.label(), "Driver's License");
        assert_eq!(ImagePurpose::NewCarOdometer.to_string(), "New Car Odometer");
    }

    #[test]
    fn test_supported_media_types() {
        assert!(is_supported_media_type("image/jpeg"));
        assert!(is_supported_media_type("IMAGE/PNG"));
        assert!(is_supported_media_type("image/jpg; charset=binary"));
        assert!(!is_supported_media_type("image/heic"));
        assert!(!is_supported_media_type("application/pdf"));
    }

    #[test]
    fn test_wide_image_scales_by_width() {
        // Band aspect 100/50 = 2; image aspect 4.
        let placement = fit_into_band(400, 100, 0, 0, 100, 50);

        assert_eq!(placement.width, 100);
        assert_eq!(placement.height, 25);
        assert_eq!((placement.x, placement.y), (0, 12));
    }

    #[test]
    fn test_tall_image_scales_by_height() {
        let placement = fit_into_band(100, 400, 10, 20, 100, 50);

        assert_eq!(placement.height, 50);
        assert_eq!(placement.width, 13);
        assert_eq!(placement.x, 10 + (100 - 13) / 2);
        assert_eq!(placement.y, 20);
    }

    #[test]
    fn test_page_placement_stays_inside_margins() {
        let placement = page_placement(3000, 2000);

        assert!(placement.x >= PAGE_MARGIN);
        assert!(placement.y >= PAGE_MARGIN);
        assert!(placement.x + placement.width <= PAGE_WIDTH - PAGE_MARGIN);
        assert!(placement.y + placement.height <= PAGE_HEIGHT - PAGE_MARGIN - LABEL_BAND);
    }

    #[test]
    fn test_unsupported_image_is_rejected() {
        let page = ImagePage::new(vec![1, 2, 3], "image/heic", ImagePurpose::InsuranceCard);

        let err = render_image_page(&page).unwrap_err();

        assert!(matches!(err, ImagePageError::Unsupported(_)));
        assert_eq!(err.to_string(), "unsupported format: image/heic");
    }

    #[test]
    fn test_undecodable_image_reports_reason() {
        let page = ImagePage::new(vec![0, 1, 2, 3], "image/png", ImagePurpose::TradeInVin);

        let err = render_image_page(&page).unwrap_err();

        assert!(matches!(err, ImagePageError::Decode(_)));
        assert!(err.to_string().starts_with("unreadable image: "));
    }

    #[test]
    fn test_transparent_pixels_are_flattened_onto_white() {
        // Fully transparent black with one opaque red pixel.
        let mut rgba = image::RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(15, 15, Rgba([200, 0, 0, 255]));

        let jpeg = encode_jpeg(DynamicImage::ImageRgba8(rgba)).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        let Rgb([r, g, b]) = *decoded.get_pixel(0, 0);
        assert!(r > 240 && g > 240 && b > 240, "got {:?}", (r, g, b));
    }

    #[test]
    fn test_half_transparent_pixel_blends_with_white() {
        let rgba = image::RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));

        let flattened = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(*flattened.get_pixel(0, 0), Rgb([127, 127, 127]));
    }
}
