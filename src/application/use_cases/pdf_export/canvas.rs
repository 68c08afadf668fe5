use super::text::{to_win_ansi, Face};
use crate::domain::error::{AppError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 102, 204);
    pub const GREEN: Rgb = Rgb(0, 153, 76);
    pub const RED: Rgb = Rgb(220, 53, 69);
    pub const AMBER: Rgb = Rgb(255, 193, 7);

    fn components(&self) -> Vec<Object> {
        [self.0, self.1, self.2]
            .iter()
            .map(|c| Object::Real(*c as f32 / 255.0))
            .collect()
    }
}

fn font_resource(face: Face) -> &'static str {
    match face {
        Face::Regular => "F1",
        Face::Bold => "F2",
        Face::Mono => "F3",
    }
}

fn base_font(face: Face) -> &'static str {
    match face {
        Face::Regular => "Helvetica",
        Face::Bold => "Helvetica-Bold",
        Face::Mono => "Courier",
    }
}

#[derive(Default)]
struct PageOps {
    operations: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

/// Minimal A4 drawing surface over lopdf. Positions are millimetres from
/// the top-left corner, text `y` is the baseline.
pub struct PdfCanvas {
    doc: Document,
    pages: Vec<PageOps>,
    fonts: Vec<(Face, ObjectId)>,
    image_count: usize,
}

impl PdfCanvas {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let fonts = [Face::Regular, Face::Bold, Face::Mono]
            .into_iter()
            .map(|face| {
                let id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => base_font(face),
                    "Encoding" => "WinAnsiEncoding",
                });
                (face, id)
            })
            .collect();

        Self {
            doc,
            pages: vec![PageOps::default()],
            fonts,
            image_count: 0,
        }
    }

    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageOps::default());
        self.pages.len() - 1
    }

    pub fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draws one line of text on `page`. Each call is self-contained so
    /// text can be placed on earlier pages after layout.
    pub fn text_on(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        face: Face,
        size: f32,
        color: Rgb,
        text: &str,
    ) {
        let Some(ops) = self.pages.get_mut(page) else {
            return;
        };
        ops.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font_resource(face).into(), size.into()]),
            Operation::new("rg", color.components()),
            Operation::new(
                "Td",
                vec![(x * PT_PER_MM).into(), ((PAGE_HEIGHT_MM - y) * PT_PER_MM).into()],
            ),
            Operation::new("Tj", vec![Object::string_literal(to_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    pub fn text(&mut self, x: f32, y: f32, face: Face, size: f32, color: Rgb, text: &str) {
        let page = self.current_page();
        self.text_on(page, x, y, face, size, color, text);
    }

    /// Decodes `bytes` and draws the picture scaled into the given box,
    /// top-left at (x, y). Nothing is drawn when decoding fails.
    pub fn image(&mut self, x: f32, y: f32, width: f32, height: f32, bytes: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AppError::ExportError(format!("Failed to decode image: {}", e)))?;
        let rgb = decoded.to_rgb8();
        let (pixel_width, pixel_height) = rgb.dimensions();

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => pixel_width as i64,
                "Height" => pixel_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.into_raw(),
        );
        let image_id = self.doc.add_object(stream);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let bottom = PAGE_HEIGHT_MM - (y + height);
        let page = self.current_page();
        let ops = &mut self.pages[page];
        ops.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width * PT_PER_MM).into(),
                    0.into(),
                    0.into(),
                    (height * PT_PER_MM).into(),
                    (x * PT_PER_MM).into(),
                    (bottom * PT_PER_MM).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        ops.images.push((name, image_id));
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let PdfCanvas {
            mut doc,
            pages,
            fonts,
            ..
        } = self;

        let mut font_dict = Dictionary::new();
        for (face, id) in &fonts {
            font_dict.set(font_resource(*face), Object::Reference(*id));
        }

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = Content {
                operations: page.operations,
            };
            let encoded = content
                .encode()
                .map_err(|e| AppError::ExportError(format!("Failed to encode page: {}", e)))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, Object::Reference(id));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => font_dict.clone(),
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    (PAGE_WIDTH_MM * PT_PER_MM).into(),
                    (PAGE_HEIGHT_MM * PT_PER_MM).into(),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| AppError::ExportError(format!("Failed to write PDF: {}", e)))?;
        Ok(bytes)
    }
}
