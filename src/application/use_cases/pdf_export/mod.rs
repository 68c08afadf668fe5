//! Multi-page PDF report of the checklist.
//!
//! Layout is manual: a [`PageCursor`] tracks the vertical position and every
//! block reserves its space first, breaking to a new page when it would run
//! past the bottom margin. Body text advances 7 mm per line, query text
//! (Courier 8 pt) 4 mm per line.

#[cfg(feature = "pdf")]
mod canvas;
#[cfg(feature = "pdf")]
mod cursor;
#[cfg(feature = "pdf")]
mod text;

#[cfg(feature = "pdf")]
pub use cursor::PageCursor;

use crate::application::use_cases::checklist_store::ChecklistStore;
#[cfg(not(feature = "pdf"))]
use crate::domain::error::AppError;
use crate::domain::error::Result;
#[cfg(feature = "pdf")]
use crate::domain::test_case::ReportingTool;
use chrono::NaiveDate;

#[cfg(not(feature = "pdf"))]
pub const PDF_UNAVAILABLE: &str = "PDF library not loaded. Please refresh the page and try again.";

pub struct PdfReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// 1-based start page of every test case, in checklist order.
    pub section_pages: Vec<usize>,
}

#[cfg(feature = "pdf")]
pub fn pdf_file_name(tool: ReportingTool, today: NaiveDate) -> String {
    format!(
        "Validation_Checklist_{}_{}.pdf",
        tool.as_str(),
        today.format("%Y-%m-%d")
    )
}

#[cfg(not(feature = "pdf"))]
pub fn export_pdf(_store: &ChecklistStore, _report_name: &str, _today: NaiveDate) -> Result<PdfReport> {
    Err(AppError::ExportError(PDF_UNAVAILABLE.to_string()))
}

#[cfg(feature = "pdf")]
pub fn export_pdf(store: &ChecklistStore, report_name: &str, today: NaiveDate) -> Result<PdfReport> {
    layout::export(store, report_name, today)
}

#[cfg(feature = "pdf")]
mod layout {
    use super::canvas::{PdfCanvas, Rgb, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
    use super::text::{chars_per_line, wrap_text, Face};
    use super::{pdf_file_name, PageCursor, PdfReport};
    use crate::application::use_cases::checklist_store::ChecklistStore;
    use crate::domain::error::{AppError, Result};
    use crate::domain::test_case::{
        resolve_target_query, Evidence, ReportingTool, Status, TestCase, SOURCE_QUERY_LABEL,
    };
    use base64::Engine as _;
    use chrono::NaiveDate;
    use tracing::{debug, warn};

    const MARGIN: f32 = 20.0;
    const BODY_LINE: f32 = 7.0;
    const CODE_LINE: f32 = 4.0;
    const BODY_SIZE: f32 = 10.0;
    const CODE_SIZE: f32 = 8.0;
    const IMAGE_WIDTH: f32 = 80.0;
    const IMAGE_HEIGHT: f32 = 60.0;
    const IMAGE_FAILED: &str = "(Image could not be loaded)";

    fn status_color(status: Status) -> Rgb {
        match status {
            Status::Passed => Rgb::GREEN,
            Status::Failed => Rgb::RED,
            Status::Pending => Rgb::AMBER,
        }
    }

    struct TocSlot {
        page: usize,
        y: f32,
        case_index: usize,
    }

    struct ReportWriter {
        canvas: PdfCanvas,
        cursor: PageCursor,
        max_width: f32,
        tool: ReportingTool,
    }

    impl ReportWriter {
        fn new(tool: ReportingTool) -> Self {
            Self {
                canvas: PdfCanvas::new(),
                cursor: PageCursor::new(PAGE_HEIGHT_MM, MARGIN),
                max_width: PAGE_WIDTH_MM - MARGIN * 2.0,
                tool,
            }
        }

        fn new_page(&mut self) {
            self.canvas.add_page();
            self.cursor.reset();
        }

        /// Reserve vertical space, starting a new page when it does not fit.
        fn reserve(&mut self, space: f32) -> bool {
            let broke = self.cursor.reserve(space);
            if broke {
                self.canvas.add_page();
            }
            broke
        }

        fn line(&mut self, face: Face, size: f32, color: Rgb, text: &str) {
            let y = self.cursor.y();
            self.canvas.text(MARGIN, y, face, size, color, text);
        }

        /// Wrapped body text, 7 mm per line.
        fn paragraph(&mut self, text: &str, color: Rgb) {
            let max_chars = chars_per_line(Face::Regular, BODY_SIZE, self.max_width);
            for line in wrap_text(text, max_chars) {
                self.reserve(10.0);
                self.line(Face::Regular, BODY_SIZE, color, &line);
                self.cursor.advance(BODY_LINE);
            }
        }

        fn labelled_paragraph(&mut self, label: &str, text: &str) {
            self.reserve(20.0);
            self.line(Face::Bold, BODY_SIZE, Rgb::BLACK, label);
            self.cursor.advance(BODY_LINE);
            self.paragraph(text, Rgb::BLACK);
            self.cursor.advance(5.0);
        }

        /// Query text in Courier, 4 mm per line.
        fn code_block(&mut self, label: &str, code: &str) {
            self.reserve(30.0);
            self.line(Face::Bold, BODY_SIZE, Rgb::BLACK, label);
            self.cursor.advance(BODY_LINE);
            let max_chars = chars_per_line(Face::Mono, CODE_SIZE, self.max_width);
            for line in wrap_text(code, max_chars) {
                self.reserve(5.0);
                self.line(Face::Mono, CODE_SIZE, Rgb::BLACK, &line);
                self.cursor.advance(CODE_LINE);
            }
            self.cursor.advance(5.0);
        }

        fn cover(&mut self, store: &ChecklistStore, report_name: &str) {
            self.line(Face::Bold, 24.0, Rgb::BLUE, "Report Validation Checklist");
            self.cursor.advance(15.0);
            self.line(Face::Regular, 18.0, Rgb::BLACK, report_name);
            self.cursor.advance(20.0);

            self.line(Face::Bold, 12.0, Rgb::BLACK, "Report Information");
            self.cursor.advance(8.0);

            let meta = store.meta();
            let validator = if meta.validator.trim().is_empty() {
                "Not specified"
            } else {
                meta.validator.as_str()
            };
            let info = [
                format!("Reporting Tool: {}", self.tool.display_name()),
                format!("Validation Date: {}", meta.validation_date.format("%Y-%m-%d")),
                format!("Validator: {}", validator),
            ];
            for (i, text) in info.iter().enumerate() {
                self.line(Face::Regular, BODY_SIZE, Rgb::BLACK, text);
                self.cursor.advance(if i + 1 == info.len() { 15.0 } else { BODY_LINE });
            }

            let description = store.report_description();
            if !description.is_empty() {
                self.reserve(30.0);
                self.line(Face::Bold, 12.0, Rgb::BLACK, "Report Description");
                self.cursor.advance(8.0);
                self.paragraph(description, Rgb::BLACK);
                self.cursor.advance(10.0);
            }
        }

        fn table_of_contents(&mut self, test_cases: &[TestCase]) -> Vec<TocSlot> {
            self.reserve(30.0);
            self.line(Face::Bold, 12.0, Rgb::BLACK, "Table of Contents");
            self.cursor.advance(10.0);

            let max_chars = chars_per_line(Face::Regular, BODY_SIZE, self.max_width - 30.0);
            let mut slots = Vec::with_capacity(test_cases.len());
            for (case_index, test_case) in test_cases.iter().enumerate() {
                let entry = format!("{}: {}", test_case.id, test_case.title);
                for (i, line) in wrap_text(&entry, max_chars).iter().enumerate() {
                    self.reserve(10.0);
                    let y = self.cursor.y();
                    if i == 0 {
                        self.canvas.text(MARGIN, y, Face::Regular, BODY_SIZE, Rgb::BLACK, line);
                        slots.push(TocSlot {
                            page: self.canvas.current_page(),
                            y,
                            case_index,
                        });
                    } else {
                        self.canvas
                            .text(MARGIN + 10.0, y, Face::Regular, BODY_SIZE, Rgb::BLACK, line);
                    }
                    self.cursor.advance(BODY_LINE);
                }
            }
            slots
        }

        fn evidence(&mut self, evidence: &[Evidence]) {
            self.reserve(30.0);
            self.line(Face::Bold, BODY_SIZE, Rgb::BLACK, "Evidence:");
            self.cursor.advance(BODY_LINE);

            for item in evidence {
                self.reserve(15.0);
                self.line(
                    Face::Regular,
                    BODY_SIZE,
                    Rgb::BLACK,
                    &format!("\u{2022} {}", item.name),
                );
                self.cursor.advance(BODY_LINE);

                let Some(url) = item.url.as_deref().filter(|_| item.is_image()) else {
                    continue;
                };
                self.reserve(IMAGE_HEIGHT + 10.0);
                let y = self.cursor.y();
                let drawn = decode_data_url_payload(url)
                    .and_then(|bytes| self.canvas.image(MARGIN, y, IMAGE_WIDTH, IMAGE_HEIGHT, &bytes));
                match drawn {
                    Ok(()) => self.cursor.advance(IMAGE_HEIGHT + 5.0),
                    Err(err) => {
                        warn!(error = %err, name = %item.name, "Evidence image skipped in PDF");
                        self.canvas
                            .text(MARGIN + 10.0, y, Face::Regular, BODY_SIZE, Rgb::BLACK, IMAGE_FAILED);
                        self.cursor.advance(BODY_LINE);
                    }
                }
            }
        }

        /// Lays out one test case from a fresh page; returns that page's index.
        fn test_case_section(&mut self, test_case: &TestCase) -> usize {
            self.new_page();
            let start_page = self.canvas.current_page();

            self.line(Face::Bold, 14.0, Rgb::BLUE, &format!("Test Case {}", test_case.id));
            self.cursor.advance(10.0);

            let max_chars = chars_per_line(Face::Regular, 12.0, self.max_width);
            for line in wrap_text(&test_case.title, max_chars) {
                self.line(Face::Regular, 12.0, Rgb::BLACK, &line);
                self.cursor.advance(BODY_LINE);
            }
            self.cursor.advance(5.0);

            self.line(
                Face::Regular,
                BODY_SIZE,
                Rgb::BLACK,
                &format!("Validation Phase: {}", test_case.phase.label()),
            );
            self.cursor.advance(BODY_LINE);
            self.line(
                Face::Regular,
                BODY_SIZE,
                Rgb::BLACK,
                &format!("Status: {}", test_case.status.label()),
            );
            self.cursor.advance(10.0);

            if !test_case.description.is_empty() {
                self.labelled_paragraph("Description:", &test_case.description);
            }
            if !test_case.expected_result.is_empty() {
                self.labelled_paragraph("Expected Result:", &test_case.expected_result);
            }
            if !test_case.source_query.is_empty() {
                self.code_block(&format!("{}:", SOURCE_QUERY_LABEL), &test_case.source_query);
            }
            let target_query = resolve_target_query(test_case, self.tool);
            if !target_query.is_empty() {
                self.code_block(&format!("{}:", self.tool.target_query_label()), target_query);
            }
            if !test_case.evidence.is_empty() {
                self.evidence(&test_case.evidence);
            }

            self.reserve(15.0);
            self.line(Face::Bold, BODY_SIZE, Rgb::BLACK, "Test Result:");
            self.cursor.advance(BODY_LINE);
            self.line(
                Face::Regular,
                BODY_SIZE,
                status_color(test_case.status),
                test_case.status.label(),
            );
            start_page
        }

        fn summary_page(&mut self, store: &ChecklistStore) {
            self.new_page();
            self.line(Face::Bold, 16.0, Rgb::BLUE, "Validation Summary");
            self.cursor.advance(15.0);

            let summary = store.summary();
            let rows = [
                (format!("Total Test Cases: {}", summary.total), Rgb::BLACK),
                (format!("Passed: {}", summary.passed), Rgb::GREEN),
                (format!("Failed: {}", summary.failed), Rgb::RED),
                (format!("Pending: {}", summary.pending), Rgb::AMBER),
                (
                    format!("Completion Rate: {}%", summary.completion_rate),
                    Rgb::BLUE,
                ),
            ];
            for (text, color) in rows {
                self.line(Face::Regular, 12.0, color, &text);
                self.cursor.advance(10.0);
            }
        }
    }

    fn decode_data_url_payload(data_url: &str) -> Result<Vec<u8>> {
        let (_, payload) = data_url
            .split_once(',')
            .ok_or_else(|| AppError::ExportError("Evidence image is not a data URL".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::ExportError(format!("Evidence image is not base64: {}", e)))
    }

    pub(super) fn export(
        store: &ChecklistStore,
        report_name: &str,
        today: NaiveDate,
    ) -> Result<PdfReport> {
        let tool = store.active_tool();
        let mut writer = ReportWriter::new(tool);

        writer.cover(store, report_name);
        let toc = writer.table_of_contents(store.test_cases());

        let section_pages: Vec<usize> = store
            .test_cases()
            .iter()
            .map(|test_case| writer.test_case_section(test_case) + 1)
            .collect();

        // Page numbers are only known once every section is laid out.
        let number_x = writer.max_width + MARGIN - 20.0;
        for slot in &toc {
            let page_number = section_pages[slot.case_index];
            writer.canvas.text_on(
                slot.page,
                number_x,
                slot.y,
                Face::Regular,
                BODY_SIZE,
                Rgb::BLACK,
                &format!("... {}", page_number),
            );
        }

        writer.summary_page(store);

        let page_count = writer.canvas.page_count();
        debug!(page_count, test_cases = store.len(), "Laid out PDF report");
        let bytes = writer.canvas.finish()?;

        Ok(PdfReport {
            file_name: pdf_file_name(tool, today),
            bytes,
            page_count,
            section_pages,
        })
    }
}

#[cfg(all(test, not(feature = "pdf")))]
mod unavailable_tests {
    use super::*;
    use crate::domain::test_case::ReportingTool;

    #[test]
    fn test_export_without_pdf_support_is_an_export_error() {
        let store = ChecklistStore::seeded(ReportingTool::PowerBi);
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let err = export_pdf(&store, "Top 10 Suppliers", today).err().unwrap();
        assert_eq!(err, AppError::ExportError(PDF_UNAVAILABLE.to_string()));
        assert_eq!(
            err.to_string(),
            format!("Export error: {}", PDF_UNAVAILABLE)
        );
    }
}

#[cfg(all(test, feature = "pdf"))]
mod tests {
    use super::*;
    use crate::domain::test_case::{Evidence, Phase, Status, TestCaseInput};
    use base64::Engine as _;
    use std::io::Cursor;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    fn png_data_url() -> String {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 30, 30]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        )
    }

    #[test]
    fn test_file_name_includes_tool_and_date() {
        assert_eq!(
            pdf_file_name(ReportingTool::Oac, today()),
            "Validation_Checklist_oac_2024-06-30.pdf"
        );
        assert_eq!(
            pdf_file_name(ReportingTool::PowerBi, today()),
            "Validation_Checklist_powerbi_2024-06-30.pdf"
        );
    }

    #[test]
    fn test_empty_checklist_has_cover_and_summary_only() {
        let store = ChecklistStore::new(ReportingTool::PowerBi);
        let report = export_pdf(&store, "Top 10 Suppliers", today()).unwrap();
        assert_eq!(report.page_count, 2);
        assert_eq!(page_count(&report.bytes), 2);
        assert!(report.section_pages.is_empty());
    }

    #[test]
    fn test_seeded_checklist_gets_a_section_per_case() {
        let mut store = ChecklistStore::seeded(ReportingTool::Oac);
        store.set_status(0, Status::Passed).unwrap();
        store.set_status(1, Status::Failed).unwrap();
        store.set_report_description("Supplier spend by quarter");

        let report = export_pdf(&store, "Top 10 Suppliers", today()).unwrap();
        assert!(report.page_count >= 12);
        assert_eq!(page_count(&report.bytes), report.page_count);
        assert_eq!(report.section_pages.len(), 10);
        assert_eq!(report.section_pages[0], 2);
        assert!(report.section_pages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(report.file_name, "Validation_Checklist_oac_2024-06-30.pdf");
    }

    #[test]
    fn test_long_query_spills_onto_extra_pages() {
        let mut store = ChecklistStore::new(ReportingTool::PowerBi);
        store
            .add(TestCaseInput {
                id: "TC-001".into(),
                title: "Long query".into(),
                phase: Phase::Technical,
                description: String::new(),
                source_query: "SELECT 1 FROM dual;\n".repeat(120),
                target_query: String::new(),
                expected_result: String::new(),
            })
            .unwrap();

        let report = export_pdf(&store, "r", today()).unwrap();
        // cover, at least two section pages, summary
        assert!(report.page_count >= 4);
    }

    #[test]
    fn test_broken_image_still_exports() {
        let mut store = ChecklistStore::seeded(ReportingTool::PowerBi);
        store
            .add_evidence(
                0,
                Evidence {
                    name: "broken.png".into(),
                    mime_type: "image/png".into(),
                    url: Some("data:image/png;base64,bm90IGFuIGltYWdl".into()),
                    file: None,
                },
            )
            .unwrap();

        let report = export_pdf(&store, "r", today()).unwrap();
        assert!(page_count(&report.bytes) >= 12);
    }

    #[test]
    fn test_image_evidence_is_embedded() {
        let mut store = ChecklistStore::seeded(ReportingTool::PowerBi);
        store
            .add_evidence(
                3,
                Evidence {
                    name: "chart.png".into(),
                    mime_type: "image/png".into(),
                    url: Some(png_data_url()),
                    file: None,
                },
            )
            .unwrap();

        let report = export_pdf(&store, "r", today()).unwrap();
        let doc = lopdf::Document::load_mem(&report.bytes).unwrap();
        let has_image = doc.objects.values().any(|object| match object {
            lopdf::Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            _ => false,
        });
        assert!(has_image);
    }
}
