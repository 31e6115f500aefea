use crate::chunking::split_paragraphs;
use crate::error::IngestError;
use crate::models::{PageMap, ParsedDocument};
use lopdf::Document;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

impl DocumentFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let lowered = file_name.to_lowercase();
        if lowered.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if lowered.ends_with(".txt") {
            Ok(Self::Text)
        } else {
            Err(IngestError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

pub trait PdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load_mem(bytes).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        Ok(pages)
    }
}

pub fn parse_document(file_name: &str, bytes: &[u8]) -> Result<ParsedDocument, IngestError> {
    parse_document_with(&LopdfExtractor, file_name, bytes)
}

pub fn parse_document_with<X: PdfExtractor + ?Sized>(
    extractor: &X,
    file_name: &str,
    bytes: &[u8],
) -> Result<ParsedDocument, IngestError> {
    match DocumentFormat::from_file_name(file_name)? {
        DocumentFormat::Pdf => Ok(paragraphs_from_pages(&extractor.extract_pages(bytes)?)),
        DocumentFormat::Text => Ok(parse_text(bytes)),
    }
}

fn paragraphs_from_pages(pages: &[PageText]) -> ParsedDocument {
    let mut paragraphs: Vec<&str> = Vec::new();
    let mut page_map = PageMap::new();

    for page in pages {
        for paragraph in split_paragraphs(&page.text) {
            page_map.insert(paragraphs.len(), page.number);
            paragraphs.push(paragraph);
        }
    }

    ParsedDocument {
        text: paragraphs.join("\n\n"),
        page_map,
    }
}

fn parse_text(bytes: &[u8]) -> ParsedDocument {
    let text = decode_lossy(bytes);
    let page_map = (0..split_paragraphs(&text).len())
        .map(|index| (index, 1))
        .collect();

    ParsedDocument { text, page_map }
}

/// UTF-8 decode that drops invalid byte sequences instead of replacing them.
fn decode_lossy(bytes: &[u8]) -> String {
    bytes
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeExtractor {
        pages: Vec<PageText>,
    }

    impl PdfExtractor for FakeExtractor {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
            Ok(self.pages.clone())
        }
    }

    #[test]
    fn text_upload_maps_every_paragraph_to_page_one() {
        let bytes = b"First paragraph.\n\nSecond paragraph (testing).";
        let parsed = parse_document("demo.txt", bytes).expect("txt should parse");

        assert_eq!(parsed.text, "First paragraph.\n\nSecond paragraph (testing).");
        assert_eq!(parsed.page_map, PageMap::from([(0, 1), (1, 1)]));
    }

    #[test]
    fn text_decoding_drops_invalid_bytes() {
        let parsed = parse_document("notes.TXT", b"caf\xc3\xa9 \xff\xfeok").expect("txt should parse");
        assert_eq!(parsed.text, "café ok");
    }

    #[test]
    fn pdf_pages_are_split_into_paragraphs_with_page_numbers() {
        let extractor = FakeExtractor {
            pages: vec![
                PageText {
                    number: 1,
                    text: "Intro line.\n\n  Second block.  \n\n".to_string(),
                },
                PageText {
                    number: 2,
                    text: "   ".to_string(),
                },
                PageText {
                    number: 3,
                    text: "Closing words.".to_string(),
                },
            ],
        };

        let parsed =
            parse_document_with(&extractor, "Report.PDF", b"%PDF").expect("pdf should parse");

        assert_eq!(parsed.text, "Intro line.\n\nSecond block.\n\nClosing words.");
        assert_eq!(parsed.page_map, PageMap::from([(0, 1), (1, 1), (2, 3)]));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let error = parse_document("slides.docx", b"data").expect_err("docx is unsupported");
        assert!(matches!(error, IngestError::UnsupportedFormat(name) if name == "slides.docx"));
    }

    #[test]
    fn broken_pdf_reports_parse_error() {
        let error = parse_document("broken.pdf", b"%PDF-1.4\n%broken").expect_err("pdf is broken");
        assert!(matches!(error, IngestError::PdfParse(_)));
    }
}
