use super::pages::PageSelection;
use crate::error::ProcessingError;
use bytes::Bytes;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may take from an ancestor in the page tree
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Stateless PDF operations backing the document tools
pub struct PdfTransformer;

impl PdfTransformer {
    fn load(data: &[u8]) -> Result<Document, ProcessingError> {
        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(ProcessingError::UnsupportedInput(
                "Encrypted PDFs are not supported".to_string(),
            ));
        }
        Ok(doc)
    }

    fn save(mut doc: Document) -> Result<Vec<u8>, ProcessingError> {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    pub fn page_count(data: &[u8]) -> Result<u32, ProcessingError> {
        Ok(Self::load(data)?.get_pages().len() as u32)
    }

    /// Extract the text layer of every page
    pub fn extract_text(data: &[u8]) -> Result<String, ProcessingError> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ProcessingError::TextExtraction(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ProcessingError::TextExtraction(
                "The PDF has no text layer".to_string(),
            ));
        }

        Ok(text)
    }

    /// Keep only the selected pages
    pub fn split(data: &[u8], selection: &PageSelection) -> Result<Bytes, ProcessingError> {
        let mut doc = Self::load(data)?;
        let page_count = doc.get_pages().len() as u32;
        let keep = selection.resolve(page_count)?;

        let delete: Vec<u32> = (1..=page_count)
            .filter(|page| keep.binary_search(page).is_err())
            .collect();

        tracing::debug!(
            page_count,
            kept = keep.len(),
            deleted = delete.len(),
            "Splitting PDF"
        );

        if !delete.is_empty() {
            doc.delete_pages(&delete);
            doc.prune_objects();
            doc.renumber_objects();
        }
        doc.compress();

        Ok(Bytes::from(Self::save(doc)?))
    }

    /// Concatenate several PDFs, in order, into one document
    pub fn merge(parts: &[&[u8]]) -> Result<Bytes, ProcessingError> {
        let (first, rest) = match parts {
            [first, rest @ ..] if !rest.is_empty() => (first, rest),
            _ => {
                return Err(ProcessingError::InvalidParameters(
                    "At least two PDFs are needed to merge".to_string(),
                ))
            }
        };

        let mut merged = Self::load(first)?;
        let catalog_id = merged.trailer.get(b"Root")?.as_reference()?;
        let root = merged
            .get_dictionary(catalog_id)?
            .get(b"Pages")?
            .as_reference()?;
        let mut pages = Self::flattened_pages(&merged, root)?;

        for part in rest {
            let mut doc = Self::load(part)?;
            doc.renumber_objects_with(merged.max_id + 1);
            pages.extend(Self::flattened_pages(&doc, root)?);
            merged.max_id = doc.max_id;
            merged.objects.extend(doc.objects);
        }

        let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
        let page_count = kids.len();
        for (id, page) in pages {
            merged.objects.insert(id, Object::Dictionary(page));
        }

        let root_node = merged.get_object_mut(root)?.as_dict_mut()?;
        root_node.set("Kids", kids);
        root_node.set("Count", page_count as i64);

        tracing::debug!(documents = parts.len(), page_count, "Merging PDFs");

        // Page tree nodes and catalogs of the appended documents are now unreachable
        merged.prune_objects();
        merged.renumber_objects();
        merged.compress();

        Ok(Bytes::from(Self::save(merged)?))
    }

    /// Every page of `doc` in reading order, re-parented under `parent` with
    /// inherited attributes copied onto the page itself
    fn flattened_pages(
        doc: &Document,
        parent: ObjectId,
    ) -> Result<Vec<(ObjectId, Dictionary)>, ProcessingError> {
        doc.get_pages()
            .into_values()
            .map(|id| Ok((id, Self::flatten_page(doc, id, parent)?)))
            .collect()
    }

    fn flatten_page(
        doc: &Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<Dictionary, ProcessingError> {
        let mut page = doc.get_dictionary(page_id)?.clone();

        for key in INHERITABLE_PAGE_KEYS {
            if page.has(key) {
                continue;
            }
            let mut node = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;
            while let Some(id) = node {
                depth += 1;
                if depth > 32 {
                    break;
                }
                let Ok(ancestor) = doc.get_dictionary(id) else {
                    break;
                };
                if let Ok(value) = ancestor.get(key) {
                    page.set(key, value.clone());
                    break;
                }
                node = ancestor.get(b"Parent").and_then(Object::as_reference).ok();
            }
        }

        page.set("Parent", parent);
        Ok(page)
    }

    /// Drop unreferenced objects and flate-compress uncompressed streams.
    ///
    /// Returns the input unchanged when rewriting would not make it smaller.
    pub fn compress(data: &[u8]) -> Result<Bytes, ProcessingError> {
        let mut doc = Self::load(data)?;
        doc.prune_objects();
        doc.delete_zero_length_streams();
        doc.renumber_objects();
        doc.compress();

        let rewritten = Self::save(doc)?;
        if rewritten.len() >= data.len() {
            tracing::debug!(
                original = data.len(),
                rewritten = rewritten.len(),
                "PDF did not shrink, keeping original"
            );
            return Ok(Bytes::copy_from_slice(data));
        }

        tracing::debug!(
            original = data.len(),
            compressed = rewritten.len(),
            "Compressed PDF"
        );
        Ok(Bytes::from(rewritten))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextPdfWriter;

    fn three_page_pdf() -> Bytes {
        let text = (0..150)
            .map(|i| format!("Paragraph {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        TextPdfWriter::render(None, &text).unwrap()
    }

    #[test]
    fn test_page_count() {
        assert_eq!(PdfTransformer::page_count(&three_page_pdf()).unwrap(), 3);
    }

    #[test]
    fn test_split_keeps_selected_pages() {
        let selection = PageSelection::parse("1,3").unwrap();
        let data = PdfTransformer::split(&three_page_pdf(), &selection).unwrap();
        assert_eq!(PdfTransformer::page_count(&data).unwrap(), 2);
    }

    #[test]
    fn test_split_rejects_out_of_range_pages() {
        let selection = PageSelection::parse("4").unwrap();
        assert!(matches!(
            PdfTransformer::split(&three_page_pdf(), &selection),
            Err(ProcessingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_merge_appends_pages_in_order() {
        let single = TextPdfWriter::render(Some("Cover"), "Chapter one").unwrap();
        let merged = PdfTransformer::merge(&[&three_page_pdf()[..], &single[..]]).unwrap();
        assert_eq!(PdfTransformer::page_count(&merged).unwrap(), 4);

        let text = PdfTransformer::extract_text(&merged).unwrap();
        let first = text.find("Paragraph 0").unwrap();
        let last = text.find("Chapter one").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_merge_needs_two_documents() {
        assert!(matches!(
            PdfTransformer::merge(&[&three_page_pdf()[..]]),
            Err(ProcessingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_merge_rejects_corrupt_part() {
        assert!(PdfTransformer::merge(&[&three_page_pdf()[..], b"not a pdf".as_slice()]).is_err());
    }

    #[test]
    fn test_compress_never_grows() {
        let original = three_page_pdf();
        let compressed = PdfTransformer::compress(&original).unwrap();
        assert!(compressed.len() <= original.len());
        assert_eq!(PdfTransformer::page_count(&compressed).unwrap(), 3);
    }

    #[test]
    fn test_extract_text_from_generated_pdf() {
        let data = TextPdfWriter::render(Some("Biology"), "Mitochondria make energy").unwrap();
        let text = PdfTransformer::extract_text(&data).unwrap();
        assert!(text.contains("Mitochondria"));
    }

    #[test]
    fn test_invalid_pdf_is_rejected() {
        assert!(PdfTransformer::page_count(b"%PDF-1.4 truncated").is_err());
        assert!(PdfTransformer::extract_text(b"not a pdf").is_err());
    }
}
