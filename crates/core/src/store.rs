use crate::models::{DocumentFingerprint, DocumentSummary, PageMap};
use std::collections::BTreeSet;
use crate::retrieval::RetrievalSet;
use chrono::Utc;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything kept for one uploaded document.
#[derive(Debug)]
pub struct StoredDocument {
    pub fingerprint: DocumentFingerprint,
    pub text: String,
    pub page_map: PageMap,
    pub retrieval: RetrievalSet,
}

impl StoredDocument {
    pub fn summary(&self) -> DocumentSummary {
        let pages: BTreeSet<u32> = self.page_map.values().copied().collect();

        DocumentSummary {
            doc_id: self.fingerprint.document_id.clone(),
            file_name: self.fingerprint.file_name.clone(),
            checksum: self.fingerprint.checksum.clone(),
            uploaded_at: self.fingerprint.uploaded_at,
            paragraphs: self.page_map.len(),
            pages: pages.len(),
            chunks: self.retrieval.chunks().len(),
        }
    }
}

/// A fully processed upload waiting for its id.
#[derive(Debug)]
pub struct NewDocument {
    pub file_name: String,
    pub checksum: String,
    pub text: String,
    pub page_map: PageMap,
    pub retrieval: RetrievalSet,
}

/// In-memory document store. Id assignment and insertion happen under one
/// lock, so concurrent uploads never share an id and a failed upload never
/// consumes one.
#[derive(Debug)]
pub struct DocumentRepository {
    state: Mutex<RepositoryState>,
}

#[derive(Debug)]
struct RepositoryState {
    next_id: u64,
    documents: HashMap<String, Arc<StoredDocument>>,
}

impl Default for DocumentRepository {
    fn default() -> Self {
        Self {
            state: Mutex::new(RepositoryState {
                next_id: 1,
                documents: HashMap::new(),
            }),
        }
    }
}

impl DocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: NewDocument) -> Arc<StoredDocument> {
        let mut state = self.state.lock();
        let document_id = format!("doc_{}", state.next_id);
        state.next_id += 1;

        let stored = Arc::new(StoredDocument {
            fingerprint: DocumentFingerprint {
                document_id: document_id.clone(),
                file_name: document.file_name,
                checksum: document.checksum,
                uploaded_at: Utc::now(),
            },
            text: document.text,
            page_map: document.page_map,
            retrieval: document.retrieval,
        });

        state.documents.insert(document_id, Arc::clone(&stored));
        stored
    }

    pub fn get(&self, document_id: &str) -> Option<Arc<StoredDocument>> {
        self.state.lock().documents.get(document_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
