//! The scratch-file allocator is treated as an opaque, external mutable
//! resource (section 5): something that hands out writable blobs for stream
//! payloads and guarantees they stay valid until the document closes. The
//! core never looks inside a `ScratchAllocator`'s implementation; a caller
//! embedding this crate in a memory-constrained environment can swap in an
//! allocator backed by a temp file instead of [`InMemoryScratch`].

use std::ops::Deref;
use std::sync::Arc;

/// A handle to a stream payload allocated by a [`ScratchAllocator`]. Cheap to
/// clone; clones share the same backing bytes.
#[derive(Debug, Clone)]
pub struct Blob(Arc<[u8]>);

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Blob(Arc::from(data))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

/// External collaborator: an allocator of writable blobs for stream
/// payloads. `Document::close` drops all blobs it has handed out and then
/// closes the allocator itself (section 5).
pub trait ScratchAllocator {
    fn alloc(&mut self, data: Vec<u8>) -> Blob;
}

/// Default allocator: every blob just lives on the Rust heap via `Arc`.
/// Adequate for documents that fit comfortably in memory; large-document
/// deployments provide their own [`ScratchAllocator`] backed by a temp file.
#[derive(Debug, Default)]
pub struct InMemoryScratch;

impl ScratchAllocator for InMemoryScratch {
    fn alloc(&mut self, data: Vec<u8>) -> Blob {
        Blob::new(data)
    }
}
