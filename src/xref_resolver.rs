//! Accumulates successive xref sections (tables and streams) and folds them
//! into a single merged xref map and trailer (section 4.4, component C4).
//! Sections are appended in discovery order: the section `startxref` names
//! first, then each `/Prev` target. "Newest" therefore always means
//! "earliest in `self.sections`".

use std::collections::BTreeMap;

use crate::object::{Dictionary, ObjectKey};
use crate::xref::{XrefEntry, XrefKind, XrefSection};

#[derive(Debug, Default)]
pub struct XrefResolver {
    sections: Vec<XrefSection>,
}

impl XrefResolver {
    pub fn new() -> Self {
        XrefResolver { sections: Vec::new() }
    }

    /// Begin a new section at `offset` of the given kind; it becomes the
    /// current section for subsequent `set_trailer`/`set_xref` calls.
    pub fn next_xref_obj(&mut self, offset: u64, kind: XrefKind) {
        self.sections.push(XrefSection::new(offset, kind));
    }

    fn current_mut(&mut self) -> &mut XrefSection {
        self.sections.last_mut().expect("next_xref_obj must be called before set_trailer/set_xref")
    }

    pub fn set_trailer(&mut self, trailer: Dictionary) {
        self.current_mut().trailer = trailer;
    }

    pub fn set_xref(&mut self, key: ObjectKey, entry: XrefEntry) {
        self.current_mut().entries.insert(key, entry);
    }

    /// Drop a previously set entry (validation mode: offset mismatch that
    /// must be dropped rather than patched).
    pub fn drop_xref(&mut self, key: &ObjectKey) {
        self.current_mut().entries.remove(key);
    }

    pub fn sections(&self) -> &[XrefSection] {
        &self.sections
    }

    /// Fold oldest to newest: since sections are stored newest-first, a
    /// reverse iteration means later insertions (older sections) get
    /// overwritten by earlier ones (newer sections) — i.e. newest wins.
    pub fn get_merged_xref(&self) -> BTreeMap<ObjectKey, XrefEntry> {
        let mut merged = BTreeMap::new();
        for section in self.sections.iter().rev() {
            for (&key, &entry) in &section.entries {
                merged.insert(key, entry);
            }
        }
        merged
    }

    /// Latest-wins-unless-missing: keys present in a newer section's
    /// trailer take priority; a key absent there falls back to older
    /// sections.
    pub fn get_merged_trailer(&self) -> Dictionary {
        let mut merged = Dictionary::new();
        for section in self.sections.iter().rev() {
            for (key, value) in section.trailer.iter() {
                merged.set(key.clone(), value.clone());
            }
        }
        merged
    }

    /// The xref type of the section `startxref` names (the first one
    /// pushed).
    pub fn start_xref_kind(&self) -> Option<XrefKind> {
        self.sections.first().map(|s| s.kind)
    }

    /// Oldest trailer in the chain (the last `/Prev` target reached).
    pub fn first_trailer(&self) -> Option<&Dictionary> {
        self.sections.last().map(|s| &s.trailer)
    }

    /// Newest trailer in the chain (the section `startxref` names).
    pub fn last_trailer(&self) -> Option<&Dictionary> {
        self.sections.first().map(|s| &s.trailer)
    }
}
