//! Decryption is explicitly out of scope (section 7, Non-goals): this crate
//! never implements RC4/AES/password algorithms. What it does carry is the
//! `/P` permission bitflags (useful to callers inspecting an encrypted
//! document's declared permissions even without decrypting it) and the
//! [`SecurityHandler`] hook a host application plugs a real implementation
//! into, per the external-collaborator list in section 6.

use bitflags::bitflags;

use crate::error::Result;
use crate::object::ObjectKey;

bitflags! {
    /// Bits of the `/P` integer in an `/Encrypt` dictionary (ISO 32000-2,
    /// table 22). Ported from the teacher's `encryption.rs`, trimmed of the
    /// password-hashing machinery that produced them.
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct Permissions: u64 {
        /// (Revision 2) Print the document. (Revision 3+) Print the document,
        /// possibly not at the highest quality level unless
        /// [`Permissions::PRINTABLE_IN_HIGH_QUALITY`] is also set.
        const PRINTABLE = 1 << 2;

        /// Modify the contents of the document by operations other than those
        /// controlled by [`Permissions::ANNOTABLE`], [`Permissions::FILLABLE`]
        /// and [`Permissions::ASSEMBLABLE`].
        const MODIFIABLE = 1 << 3;

        /// Copy or otherwise extract text and graphics from the document.
        const COPYABLE = 1 << 4;

        /// Add or modify text annotations and fill in interactive form fields.
        const ANNOTABLE = 1 << 5;

        /// Fill in existing interactive form fields, even if
        /// [`Permissions::ANNOTABLE`] is clear.
        const FILLABLE = 1 << 8;

        /// Extract text and graphics for the purpose of accessibility.
        const COPYABLE_FOR_ACCESSIBILITY = 1 << 9;

        /// (Revision 3+) Assemble the document (insert, rotate or delete
        /// pages, create outline items or thumbnails).
        const ASSEMBLABLE = 1 << 10;

        /// (Revision 3+) Print at full fidelity rather than a degraded
        /// low-level representation.
        const PRINTABLE_IN_HIGH_QUALITY = 1 << 11;
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}

/// External collaborator (section 6): decrypts strings and stream payloads.
/// The core calls this during [`crate::object_store::ObjectStore::resolve`]
/// and stream-body extraction; it never inspects the algorithm itself.
pub trait SecurityHandler {
    /// Prepare the handler for a specific document (derive the file
    /// encryption key from its `/Encrypt` dictionary and `/ID`).
    fn prepare_for_decryption(&mut self, encrypt_dict: &crate::object::Dictionary, file_id: &[u8]) -> Result<()>;

    /// Decrypt a string value belonging to the object identified by `key`.
    fn decrypt(&self, key: ObjectKey, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a stream payload belonging to the object identified by `key`.
    fn decrypt_stream(&self, key: ObjectKey, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// The permissions this handler was configured with, if known.
    fn current_access_permission(&self) -> Option<Permissions>;
}

/// No-op handler for unencrypted documents, or callers that intentionally
/// want raw (still-encrypted) bytes back.
#[derive(Debug, Default)]
pub struct IdentitySecurityHandler;

impl SecurityHandler for IdentitySecurityHandler {
    fn prepare_for_decryption(&mut self, _encrypt_dict: &crate::object::Dictionary, _file_id: &[u8]) -> Result<()> {
        Ok(())
    }

    fn decrypt(&self, _key: ObjectKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }

    fn decrypt_stream(&self, _key: ObjectKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }

    fn current_access_permission(&self) -> Option<Permissions> {
        None
    }
}
