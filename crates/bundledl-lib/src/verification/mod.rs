pub mod content_digest_hasher;
mod integrity;

pub use content_digest_hasher::{Checksum, ContentDigestVerifier, VerificationError};
pub use integrity::{IntegrityStatus, check_existing_file};
