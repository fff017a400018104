//! Constitution loader.
//!
//! The constitution is plain Markdown. Its canonical form is LF line
//! endings with each line right-trimmed; the SHA-256 of the canonical form
//! is the hash every GC view and auditor pack commits to. The accepted
//! set is compiled in.

use std::sync::OnceLock;

mod error;

pub use error::ConstitutionError;

/// Result alias for constitution operations.
pub type Result<T> = std::result::Result<T, ConstitutionError>;

/// The v1 rulebook, embedded verbatim.
pub const CONSTITUTION_V1_TEXT: &str = include_str!("../constitution/CONSTITUTION_v1.md");

/// Version tag of the v1 rulebook.
pub const CONSTITUTION_V1_VERSION: &str = "v1";

/// File name the auditor pack stores the rulebook under.
pub const CONSTITUTION_FILE_NAME: &str = "CONSTITUTION_v1.md";

/// An accepted constitution: version tag plus canonical hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedConstitution {
    pub version: &'static str,
    pub hash: String,
    pub text: &'static str,
}

/// Canonicalize constitution text: CRLF to LF, right-trim each line.
pub fn canonicalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.replace("\r\n", "\n").split('\n') {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    // split() yields one trailing empty segment for text ending in '\n';
    // drop the extra newline it produced.
    if text.ends_with('\n') || text.is_empty() {
        out.pop();
    }
    out
}

/// Hash of the canonical form of constitution text.
pub fn constitution_hash(text: &str) -> String {
    pact_crypto::sha256_hex(canonicalize_text(text))
}

/// The compiled-in accepted set.
pub fn accepted() -> &'static [AcceptedConstitution] {
    static ACCEPTED: OnceLock<Vec<AcceptedConstitution>> = OnceLock::new();
    ACCEPTED.get_or_init(|| {
        vec![AcceptedConstitution {
            version: CONSTITUTION_V1_VERSION,
            hash: constitution_hash(CONSTITUTION_V1_TEXT),
            text: CONSTITUTION_V1_TEXT,
        }]
    })
}

/// Look up an accepted constitution by canonical hash.
pub fn lookup(hash: &str) -> Option<&'static AcceptedConstitution> {
    accepted().iter().find(|c| c.hash == hash)
}

/// Require that a hash is accepted.
pub fn require_accepted(hash: &str) -> Result<&'static AcceptedConstitution> {
    lookup(hash).ok_or_else(|| ConstitutionError::UnknownHash {
        hash: hash.to_string(),
    })
}

/// The default (latest) accepted constitution.
pub fn default_constitution() -> &'static AcceptedConstitution {
    &accepted()[0]
}
