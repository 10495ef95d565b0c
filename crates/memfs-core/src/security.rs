//! Opaque security descriptor storage.
//!
//! The store never interprets descriptors. It keeps whatever bytes the
//! adapter hands it and returns them unchanged.

use std::fmt;

/// DACL granting full access to authenticated users, inherited by children.
const DEFAULT_DACL: &str = "D:PAI(A;OICI;FA;;;AU)";

/// An opaque, self-relative security descriptor.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SecurityDescriptor(Vec<u8>);

impl SecurityDescriptor {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Default descriptor for the root, owned by the hosting process.
    ///
    /// Rendered in SDDL form: owner and group SIDs of the current process
    /// followed by a DACL that lets authenticated users do anything.
    pub fn for_current_process() -> Self {
        let (owner, group) = process_sids();
        Self(format!("O:{owner}G:{group}{DEFAULT_DACL}").into_bytes())
    }
}

impl fmt::Debug for SecurityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => f.debug_tuple("SecurityDescriptor").field(&text).finish(),
            Err(_) => f
                .debug_tuple("SecurityDescriptor")
                .field(&format_args!("{} bytes", self.0.len()))
                .finish(),
        }
    }
}

/// Unix uid/gid mapped to the `S-1-22-1-*` / `S-1-22-2-*` SID ranges.
#[cfg(unix)]
fn process_sids() -> (String, String) {
    let uid = nix::unistd::getuid().as_raw();
    let gid = nix::unistd::getgid().as_raw();
    (format!("S-1-22-1-{uid}"), format!("S-1-22-2-{gid}"))
}

/// Without a Unix identity fall back to BUILTIN\Administrators and SYSTEM.
#[cfg(not(unix))]
fn process_sids() -> (String, String) {
    ("BA".to_string(), "SY".to_string())
}
