//! File attribute bitmask.
//!
//! Bit values match the Windows `FILE_ATTRIBUTE_*` constants so the verb
//! adapter can pass them through unchanged.

use std::fmt;

bitflags::bitflags! {
    /// Attribute bits stored on every node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        const READONLY = 0x0000_0001;
        const HIDDEN = 0x0000_0002;
        const SYSTEM = 0x0000_0004;
        const DIRECTORY = 0x0000_0010;
        const ARCHIVE = 0x0000_0020;
        /// Only meaningful on its own; cleared when combined with any other bit.
        const NORMAL = 0x0000_0080;
        const TEMPORARY = 0x0000_0100;
        const OFFLINE = 0x0000_1000;
        const NOT_CONTENT_INDEXED = 0x0000_2000;
    }
}

impl FileAttributes {
    /// Builds an attribute set from raw bits, keeping unknown bits.
    #[inline]
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Applies the NORMAL rule: NORMAL alongside any other flag is dropped.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.contains(Self::NORMAL) && self != Self::NORMAL {
            self - Self::NORMAL
        } else {
            self
        }
    }

    /// Attributes used for a freshly created file.
    ///
    /// NORMAL is removed and ARCHIVE added, so a plain create ends up ARCHIVE.
    #[must_use]
    pub fn for_new_file(self) -> Self {
        (self - Self::NORMAL - Self::DIRECTORY) | Self::ARCHIVE
    }

    #[inline]
    pub fn is_read_only(self) -> bool {
        self.contains(Self::READONLY)
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.contains(Self::HIDDEN)
    }

    #[inline]
    pub fn is_system(self) -> bool {
        self.contains(Self::SYSTEM)
    }

    #[inline]
    pub fn is_directory(self) -> bool {
        self.contains(Self::DIRECTORY)
    }
}

/// Compact `attrib`-style rendering, e.g. `DA`, `RH`, or `-` when empty.
impl fmt::Display for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [(FileAttributes, char); 7] = [
            (FileAttributes::DIRECTORY, 'D'),
            (FileAttributes::READONLY, 'R'),
            (FileAttributes::HIDDEN, 'H'),
            (FileAttributes::SYSTEM, 'S'),
            (FileAttributes::ARCHIVE, 'A'),
            (FileAttributes::TEMPORARY, 'T'),
            (FileAttributes::NORMAL, 'N'),
        ];
        let mut wrote = false;
        for (flag, letter) in LETTERS {
            if self.contains(flag) {
                write!(f, "{letter}")?;
                wrote = true;
            }
        }
        if !wrote {
            write!(f, "-")?;
        }
        Ok(())
    }
}
