//! The eight target variants and the stack-growth direction each one uses
//! for local-variable frame offsets (spec.md §4.4).

use std::fmt;

/// One of the eight code-generation targets. Matches the closed set named
/// in spec.md §9's Design Notes verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    KnightPosix,
    KnightNative,
    X86,
    Amd64,
    Armv7L,
    Aarch64,
    Riscv32,
    Riscv64,
}

impl Architecture {
    pub const ALL: [Architecture; 8] = [
        Architecture::KnightPosix,
        Architecture::KnightNative,
        Architecture::X86,
        Architecture::Amd64,
        Architecture::Armv7L,
        Architecture::Aarch64,
        Architecture::Riscv32,
        Architecture::Riscv64,
    ];

    /// Parses the `--arch` flag's accepted spellings.
    pub fn parse(name: &str) -> Option<Architecture> {
        Some(match name {
            "knight-posix" => Architecture::KnightPosix,
            "knight-native" => Architecture::KnightNative,
            "x86" => Architecture::X86,
            "amd64" => Architecture::Amd64,
            "armv7l" => Architecture::Armv7L,
            "aarch64" => Architecture::Aarch64,
            "riscv32" => Architecture::Riscv32,
            "riscv64" => Architecture::Riscv64,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Architecture::KnightPosix => "knight-posix",
            Architecture::KnightNative => "knight-native",
            Architecture::X86 => "x86",
            Architecture::Amd64 => "amd64",
            Architecture::Armv7L => "armv7l",
            Architecture::Aarch64 => "aarch64",
            Architecture::Riscv32 => "riscv32",
            Architecture::Riscv64 => "riscv64",
        }
    }

    /// Pointer/word width in bytes.
    pub fn word_size(self) -> u32 {
        match self {
            Architecture::KnightPosix
            | Architecture::KnightNative
            | Architecture::X86
            | Architecture::Armv7L
            | Architecture::Riscv32 => 4,
            Architecture::Amd64 | Architecture::Aarch64 | Architecture::Riscv64 => 8,
        }
    }

    pub fn is_64bit(self) -> bool {
        self.word_size() == 8
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which way the stack grows, and therefore which way local-frame depths
/// accumulate (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    Upward,
    Downward,
}
