//! The architecture → [`Backend`] dispatch table spec.md §9 calls for, in
//! place of the source compiler's repeated if/else chains on a global
//! architecture flag.

use crate::architecture::Architecture;
use crate::backend::Backend;
use crate::backends::aarch64::Aarch64Backend;
use crate::backends::amd64::Amd64Backend;
use crate::backends::arm::Armv7LBackend;
use crate::backends::knight::KnightBackend;
use crate::backends::riscv::RiscvBackend;
use crate::backends::x86::X86Backend;

/// Returns the emission-template backend for `arch`. Every variant's
/// backend struct is stateless, so this is a cheap owned allocation rather
/// than a lookup into a static table of trait objects.
pub fn backend(arch: Architecture) -> Box<dyn Backend> {
    match arch {
        Architecture::KnightPosix => Box::new(KnightBackend { native: false }),
        Architecture::KnightNative => Box::new(KnightBackend { native: true }),
        Architecture::X86 => Box::new(X86Backend),
        Architecture::Amd64 => Box::new(Amd64Backend),
        Architecture::Armv7L => Box::new(Armv7LBackend),
        Architecture::Aarch64 => Box::new(Aarch64Backend),
        Architecture::Riscv32 => Box::new(RiscvBackend { is_64: false }),
        Architecture::Riscv64 => Box::new(RiscvBackend { is_64: true }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_architecture_has_a_backend_with_matching_word_size() {
        for arch in Architecture::ALL {
            let b = backend(arch);
            assert_eq!(b.architecture(), arch);
            assert_eq!(b.word_size(), arch.word_size());
        }
    }
}
