//! ELF Symbol Loader (§4.2): for each [`Module`], opens its file read-only,
//! parses it as ELF via [`crate::elf`], and inserts its function symbols
//! into a [`SymbolStore`] with runtime-resolved addresses.

use std::sync::Arc;

use crate::elf::{
    self,
    types::{SectionType, SymbolBind, SymbolType, STB_GLOBAL, STB_WEAK, STT_FUNC},
};
use crate::error::EngineError;
use crate::module_map::Module;
use crate::symbols::{Binding, SymbolStore, SymbolVariant};

/// Loads every module's symbols into `store`, in module order. A module
/// that fails to open or parse aborts the whole load (§4.2: "Both are
/// fatal for the engine; other modules are not attempted.").
pub fn load_modules(store: &mut SymbolStore, modules: &[Module]) -> Result<(), EngineError> {
    for module in modules {
        load_module(store, module)?;
    }
    Ok(())
}

fn load_module(store: &mut SymbolStore, module: &Module) -> Result<(), EngineError> {
    let file = elf::File::open_path(&module.path).map_err(|e| to_engine_error(module, e))?;

    // Shared libraries are position-independent; their symbol values are
    // section-relative, so the module's load base is added. The main
    // module's symbol values are already absolute.
    let offset = if module.is_main { 0 } else { module.load_base };
    let module_path: Arc<std::path::Path> = Arc::from(module.path.as_path());

    let mut saw_symbol_table = false;
    for section in &file.sections {
        let wanted = match section.shtype {
            // Stripped shared libraries often lack .symtab; only the main
            // module's static table is trusted.
            SectionType::Symtab => module.is_main,
            SectionType::Dynsym => true,
            _ => false,
        };
        if !wanted {
            continue;
        }
        saw_symbol_table = true;

        let symbols = file
            .get_symbols(section)
            .map_err(|e| to_engine_error(module, e))?;

        for symbol in symbols {
            if symbol.value == 0 {
                continue;
            }
            if symbol.symtype != STT_FUNC {
                continue;
            }
            let Some(binding) = classify_binding(symbol.bind) else {
                continue;
            };

            let address = symbol.value + offset;
            let idx = store.insert(&symbol.name);
            store.append_variant(
                idx,
                SymbolVariant {
                    address,
                    binding,
                    module_path: Arc::clone(&module_path),
                },
            );
        }
    }

    if !saw_symbol_table {
        return Err(EngineError::ElfFormat {
            path: module.path.clone(),
            reason: "no usable symbol table".to_string(),
        });
    }
    Ok(())
}

/// Global or weak only; local bindings (and anything else) are never
/// retained (§4.2). Weak bindings are kept only when the `weak-symbols`
/// feature is enabled — otherwise they're skipped entirely, as if the
/// loader never saw them.
fn classify_binding(bind: SymbolBind) -> Option<Binding> {
    if bind == STB_GLOBAL {
        Some(Binding::Strong)
    } else if bind == STB_WEAK {
        if cfg!(feature = "weak-symbols") {
            Some(Binding::Weak)
        } else {
            None
        }
    } else {
        None
    }
}

fn to_engine_error(module: &Module, err: elf::ParseError) -> EngineError {
    match err {
        elf::ParseError::Io(source) => EngineError::ElfOpen {
            path: module.path.clone(),
            source,
        },
        other => EngineError::ElfFormat {
            path: module.path.clone(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `classify_binding` and `to_engine_error` are exercised directly since
    // they don't require a real ELF image; full load_module coverage lives
    // in `tests/loader.rs` against a hand-built ELF64 fixture.

    #[test]
    fn classifies_global_as_strong() {
        assert_eq!(classify_binding(STB_GLOBAL), Some(Binding::Strong));
    }

    #[test]
    fn classifies_local_as_none() {
        use crate::elf::types::STB_LOCAL;
        assert_eq!(classify_binding(STB_LOCAL), None);
    }

    #[cfg(not(feature = "weak-symbols"))]
    #[test]
    fn weak_symbols_skipped_without_feature() {
        assert_eq!(classify_binding(STB_WEAK), None);
    }

    #[cfg(feature = "weak-symbols")]
    #[test]
    fn weak_symbols_kept_with_feature() {
        assert_eq!(classify_binding(STB_WEAK), Some(Binding::Weak));
    }

    #[test]
    fn elf_open_io_error_maps_to_elf_open() {
        let module = Module {
            path: "/nonexistent/path".into(),
            load_base: 0,
            is_main: true,
        };
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        match to_engine_error(&module, elf::ParseError::Io(io_err)) {
            EngineError::ElfOpen { .. } => {}
            other => panic!("expected ElfOpen, got {other:?}"),
        }
    }

    #[test]
    fn invalid_magic_maps_to_elf_format() {
        let module = Module {
            path: "/some/path".into(),
            load_base: 0,
            is_main: true,
        };
        match to_engine_error(&module, elf::ParseError::InvalidMagic) {
            EngineError::ElfFormat { .. } => {}
            other => panic!("expected ElfFormat, got {other:?}"),
        }
    }
}
