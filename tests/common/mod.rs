//! Shared fixture helpers for the integration tests: builds a minimal,
//! well-formed ELF64 little-endian image in memory (file header, one
//! symbol-table section, its linked string table, and `.shstrtab`) so the
//! ELF Symbol Loader can be exercised against real bytes without a
//! compiled companion binary on disk.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

pub const STT_FUNC: u8 = 2;
pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

/// One `Elf64_Sym` entry to bake into a fixture image.
pub struct FixtureSymbol {
    pub name: &'static str,
    pub value: u64,
    pub bind: u8,
    pub symtype: u8,
}

/// A `STT_FUNC` symbol with the given binding, for the common case.
pub fn func(name: &'static str, value: u64, bind: u8) -> FixtureSymbol {
    FixtureSymbol {
        name,
        value,
        bind,
        symtype: STT_FUNC,
    }
}

/// An object (non-function) symbol, for exercising the loader's
/// type filter.
pub fn object(name: &'static str, value: u64, bind: u8) -> FixtureSymbol {
    FixtureSymbol {
        name,
        value,
        bind,
        symtype: 1, // STT_OBJECT
    }
}

/// Builds a minimal ELF64-LE image with a single symbol-table section
/// (`.dynsym` when `dynsym` is true, `.symtab` otherwise) populated with
/// `symbols`, plus the string tables it needs to resolve their names.
pub fn build_elf(symbols: &[FixtureSymbol], dynsym: bool) -> Vec<u8> {
    let symtab_name = if dynsym { ".dynsym" } else { ".symtab" };
    let shstrtab_strings = ["", symtab_name, ".strtab", ".shstrtab"];
    let mut shstrtab_bytes = Vec::new();
    let mut shstrtab_offsets = Vec::with_capacity(shstrtab_strings.len());
    for s in shstrtab_strings {
        shstrtab_offsets.push(shstrtab_bytes.len() as u32);
        shstrtab_bytes.extend_from_slice(s.as_bytes());
        shstrtab_bytes.push(0);
    }

    let mut strtab_bytes = vec![0u8];
    let mut name_offsets = Vec::with_capacity(symbols.len());
    for sym in symbols {
        name_offsets.push(strtab_bytes.len() as u32);
        strtab_bytes.extend_from_slice(sym.name.as_bytes());
        strtab_bytes.push(0);
    }

    let mut symtab_bytes = Vec::new();
    // Index 0 is always the reserved null symbol.
    symtab_bytes.extend_from_slice(&0u32.to_le_bytes());
    symtab_bytes.push(0);
    symtab_bytes.push(0);
    symtab_bytes.extend_from_slice(&0u16.to_le_bytes());
    symtab_bytes.extend_from_slice(&0u64.to_le_bytes());
    symtab_bytes.extend_from_slice(&0u64.to_le_bytes());
    for (sym, name_off) in symbols.iter().zip(&name_offsets) {
        symtab_bytes.extend_from_slice(&name_off.to_le_bytes());
        symtab_bytes.push((sym.bind << 4) | (sym.symtype & 0xf));
        symtab_bytes.push(0);
        symtab_bytes.extend_from_slice(&1u16.to_le_bytes());
        symtab_bytes.extend_from_slice(&sym.value.to_le_bytes());
        symtab_bytes.extend_from_slice(&0u64.to_le_bytes());
    }

    const EHDR_SIZE: u64 = 64;
    const SHDR_SIZE: u64 = 64;
    let symtab_off = EHDR_SIZE;
    let strtab_off = symtab_off + symtab_bytes.len() as u64;
    let shstrtab_off = strtab_off + strtab_bytes.len() as u64;
    let shoff = shstrtab_off + shstrtab_bytes.len() as u64;
    let _ = SHDR_SIZE;

    let mut out = Vec::new();
    out.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
    out.push(2); // ELFCLASS64
    out.push(1); // ELFDATA2LSB
    out.push(1); // EI_VERSION
    out.push(0); // EI_OSABI
    out.push(0); // EI_ABIVERSION
    out.extend_from_slice(&[0u8; 7]);
    out.extend_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
    out.extend_from_slice(&0x3eu16.to_le_bytes()); // e_machine, unused by the reader
    out.extend_from_slice(&1u32.to_le_bytes()); // e_version
    out.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    out.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
    out.extend_from_slice(&shoff.to_le_bytes()); // e_shoff
    out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    out.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes()); // e_ehsize
    out.extend_from_slice(&0u16.to_le_bytes()); // e_phentsize
    out.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
    out.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
    out.extend_from_slice(&4u16.to_le_bytes()); // e_shnum
    out.extend_from_slice(&3u16.to_le_bytes()); // e_shstrndx

    debug_assert_eq!(out.len() as u64, EHDR_SIZE);
    out.extend_from_slice(&symtab_bytes);
    out.extend_from_slice(&strtab_bytes);
    out.extend_from_slice(&shstrtab_bytes);
    debug_assert_eq!(out.len() as u64, shoff);

    push_section_header(&mut out, shstrtab_offsets[0], 0, 0, 0, 0, 0); // NULL
    let symtab_type = if dynsym { 11u32 } else { 2u32 };
    push_section_header(
        &mut out,
        shstrtab_offsets[1],
        symtab_type,
        symtab_off,
        symtab_bytes.len() as u64,
        2,
        24,
    );
    push_section_header(
        &mut out,
        shstrtab_offsets[2],
        3,
        strtab_off,
        strtab_bytes.len() as u64,
        0,
        0,
    );
    push_section_header(
        &mut out,
        shstrtab_offsets[3],
        3,
        shstrtab_off,
        shstrtab_bytes.len() as u64,
        0,
        0,
    );

    out
}

/// Builds a fixture image with no symbol-table section at all — only the
/// section-name string table — to exercise the "no usable symbol table"
/// error path.
pub fn build_elf_without_symbol_table() -> Vec<u8> {
    let shstrtab_strings = ["", ".shstrtab"];
    let mut shstrtab_bytes = Vec::new();
    let mut shstrtab_offsets = Vec::with_capacity(shstrtab_strings.len());
    for s in shstrtab_strings {
        shstrtab_offsets.push(shstrtab_bytes.len() as u32);
        shstrtab_bytes.extend_from_slice(s.as_bytes());
        shstrtab_bytes.push(0);
    }

    const EHDR_SIZE: u64 = 64;
    let shstrtab_off = EHDR_SIZE;
    let shoff = shstrtab_off + shstrtab_bytes.len() as u64;

    let mut out = Vec::new();
    out.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
    out.push(2);
    out.push(1);
    out.push(1);
    out.push(0);
    out.push(0);
    out.extend_from_slice(&[0u8; 7]);
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&0x3eu16.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&shoff.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&64u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // e_shnum: NULL + shstrtab
    out.extend_from_slice(&1u16.to_le_bytes()); // e_shstrndx

    out.extend_from_slice(&shstrtab_bytes);
    debug_assert_eq!(out.len() as u64, shoff);

    push_section_header(&mut out, shstrtab_offsets[0], 0, 0, 0, 0, 0);
    push_section_header(
        &mut out,
        shstrtab_offsets[1],
        3,
        shstrtab_off,
        shstrtab_bytes.len() as u64,
        0,
        0,
    );

    out
}

#[allow(clippy::too_many_arguments)]
fn push_section_header(
    out: &mut Vec<u8>,
    name_off: u32,
    shtype: u32,
    offset: u64,
    size: u64,
    link: u32,
    entsize: u64,
) {
    out.extend_from_slice(&name_off.to_le_bytes());
    out.extend_from_slice(&shtype.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes()); // sh_flags
    out.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&link.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // sh_info
    out.extend_from_slice(&8u64.to_le_bytes()); // sh_addralign
    out.extend_from_slice(&entsize.to_le_bytes());
}

static FIXTURE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Writes `bytes` to a fresh file under the system temp directory and
/// returns its path; the caller owns cleanup (the OS reclaims leftovers
/// from a crashed test run on its own schedule, same as any other temp
/// file).
pub fn write_temp_elf(bytes: &[u8]) -> PathBuf {
    let n = FIXTURE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "symtest-fixture-{}-{n}.elf",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).expect("create temp fixture file");
    file.write_all(bytes).expect("write temp fixture bytes");
    path
}
