use num_enum::TryFromPrimitive;
use std::fmt;
use std::fmt::Display;

/// Length of ELF file header platform-independent identification fields.
pub const EI_NIDENT: usize = 16;
/// ELF magic number byte 1.
pub const ELFMAG0: u8 = 0x7f;
/// ELF magic number byte 2.
pub const ELFMAG1: u8 = 0x45;
/// ELF magic number byte 3.
pub const ELFMAG2: u8 = 0x4c;
/// ELF magic number byte 4.
pub const ELFMAG3: u8 = 0x46;
/// Location of the ELF class field in the ident array.
pub const EI_CLASS: usize = 4;
/// Location of the data-encoding field in the ident array.
pub const EI_DATA: usize = 5;
/// Location of the OS ABI field in the ident array.
pub const EI_OSABI: usize = 7;
/// Location of the ABI version field in the ident array.
pub const EI_ABIVERSION: usize = 8;

/// Represents the ELF file class (32-bit vs 64-bit).
///
/// Only `Format64` is accepted by the loader (see §6: "ELF64 little-endian
/// is assumed"); `Format32` is recognized so a 32-bit image is reported as
/// an `ElfFormat` error rather than silently misparsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ElfClass {
    /// Named ELFCLASS32 in C code.
    Format32 = 1,
    /// Named ELFCLASS64 in C code.
    Format64 = 2,
}

/// The endianness encoding of an ELF file.
///
/// Only `Lsb` is accepted by the loader; `Msb` images are rejected.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ElfEndianness {
    /// Named ELFDATA2LSB in C code.
    Lsb = 1,
    /// Named ELFDATA2MSB in C code.
    Msb = 2,
}

/// Represents the ELF file OS ABI.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct OsAbi(pub u8);

impl fmt::Debug for OsAbi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for OsAbi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Represents the ELF file type (object, executable, shared lib, core).
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, TryFromPrimitive)]
#[repr(u16)]
pub enum ElfFileType {
    /// Named ET_NONE in C code.
    None = 0,
    /// Named ET_REL in C code.
    RelocatableObject = 1,
    /// Named ET_EXEC in C code.
    Executable = 2,
    /// Named ET_DYN in C code. Shared libraries and PIE executables.
    SharedLibrary = 3,
    /// Named ET_CORE in C code.
    Core = 4,
}

/// Encapsulates the contents of the ELF file header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub class: ElfClass,
    pub endianness: ElfEndianness,
    pub osabi: OsAbi,
    pub abiversion: u8,
    pub elftype: ElfFileType,
    pub entry: u64,
    pub shoff: u64,
    pub shnum: u16,
    pub shstrndx: u16,
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "File Header for {:?} {} Elf {} osabi {}",
            self.class, self.endianness, self.elftype, self.osabi
        )
    }
}

/// An ELF section type. This is the `shtype` field of [SectionHeader].
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum SectionType {
    /// Named SHT_NULL in C code.
    Null = 0,
    /// Named SHT_PROGBITS in C code.
    Progbits = 1,
    /// Section data contains a symbol table. Named SHT_SYMTAB in C code.
    Symtab = 2,
    /// Section data contains a string table. Named SHT_STRTAB in C code.
    Strtab = 3,
    /// Named SHT_NOBITS in C code. Occupies no space in the file.
    Nobits = 8,
    /// Section data contains a minimal set of dynamic linking symbols.
    /// Named SHT_DYNSYM in C code.
    Dynsym = 11,
}

/// Encapsulates the contents of an ELF section header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: String,
    pub shtype: SectionType,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub entsize: u64,
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Section Header: Name: {} Type: {} Addr: {:#010x} Offset: {:#06x} Size: {:#06x} Link: {}",
            self.name, self.shtype, self.addr, self.offset, self.size, self.link
        )
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SymbolType(pub u8);
/// Unspecified symbol type.
pub const STT_NOTYPE: SymbolType = SymbolType(0);
/// Data object symbol.
pub const STT_OBJECT: SymbolType = SymbolType(1);
/// Code object symbol — the only type the loader keeps.
pub const STT_FUNC: SymbolType = SymbolType(2);

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            STT_NOTYPE => "unspecified",
            STT_OBJECT => "data object",
            STT_FUNC => "code object",
            _ => "other",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SymbolBind(pub u8);
/// Local symbol — never retained by the loader.
pub const STB_LOCAL: SymbolBind = SymbolBind(0);
/// Global symbol — the "strong" binding.
pub const STB_GLOBAL: SymbolBind = SymbolBind(1);
/// Weak symbol — overridable by a strong symbol of the same name.
pub const STB_WEAK: SymbolBind = SymbolBind(2);

impl fmt::Display for SymbolBind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            STB_LOCAL => "local",
            STB_GLOBAL => "global",
            STB_WEAK => "weak",
            _ => "other",
        };
        write!(f, "{}", s)
    }
}

/// One entry of an ELF symbol table (`Elf64_Sym`), already resolved to an
/// owned name via the section's linked string table.
#[derive(Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    pub shndx: u16,
    pub symtype: SymbolType,
    pub bind: SymbolBind,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Symbol: Value: {:#010x} Type: {} Bind: {} Section: {} Name: {}",
            self.value, self.symtype, self.bind, self.shndx, self.name
        )
    }
}
