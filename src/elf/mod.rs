//! A small ELF64 little-endian reader, generalized from a pure-Rust ELF
//! parsing crate down to what the Symbol Loader needs: the file header
//! (for sanity checks), section headers, and symbol-table sections.
//!
//! Unlike a general-purpose ELF library this does not parse program
//! headers, relocations, or non-symbol-table sections — the discovery
//! engine never reads them, and carrying that parsing here would be dead
//! weight against the spec this crate implements.

pub mod types;
pub mod utils;

use std::cell::RefCell;
use std::convert::TryFrom;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use types::{
    ElfClass, ElfEndianness, FileHeader, OsAbi, SectionHeader, SectionType, Symbol, SymbolBind,
    SymbolType,
};

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    InvalidMagic,
    Unsupported(&'static str),
    InvalidFormat(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "I/O error: {e}"),
            ParseError::InvalidMagic => write!(f, "not an ELF file (bad magic)"),
            ParseError::Unsupported(what) => write!(f, "unsupported ELF variant: {what}"),
            ParseError::InvalidFormat(msg) => write!(f, "malformed ELF file: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// A `Read + Seek` source a parsed [`File`] keeps open so that section
/// data (symbol tables, string tables) can be fetched lazily.
trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// An ELF64 little-endian file, parsed down to its section headers.
/// Section *data* is read lazily by [`File::get_symbols`] rather than
/// slurped up front, since most sections in a typical test binary are
/// debug/relocation sections the loader never touches.
pub struct File {
    pub header: FileHeader,
    pub sections: Vec<SectionHeader>,
    reader: RefCell<Box<dyn ReadSeek>>,
}

impl File {
    pub fn open_path<T: AsRef<Path>>(path: T) -> Result<File, ParseError> {
        let io_file = fs::File::open(path.as_ref())?;
        File::open_stream(io_file)
    }

    pub fn open_stream<T: Read + Seek + 'static>(mut io_file: T) -> Result<File, ParseError> {
        let mut ident = [0u8; types::EI_NIDENT];
        io_file.read_exact(&mut ident)?;

        if ident[0] != types::ELFMAG0
            || ident[1] != types::ELFMAG1
            || ident[2] != types::ELFMAG2
            || ident[3] != types::ELFMAG3
        {
            return Err(ParseError::InvalidMagic);
        }

        let class = ElfClass::try_from(ident[types::EI_CLASS])
            .map_err(|_| ParseError::InvalidFormat("bad EI_CLASS".into()))?;
        if class != ElfClass::Format64 {
            return Err(ParseError::Unsupported("32-bit ELF"));
        }

        let endianness = ElfEndianness::try_from(ident[types::EI_DATA])
            .map_err(|_| ParseError::InvalidFormat("bad EI_DATA".into()))?;
        if endianness != ElfEndianness::Lsb {
            return Err(ParseError::Unsupported("big-endian ELF"));
        }

        let osabi = OsAbi(ident[types::EI_OSABI]);
        let abiversion = ident[types::EI_ABIVERSION];

        let elftype = types::ElfFileType::try_from(utils::read_u16(&mut io_file)?)
            .map_err(|_| ParseError::InvalidFormat("bad e_type".into()))?;
        let _machine = utils::read_u16(&mut io_file)?;
        let version = utils::read_u32(&mut io_file)?;
        if version != 1 {
            return Err(ParseError::InvalidFormat(format!(
                "unexpected e_version {version}"
            )));
        }

        let entry = utils::read_u64(&mut io_file)?;
        let _phoff = utils::read_u64(&mut io_file)?;
        let shoff = utils::read_u64(&mut io_file)?;
        let _flags = utils::read_u32(&mut io_file)?;
        let _ehsize = utils::read_u16(&mut io_file)?;
        let _phentsize = utils::read_u16(&mut io_file)?;
        let _phnum = utils::read_u16(&mut io_file)?;
        let _shentsize = utils::read_u16(&mut io_file)?;
        let shnum = utils::read_u16(&mut io_file)?;
        let shstrndx = utils::read_u16(&mut io_file)?;

        let header = FileHeader {
            class,
            endianness,
            osabi,
            abiversion,
            elftype,
            entry,
            shoff,
            shnum,
            shstrndx,
        };

        let mut name_idxs: Vec<u32> = Vec::with_capacity(shnum as usize);
        let mut sections: Vec<SectionHeader> = Vec::with_capacity(shnum as usize);
        io_file.seek(SeekFrom::Start(shoff))?;
        for _ in 0..shnum {
            name_idxs.push(utils::read_u32(&mut io_file)?);
            let shtype = SectionType::try_from(utils::read_u32(&mut io_file)?)
                .unwrap_or(SectionType::Progbits);
            let _flags = utils::read_u64(&mut io_file)?;
            let addr = utils::read_u64(&mut io_file)?;
            let offset = utils::read_u64(&mut io_file)?;
            let size = utils::read_u64(&mut io_file)?;
            let link = utils::read_u32(&mut io_file)?;
            let _info = utils::read_u32(&mut io_file)?;
            let _addralign = utils::read_u64(&mut io_file)?;
            let entsize = utils::read_u64(&mut io_file)?;

            sections.push(SectionHeader {
                name: String::new(),
                shtype,
                addr,
                offset,
                size,
                link,
                entsize,
            });
        }

        if (shstrndx as usize) < sections.len() {
            let strtab_data = read_section_data(&mut io_file, &sections[shstrndx as usize])?;
            for (i, section) in sections.iter_mut().enumerate() {
                section.name = utils::get_string(&strtab_data, name_idxs[i] as usize);
            }
        }

        Ok(File {
            header,
            sections,
            reader: RefCell::new(Box::new(io_file)),
        })
    }

    pub fn get_section<T: AsRef<str>>(&self, name: T) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.name == name.as_ref())
    }

    /// Reads and parses the symbol-table entries of `section`, resolving
    /// each name through the section's linked string-table section.
    /// Returns an empty vec for any section that isn't `Symtab`/`Dynsym`.
    pub fn get_symbols(&self, section: &SectionHeader) -> Result<Vec<Symbol>, ParseError> {
        if section.shtype != SectionType::Symtab && section.shtype != SectionType::Dynsym {
            return Ok(Vec::new());
        }
        let mut reader = self.reader.borrow_mut();
        let data = read_section_data(&mut *reader, section)?;
        let link = self.sections.get(section.link as usize).ok_or_else(|| {
            ParseError::InvalidFormat("symbol section sh_link out of range".into())
        })?;
        let strtab = read_section_data(&mut *reader, link)?;

        const ENTRY_SIZE: usize = 24; // sizeof(Elf64_Sym)
        let mut symbols = Vec::with_capacity(data.len() / ENTRY_SIZE);
        let mut cursor = io::Cursor::new(&data);
        while (cursor.position() as usize) < data.len() {
            let name = utils::read_u32(&mut cursor)?;
            let mut info = [0u8];
            let mut other = [0u8];
            cursor.read_exact(&mut info)?;
            cursor.read_exact(&mut other)?;
            let shndx = utils::read_u16(&mut cursor)?;
            let value = utils::read_u64(&mut cursor)?;
            let _size = utils::read_u64(&mut cursor)?;

            symbols.push(Symbol {
                name: utils::get_string(&strtab, name as usize),
                value,
                shndx,
                symtype: SymbolType(info[0] & 0xf),
                bind: SymbolBind(info[0] >> 4),
            });
        }
        Ok(symbols)
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?} sections={}", self.header, self.sections.len())
    }
}

fn read_section_data<R: Read + Seek + ?Sized>(
    io_file: &mut R,
    section: &SectionHeader,
) -> Result<Vec<u8>, ParseError> {
    if section.shtype == SectionType::Nobits || section.size == 0 {
        return Ok(Vec::new());
    }
    io_file.seek(SeekFrom::Start(section.offset))?;
    let mut data = vec![0u8; section.size as usize];
    io_file.read_exact(&mut data)?;
    Ok(data)
}
