//! Symbol Store (§4.3): an open-addressed hash table keyed by symbol name,
//! where each entry owns a chain of variants (strong/weak, across
//! modules). Collisions resolve with linear probing to find a home slot's
//! first free cell, and an explicit forward chain index links a home cell
//! to wherever a colliding name actually landed — the same shape as
//! `original_source/src/proc-info.c`'s `SymbolEntry` table, translated
//! from an intrusive linked list into index-based chaining over a `Vec`.

use std::sync::Arc;

const INITIAL_CAPACITY: usize = 16;

/// ELF symbol binding, narrowed to the two kinds the loader keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Strong,
    Weak,
}

/// One occurrence of a function symbol in one module.
#[derive(Debug, Clone)]
pub struct SymbolVariant {
    pub address: u64,
    pub binding: Binding,
    pub module_path: Arc<std::path::Path>,
}

/// Aggregates all variants sharing a name.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    hash: u64,
    pub variants: Vec<SymbolVariant>,
    /// Index of the next cell in this home position's collision chain,
    /// mirroring `SymbolEntry::chain` in the original.
    chain: Option<usize>,
}

impl SymbolEntry {
    /// First strong variant in arrival order, or `None` if every variant
    /// recorded for this name is weak.
    pub fn strong_address(&self) -> Option<u64> {
        self.variants
            .iter()
            .find(|v| v.binding == Binding::Strong)
            .map(|v| v.address)
    }
}

/// The mixing loop over name bytes from `original_source/src/proc-info.c`'s
/// `StrHash`. Not part of the external contract — just needs to be
/// deterministic within one process lifetime.
fn hash_name(name: &str) -> u64 {
    let mut h: u64 = 17771;
    for &b in name.as_bytes() {
        h ^= h.wrapping_shl(5).wrapping_add(h.wrapping_shr(2)).wrapping_add(b as u64);
    }
    h
}

enum Cell {
    Empty,
    Occupied(SymbolEntry),
}

/// Open-addressed hash table of [`SymbolEntry`] values.
pub struct SymbolStore {
    table: Vec<Cell>,
    mask: usize,
    live: usize,
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolStore {
    pub fn new() -> Self {
        let mut table = Vec::with_capacity(INITIAL_CAPACITY);
        table.resize_with(INITIAL_CAPACITY, || Cell::Empty);
        SymbolStore {
            table,
            mask: INITIAL_CAPACITY - 1,
            live: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Returns the existing entry for `name`, inserting an empty one
    /// first if it is not already present. Doubles and rehashes the
    /// table before insertion if live count would reach capacity/2.
    pub fn insert(&mut self, name: &str) -> usize {
        let hash = hash_name(name);
        if let Some(idx) = self.find_index(name, hash) {
            return idx;
        }

        if self.live + 1 > self.capacity() / 2 {
            self.grow();
        }

        let home = (hash as usize) & self.mask;
        let idx = match &self.table[home] {
            Cell::Empty => home,
            Cell::Occupied(_) => {
                // Walk the existing chain to its tail, then linear-probe
                // for a free cell and link it in.
                let mut tail = home;
                loop {
                    match &self.table[tail] {
                        Cell::Occupied(e) => match e.chain {
                            Some(next) => tail = next,
                            None => break,
                        },
                        Cell::Empty => unreachable!("chain must only pass through occupied cells"),
                    }
                }
                let mut probe = hash;
                loop {
                    probe = probe.wrapping_add(1);
                    let candidate = (probe as usize) & self.mask;
                    if matches!(self.table[candidate], Cell::Empty) {
                        if let Cell::Occupied(e) = &mut self.table[tail] {
                            e.chain = Some(candidate);
                        }
                        break candidate;
                    }
                }
            }
        };

        self.table[idx] = Cell::Occupied(SymbolEntry {
            name: name.to_string(),
            hash,
            variants: Vec::new(),
            chain: None,
        });
        self.live += 1;
        idx
    }

    pub fn find(&self, name: &str) -> Option<&SymbolEntry> {
        let hash = hash_name(name);
        self.find_index(name, hash).map(|idx| match &self.table[idx] {
            Cell::Occupied(e) => e,
            Cell::Empty => unreachable!(),
        })
    }

    fn find_index(&self, name: &str, hash: u64) -> Option<usize> {
        let home = (hash as usize) & self.mask;
        let mut cursor = Some(home);
        while let Some(idx) = cursor {
            match &self.table[idx] {
                Cell::Occupied(e) => {
                    if e.hash == hash && e.name == name {
                        return Some(idx);
                    }
                    cursor = e.chain;
                }
                Cell::Empty => return None,
            }
        }
        None
    }

    /// Pushes `variant` onto the entry's variant list, unless a variant
    /// from the same module is already recorded there — "for a given
    /// (module, name) there is at most one variant" (§3 Symbol Variant).
    pub fn append_variant(&mut self, entry_idx: usize, variant: SymbolVariant) {
        if let Cell::Occupied(e) = &mut self.table[entry_idx] {
            if e.variants.iter().any(|v| *v.module_path == *variant.module_path) {
                return;
            }
            e.variants.push(variant);
        }
    }

    /// `find_strong`: the address of the first strong variant recorded
    /// for `name`, regardless of insertion order relative to any weak
    /// variants (property 5).
    pub fn find_strong(&self, name: &str) -> Option<u64> {
        self.find(name).and_then(|e| e.strong_address())
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity() * 2;
        let mut new_store = SymbolStore {
            table: {
                let mut t = Vec::with_capacity(new_capacity);
                t.resize_with(new_capacity, || Cell::Empty);
                t
            },
            mask: new_capacity - 1,
            live: 0,
        };

        for cell in self.table.drain(..) {
            if let Cell::Occupied(entry) = cell {
                let idx = new_store.insert(&entry.name);
                for variant in entry.variants {
                    new_store.append_variant(idx, variant);
                }
            }
        }

        *self = new_store;
    }

    /// Callback-driven traversal in storage order (§4.3, §9 design
    /// notes): `begin` is called once per occupied entry, then
    /// `on_variant` once per variant unless `begin` returned
    /// [`ControlFlow::Break`] or [`ControlFlow::Stop`]; `end` runs
    /// exactly once per entry after normal variant iteration completes.
    pub fn for_each<C>(
        &self,
        ctx: &mut C,
        mut begin: impl FnMut(&mut C, &str) -> ControlFlow,
        mut on_variant: impl FnMut(&mut C, u64, bool) -> ControlFlow,
        mut end: impl FnMut(&mut C),
    ) {
        for cell in &self.table {
            let Cell::Occupied(entry) = cell else { continue };

            match begin(ctx, &entry.name) {
                ControlFlow::Continue => {}
                ControlFlow::Break => {
                    end(ctx);
                    continue;
                }
                ControlFlow::Stop => {
                    end(ctx);
                    return;
                }
            }

            let mut stopped = false;
            for variant in &entry.variants {
                match on_variant(ctx, variant.address, variant.binding == Binding::Weak) {
                    ControlFlow::Continue => {}
                    ControlFlow::Break => break,
                    ControlFlow::Stop => {
                        stopped = true;
                        break;
                    }
                }
            }
            end(ctx);
            if stopped {
                return;
            }
        }
    }
}

/// Control signal a traversal callback returns; mirrors
/// `PINFO_FOREACH_{CONTINUE,BREAK,STOP}` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Break,
    Stop,
}
