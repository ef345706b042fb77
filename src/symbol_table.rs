//! Two-level name resolution: class scope and subroutine scope.
//!
//! Static and field entries live in the class scope for the whole compilation
//! unit. Argument and local entries live in the subroutine scope, which is
//! thrown away each time a new subroutine begins. Lookups try the subroutine
//! scope first, so a local or argument shadows a same-named field.

use std::collections::HashMap;
use std::fmt;

use crate::vm::Segment;

/// Storage kind of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    /// The VM memory segment a variable of this kind lives in.
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }

    fn is_class_level(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Argument => "argument",
            Kind::Local => "local",
        };
        f.write_str(name)
    }
}

/// One resolved entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    entries: HashMap<String, Symbol>,
    counts: [u16; 2],
}

impl Scope {
    fn slot(kind: Kind) -> usize {
        match kind {
            Kind::Static | Kind::Argument => 0,
            Kind::Field | Kind::Local => 1,
        }
    }

    fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Option<u16> {
        let counter = &mut self.counts[Self::slot(kind)];
        let index = *counter;
        *counter = counter.checked_add(1)?;
        self.entries.insert(
            name.to_string(),
            Symbol {
                ty: ty.to_string(),
                kind,
                index,
            },
        );
        Some(index)
    }

    fn count(&self, kind: Kind) -> u16 {
        self.counts[Self::slot(kind)]
    }
}

/// Symbol table for one class.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    class_scope: Scope,
    subroutine_scope: Scope,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the subroutine scope and reset the argument and local counters.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope = Scope::default();
    }

    /// Define `name` in the scope its kind belongs to and return its index.
    ///
    /// Redefining a name already present in that scope replaces the old entry.
    /// The counter still advances, so the new entry gets a fresh index.
    /// Returns `None`, defining nothing, once the kind's 16-bit counter is
    /// exhausted.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Option<u16> {
        if kind.is_class_level() {
            self.class_scope.define(name, ty, kind)
        } else {
            self.subroutine_scope.define(name, ty, kind)
        }
    }

    /// Number of entries of `kind` defined so far in its current scope.
    pub fn var_count(&self, kind: Kind) -> u16 {
        if kind.is_class_level() {
            self.class_scope.count(kind)
        } else {
            self.subroutine_scope.count(kind)
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .entries
            .get(name)
            .or_else(|| self.class_scope.entries.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|s| s.ty.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_per_kind() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("a", "int", Kind::Field), Some(0));
        assert_eq!(table.define("b", "int", Kind::Static), Some(0));
        assert_eq!(table.define("c", "Point", Kind::Field), Some(1));
        assert_eq!(table.define("x", "int", Kind::Argument), Some(0));
        assert_eq!(table.define("y", "int", Kind::Local), Some(0));
        assert_eq!(table.define("z", "int", Kind::Local), Some(1));

        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Static), 1);
        assert_eq!(table.var_count(Kind::Argument), 1);
        assert_eq!(table.var_count(Kind::Local), 2);
        assert_eq!(table.type_of("c"), Some("Point"));
    }

    #[test]
    fn test_start_subroutine_keeps_class_scope() {
        let mut table = SymbolTable::new();
        table.define("count", "int", Kind::Static);
        table.define("i", "int", Kind::Local);
        table.start_subroutine();

        assert_eq!(table.kind_of("i"), None);
        assert_eq!(table.var_count(Kind::Local), 0);
        assert_eq!(table.kind_of("count"), Some(Kind::Static));
        assert_eq!(table.define("j", "int", Kind::Local), Some(0));
    }

    #[test]
    fn test_subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("size", "int", Kind::Field);
        table.define("size", "boolean", Kind::Argument);

        let symbol = table.lookup("size").unwrap();
        assert_eq!(symbol.kind, Kind::Argument);
        assert_eq!(symbol.ty, "boolean");

        table.start_subroutine();
        assert_eq!(table.kind_of("size"), Some(Kind::Field));
    }

    #[test]
    fn test_redefinition_last_write_wins() {
        let mut table = SymbolTable::new();
        table.define("n", "int", Kind::Argument);
        table.define("n", "char", Kind::Local);

        assert_eq!(table.kind_of("n"), Some(Kind::Local));
        assert_eq!(table.type_of("n"), Some("char"));
        assert_eq!(table.index_of("n"), Some(0));
        assert_eq!(table.var_count(Kind::Argument), 1);
    }

    #[test]
    fn test_counter_exhaustion_defines_nothing() {
        let mut table = SymbolTable::new();
        for i in 0..u16::MAX {
            assert_eq!(table.define(&format!("v{}", i), "int", Kind::Local), Some(i));
        }
        assert_eq!(table.var_count(Kind::Local), u16::MAX);

        assert_eq!(table.define("overflow", "int", Kind::Local), None);
        assert!(table.lookup("overflow").is_none());
        assert_eq!(table.var_count(Kind::Local), u16::MAX);
        assert_eq!(table.index_of("v0"), Some(0));
        assert_eq!(table.define("arg", "int", Kind::Argument), Some(0));
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let table = SymbolTable::new();
        assert!(table.lookup("Output").is_none());
        assert_eq!(table.index_of("Output"), None);
        assert_eq!(table.type_of("Output"), None);
    }

    #[test]
    fn test_kind_segments() {
        assert_eq!(Kind::Static.segment(), Segment::Static);
        assert_eq!(Kind::Field.segment(), Segment::This);
        assert_eq!(Kind::Argument.segment(), Segment::Argument);
        assert_eq!(Kind::Local.segment(), Segment::Local);
    }
}
