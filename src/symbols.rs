use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use crate::lattice::Label;
use crate::registry::SequenceRegistry;

/// A bidirectional name↔code table for word labels.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    names: BTreeMap<Label, String>,
    codes: HashMap<String, Label>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Records `name` under `code` and returns the code now bound to
    /// `name`; a name that is already present keeps its original code.
    pub fn add_symbol(&mut self, name: String, code: Label) -> Label {
        if let Some(&existing) = self.codes.get(&name) {
            return existing;
        }
        self.names.insert(code, name.clone());
        self.codes.insert(name, code);
        code
    }

    pub fn find_name(&self, code: Label) -> Option<&str> {
        self.names.get(&code).map(|name| name.as_str())
    }

    pub fn find_code(&self, name: &str) -> Option<Label> {
        self.codes.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Writes the table as text, one `name code` pair per line, sorted by
    /// code ascending.
    pub fn write_text<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (code, name) in &self.names {
            writeln!(writer, "{} {}", name, code)?;
        }
        Ok(())
    }
}

/// Renders a label sequence as a symbol name: `"0"` for the empty sequence,
/// otherwise the labels in decimal joined by `_`.
fn sequence_name(seq: &[Label]) -> String {
    if seq.is_empty() {
        String::from("0")
    } else {
        seq.iter()
            .map(|label| label.to_string())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Builds the symbol table for every sequence in `registry`, by ascending
/// code.
///
/// Panics if the table ends up binding a name to a different code than the
/// registry assigned. The registry hands out every code exactly once, so
/// this marks a logic defect, not bad input.
pub fn table_from_registry(registry: &SequenceRegistry) -> SymbolTable {
    let mut table = SymbolTable::new();
    for code in 0..registry.size() {
        let seq = registry.sequence(code).expect("registry codes are dense");
        let bound = table.add_symbol(sequence_name(seq), code);
        assert_eq!(
            bound, code,
            "sequence registry bound one code to two sequences"
        );
    }
    table
}
