//! Programs for the reconstruction engine
//!
//! This module turns static input data into an executable [`Program`]:
//! - [`instruction`]: The closed instruction set and code paths
//! - [`decode`]: Lifts a raw CPython 3.8 code object into instructions
//! - [`source`]: JSON description of a code object, loaded from disk
//! - [`fixture`]: The built-in `get_credentials` code object and its flag
//!
//! # Program Shape
//!
//! A program is a constant pool, a list of slot names and a linear instruction
//! list. The only nesting is the body of a `ForEachKey` loop.

pub mod decode;
pub mod fixture;
pub mod instruction;
pub mod source;

pub use decode::{decode, CodeObject, DecodeError};
pub use instruction::{Builtin, CodePath, Instruction, Method};

use crate::memory::Value;
use rustc_hash::FxHashMap;

/// An executable program: constants, slot names and instructions
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub consts: Vec<Value>,
    pub slot_names: Vec<String>,
    pub code: Vec<Instruction>,
}

/// One line of a flattened program listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLine {
    pub path: CodePath,
    pub text: String,
}

/// Map each code path in a listing to its row
pub fn listing_rows(listing: &[ListingLine]) -> FxHashMap<CodePath, usize> {
    listing
        .iter()
        .enumerate()
        .map(|(row, line)| (line.path.clone(), row))
        .collect()
}

impl Program {
    pub fn new(consts: Vec<Value>, slot_names: Vec<String>, code: Vec<Instruction>) -> Self {
        Program {
            consts,
            slot_names,
            code,
        }
    }

    pub fn slot_name(&self, index: usize) -> Option<&str> {
        self.slot_names.get(index).map(String::as_str)
    }

    /// Flatten the program into listing lines, loop bodies following their loop
    pub fn listing(&self) -> Vec<ListingLine> {
        let mut lines = Vec::new();
        self.list_block(&self.code, &CodePath::default(), &mut lines);
        lines
    }

    fn list_block(&self, code: &[Instruction], parent: &CodePath, lines: &mut Vec<ListingLine>) {
        for (index, instruction) in code.iter().enumerate() {
            let path = if parent.indices().is_empty() {
                CodePath::root(index)
            } else {
                parent.child(index)
            };
            lines.push(ListingLine {
                path: path.clone(),
                text: self.describe(instruction),
            });
            if let Instruction::ForEachKey { body, .. } = instruction {
                self.list_block(body, &path, lines);
            }
        }
    }

    /// Human-readable form of one instruction, with resolved operands
    pub fn describe(&self, instruction: &Instruction) -> String {
        let mnemonic = instruction.mnemonic();
        match instruction {
            Instruction::LoadConst(index) => {
                format!("{:<14}{:>3} ({})", mnemonic, index, self.const_repr(*index))
            }
            Instruction::StoreVar(slot) | Instruction::LoadVar(slot) => {
                format!("{:<14}{:>3} ({})", mnemonic, slot, self.slot_repr(*slot))
            }
            Instruction::BuildSlice(count) => format!("{:<14}{:>3}", mnemonic, count),
            Instruction::CallBuiltin { builtin, argc } => {
                format!("{:<14}{:>3} ({})", mnemonic, argc, builtin.name())
            }
            Instruction::CallMethod { method, argc } => {
                format!("{:<14}{:>3} (.{})", mnemonic, argc, method.name())
            }
            Instruction::BuildMapping { keys, count } => {
                format!("{:<14}{:>3} (keys {})", mnemonic, count, self.const_repr(*keys))
            }
            Instruction::ForEachKey { slot, body } => format!(
                "{:<14}{:>3} ({}, {} in body)",
                mnemonic,
                slot,
                self.slot_repr(*slot),
                body.len()
            ),
            Instruction::Subscript
            | Instruction::Concat
            | Instruction::Repeat
            | Instruction::Return => mnemonic.to_string(),
        }
    }

    fn const_repr(&self, index: usize) -> String {
        self.consts
            .get(index)
            .map_or_else(|| "<out of range>".to_string(), Value::repr)
    }

    fn slot_repr(&self, slot: usize) -> String {
        self.slot_name(slot).unwrap_or("<out of range>").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_name() {
        let program = Program::new(
            vec![],
            vec!["self".to_string(), "f".to_string()],
            vec![],
        );
        assert_eq!(program.slot_name(1), Some("f"));
        assert_eq!(program.slot_name(2), None);
    }

    #[test]
    fn test_listing_nests_loop_body() {
        let program = Program::new(
            vec![Value::str("BT")],
            vec!["d".to_string(), "x".to_string()],
            vec![
                Instruction::LoadVar(0),
                Instruction::ForEachKey {
                    slot: 1,
                    body: vec![Instruction::LoadConst(0), Instruction::StoreVar(1)],
                },
            ],
        );

        let listing = program.listing();
        let paths: Vec<String> = listing.iter().map(|l| l.path.to_string()).collect();
        assert_eq!(paths, vec!["#0", "#1", "#1.0", "#1.1"]);
        assert!(listing[2].text.contains("'BT'"));
        assert!(listing[1].text.contains("(x, 2 in body)"));

        let rows = listing_rows(&listing);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.get(&CodePath::new(vec![1, 1])), Some(&3));
        assert_eq!(rows.get(&CodePath::root(1)), Some(&1));
        assert_eq!(rows.get(&CodePath::root(2)), None);
    }
}
