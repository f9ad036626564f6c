// Instruction set for the reconstruction engine

use std::fmt;

/// One operation of the closed instruction set.
///
/// Operand indices refer to the program's constant pool (`LoadConst`,
/// `BuildMapping::keys`) or its variable slots (`StoreVar`, `LoadVar`,
/// `ForEachKey::slot`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Push `consts[i]`
    LoadConst(usize),
    /// Pop the top of stack into a slot
    StoreVar(usize),
    /// Push the value held by a slot
    LoadVar(usize),
    /// Pop `n` bounds (start, stop[, step]) and push a slice descriptor
    BuildSlice(usize),
    /// Pop container and key, push `container[key]`
    Subscript,
    /// Pop two values, push their concatenation or sum
    Concat,
    /// Pop a string and a count, push the string repeated
    Repeat,
    /// Pop `argc` arguments and call a built-in function
    CallBuiltin { builtin: Builtin, argc: usize },
    /// Pop `argc` arguments and a receiver, call a method on the receiver
    CallMethod { method: Method, argc: usize },
    /// Pop `count` values and zip them with the key tuple at `consts[keys]`
    BuildMapping { keys: usize, count: usize },
    /// Pop a mapping; for each key in insertion order bind it to `slot` and run `body`
    ForEachKey { slot: usize, body: Vec<Instruction> },
    /// Pop the result and stop
    Return,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::LoadConst(_) => "LOAD_CONST",
            Instruction::StoreVar(_) => "STORE_VAR",
            Instruction::LoadVar(_) => "LOAD_VAR",
            Instruction::BuildSlice(_) => "BUILD_SLICE",
            Instruction::Subscript => "SUBSCRIPT",
            Instruction::Concat => "CONCAT",
            Instruction::Repeat => "REPEAT",
            Instruction::CallBuiltin { .. } => "CALL_BUILTIN",
            Instruction::CallMethod { .. } => "CALL_METHOD",
            Instruction::BuildMapping { .. } => "BUILD_MAPPING",
            Instruction::ForEachKey { .. } => "FOR_EACH_KEY",
            Instruction::Return => "RETURN",
        }
    }
}

/// Built-in functions reachable through `CallBuiltin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `chr(code_point)`: integer code point to a one-character string
    Chr,
    /// `replace(s, old, new[, count])`: literal, non-overlapping replacement
    Replace,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "chr" => Some(Builtin::Chr),
            "replace" => Some(Builtin::Replace),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Chr => "chr",
            Builtin::Replace => "replace",
        }
    }
}

/// Methods reachable through `CallMethod`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `str.replace(old, new[, count])`
    Replace,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "replace" => Some(Method::Replace),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Replace => "replace",
        }
    }
}

/// Position of an instruction: the top-level index followed by the index inside
/// each enclosing loop body. Rendered as `#12` or `#64.3`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct CodePath(Vec<usize>);

impl CodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        CodePath(indices)
    }

    pub fn root(index: usize) -> Self {
        CodePath(vec![index])
    }

    /// Path of the `index`-th instruction inside the body at this path
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        CodePath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth (0 for top-level instructions)
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for CodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<entry>");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "#{}", parts.join("."))
    }
}
