//! Execution engine for the reconstruction program

use crate::engine::builtins::{call_builtin, call_method};
use crate::engine::constants::{DEFAULT_SNAPSHOT_LIMIT, FLAG_PREFIX};
use crate::engine::errors::{Fault, HistoryError, RuntimeError};
use crate::engine::ops::{access, binary, mapping, slice};
use crate::memory::{OperandStack, Slots, Value};
use crate::program::{CodePath, Instruction, Program};
use crate::snapshot::{Snapshot, SnapshotManager, TraceLog};
use tracing::{debug, info, instrument, trace};

/// Run a program to completion without keeping it around for replay
pub fn reconstruct(program: Program) -> Result<String, RuntimeError> {
    Engine::new(program, DEFAULT_SNAPSHOT_LIMIT).run()
}

/// What the dispatch loop does after an instruction
enum Flow {
    Continue,
    /// A `FOR_EACH_KEY` consumed its mapping; iterate these keys
    Loop(Vec<String>),
    Return(String),
}

/// The engine that executes a program
pub struct Engine {
    /// Program being executed
    program: Program,

    /// Operand stack
    stack: OperandStack,

    /// Variable slots
    slots: Slots,

    /// Trace of assignments and the final result
    trace: TraceLog,

    /// Code path of the instruction being executed, one index per nesting level
    path: Vec<usize>,

    /// Instruction that completed most recently
    executed: Option<CodePath>,

    /// Snapshot manager for time-travel stepping
    snapshot_manager: SnapshotManager,

    /// Current position in execution history (for stepping backward/forward)
    history_position: usize,

    /// Result of a successful run
    result: Option<String>,
}

impl Engine {
    /// Create an engine for `program` with a snapshot memory budget in bytes
    pub fn new(program: Program, snapshot_memory_limit: usize) -> Self {
        let slots = Slots::new(program.slot_names.clone());
        Engine {
            program,
            stack: OperandStack::new(),
            slots,
            trace: TraceLog::new(),
            path: Vec::new(),
            executed: None,
            snapshot_manager: SnapshotManager::new(snapshot_memory_limit),
            history_position: 0,
            result: None,
        }
    }

    /// Run the program from start to finish and return the result string
    #[instrument(level = "debug", skip_all, fields(instructions = self.program.code.len()))]
    pub fn run(&mut self) -> Result<String, RuntimeError> {
        self.reset();
        self.take_snapshot()?;

        let code = self.program.code.clone();
        match self.execute_block(&code)? {
            Flow::Return(result) => {
                info!(
                    snapshots = self.snapshot_manager.len(),
                    memory = self.snapshot_manager.memory_usage(),
                    "reconstruction finished"
                );
                Ok(result)
            }
            Flow::Continue | Flow::Loop(_) => Err(RuntimeError::new(
                CodePath::root(code.len()),
                "END",
                Fault::MissingReturn,
            )),
        }
    }

    fn reset(&mut self) {
        self.stack = OperandStack::new();
        self.slots = Slots::new(self.program.slot_names.clone());
        self.trace = TraceLog::new();
        self.path.clear();
        self.executed = None;
        self.snapshot_manager = SnapshotManager::new(self.snapshot_manager.memory_limit());
        self.history_position = 0;
        self.result = None;
    }

    /// Execute a list of instructions; returns early on `RETURN`
    fn execute_block(&mut self, code: &[Instruction]) -> Result<Flow, RuntimeError> {
        self.path.push(0);

        for (index, instruction) in code.iter().enumerate() {
            if let Some(current) = self.path.last_mut() {
                *current = index;
            }

            let mut flow = self
                .execute_operation(instruction)
                .map_err(|fault| self.error(fault, instruction.mnemonic()))?;

            if let Instruction::ForEachKey { slot, body } = instruction {
                if let Flow::Loop(keys) = flow {
                    flow = self.execute_loop(*slot, body, keys)?;
                }
            }

            debug!(
                path = %self.current_path(),
                op = instruction.mnemonic(),
                stack = self.stack.len(),
                "executed"
            );
            self.executed = Some(self.current_path());
            self.take_snapshot()?;

            if let Flow::Return(_) = flow {
                self.path.pop();
                return Ok(flow);
            }
        }

        self.path.pop();
        Ok(Flow::Continue)
    }

    /// Run `body` once per key, binding the key to `slot` first
    fn execute_loop(
        &mut self,
        slot: usize,
        body: &[Instruction],
        keys: Vec<String>,
    ) -> Result<Flow, RuntimeError> {
        for key in keys {
            self.bind(slot, Value::Str(key))
                .map_err(|fault| self.error(fault, "FOR_EACH_KEY"))?;
            self.executed = Some(self.current_path());
            self.take_snapshot()?;

            if let Flow::Return(result) = self.execute_block(body)? {
                return Ok(Flow::Return(result));
            }
        }
        Ok(Flow::Continue)
    }

    /// Execute one instruction against the stack and slots
    fn execute_operation(&mut self, instruction: &Instruction) -> Result<Flow, Fault> {
        match instruction {
            Instruction::LoadConst(index) => {
                let value = self.constant(*index)?;
                self.stack.push(value);
            }

            Instruction::StoreVar(slot) => {
                let value = self.stack.pop()?;
                self.bind(*slot, value)?;
            }

            Instruction::LoadVar(slot) => {
                let value = self.slots.get(*slot)?.clone();
                self.stack.push(value);
            }

            Instruction::BuildSlice(count) => {
                let bounds = self.stack.pop_many(*count)?;
                let descriptor = slice::build_slice(bounds)?;
                self.stack.push(Value::Slice(descriptor));
            }

            Instruction::Subscript => {
                let [container, key] = self.stack.pop_array()?;
                self.stack.push(access::subscript(container, key)?);
            }

            Instruction::Concat => {
                let [left, right] = self.stack.pop_array()?;
                self.stack.push(binary::concat(left, right)?);
            }

            Instruction::Repeat => {
                let [left, right] = self.stack.pop_array()?;
                self.stack.push(binary::repeat(left, right)?);
            }

            Instruction::CallBuiltin { builtin, argc } => {
                let args = self.stack.pop_many(*argc)?;
                self.stack.push(call_builtin(*builtin, args)?);
            }

            Instruction::CallMethod { method, argc } => {
                let args = self.stack.pop_many(*argc)?;
                let receiver = self.stack.pop()?;
                self.stack.push(call_method(*method, receiver, args)?);
            }

            Instruction::BuildMapping { keys, count } => {
                let keys = self.constant(*keys)?;
                let values = self.stack.pop_many(*count)?;
                let built = mapping::build_mapping(&keys, values)?;
                self.stack.push(Value::Mapping(built));
            }

            Instruction::ForEachKey { .. } => {
                return match self.stack.pop()? {
                    Value::Mapping(map) => Ok(Flow::Loop(map.keys().cloned().collect())),
                    other => Err(Fault::TypeMismatch {
                        operation: "FOR_EACH_KEY",
                        expected: "dict",
                        got: other.kind().to_string(),
                    }),
                };
            }

            Instruction::Return => {
                let value = self.stack.pop()?;
                if !self.stack.is_empty() {
                    return Err(Fault::DanglingOperands {
                        count: self.stack.len(),
                    });
                }
                let Value::Str(result) = value else {
                    return Err(Fault::TypeMismatch {
                        operation: "RETURN",
                        expected: "str",
                        got: value.kind().to_string(),
                    });
                };
                self.trace
                    .record(format!("{}{}", FLAG_PREFIX, result), self.current_path());
                self.result = Some(result.clone());
                return Ok(Flow::Return(result));
            }
        }

        Ok(Flow::Continue)
    }

    fn constant(&self, index: usize) -> Result<Value, Fault> {
        self.program
            .consts
            .get(index)
            .cloned()
            .ok_or(Fault::ConstantOutOfRange {
                index,
                len: self.program.consts.len(),
            })
    }

    /// Assign a slot and record the assignment in the trace
    fn bind(&mut self, slot: usize, value: Value) -> Result<(), Fault> {
        let rendered = value.repr();
        self.slots.set(slot, value)?;
        let name = self.slots.name(slot).unwrap_or("?");
        let line = format!("{} = {}", name, rendered);
        self.trace.record(line, self.current_path());
        Ok(())
    }

    fn current_path(&self) -> CodePath {
        CodePath::new(self.path.clone())
    }

    fn error(&self, fault: Fault, op: &'static str) -> RuntimeError {
        RuntimeError::new(self.current_path(), op, fault)
    }

    /// Take a snapshot of the current state
    fn take_snapshot(&mut self) -> Result<(), RuntimeError> {
        let snapshot = Snapshot {
            stack: self.stack.clone(),
            slots: self.slots.clone(),
            trace: self.trace.clone(),
            executed: self.executed.clone(),
            result: self.result.clone(),
        };
        self.snapshot_manager
            .push(snapshot)
            .map_err(|fault| self.error(fault, "SNAPSHOT"))?;
        self.history_position = self.snapshot_manager.len() - 1;

        trace!(
            snapshots = self.snapshot_manager.len(),
            memory = self.snapshot_manager.memory_usage(),
            "snapshot taken"
        );
        Ok(())
    }

    // === History navigation ===

    /// Move one snapshot forward
    pub fn step_forward(&mut self) -> Result<(), HistoryError> {
        if self.snapshot_manager.is_empty() {
            return Err(HistoryError::Empty);
        }
        if self.history_position + 1 >= self.snapshot_manager.len() {
            return Err(HistoryError::AtEnd);
        }
        self.history_position += 1;
        Ok(())
    }

    /// Move one snapshot backward
    pub fn step_backward(&mut self) -> Result<(), HistoryError> {
        if self.snapshot_manager.is_empty() {
            return Err(HistoryError::Empty);
        }
        if self.history_position == 0 {
            return Err(HistoryError::AtStart);
        }
        self.history_position -= 1;
        Ok(())
    }

    /// Jump to the first snapshot
    pub fn rewind_to_start(&mut self) -> Result<(), HistoryError> {
        if self.snapshot_manager.is_empty() {
            return Err(HistoryError::Empty);
        }
        self.history_position = 0;
        Ok(())
    }

    /// Jump to the last snapshot
    pub fn jump_to_end(&mut self) -> Result<(), HistoryError> {
        if self.snapshot_manager.is_empty() {
            return Err(HistoryError::Empty);
        }
        self.history_position = self.snapshot_manager.len() - 1;
        Ok(())
    }

    /// Snapshot at the current history position
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.snapshot_manager.get(self.history_position)
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    // === Accessors ===

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Result of the last successful run
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Live trace (as of the end of the last run)
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Builtin, Method};

    fn program(consts: Vec<Value>, slots: &[&str], code: Vec<Instruction>) -> Program {
        Program::new(
            consts,
            slots.iter().map(|s| s.to_string()).collect(),
            code,
        )
    }

    #[test]
    fn test_store_and_load() {
        let program = program(
            vec![Value::str("apts_c")],
            &["a"],
            vec![
                Instruction::LoadConst(0),
                Instruction::StoreVar(0),
                Instruction::LoadVar(0),
                Instruction::Return,
            ],
        );
        assert_eq!(reconstruct(program), Ok("apts_c".to_string()));
    }

    #[test]
    fn test_method_call_pops_receiver_last() {
        let program = program(
            vec![Value::str("apts_c"), Value::str("p"), Value::str("n")],
            &[],
            vec![
                Instruction::LoadConst(0),
                Instruction::LoadConst(1),
                Instruction::LoadConst(2),
                Instruction::CallMethod {
                    method: Method::Replace,
                    argc: 2,
                },
                Instruction::Return,
            ],
        );
        assert_eq!(reconstruct(program), Ok("ants_c".to_string()));
    }

    #[test]
    fn test_error_identifies_instruction() {
        let program = program(
            vec![Value::Int(72)],
            &["f"],
            vec![
                Instruction::LoadConst(0),
                Instruction::LoadConst(5),
                Instruction::Return,
            ],
        );
        let err = reconstruct(program).unwrap_err();
        assert_eq!(err.path(), &CodePath::root(1));
        assert_eq!(err.op, "LOAD_CONST");
        assert_eq!(err.fault(), &Fault::ConstantOutOfRange { index: 5, len: 1 });
    }

    #[test]
    fn test_undefined_variable() {
        let program = program(vec![], &["self", "f"], vec![Instruction::LoadVar(1)]);
        let err = reconstruct(program).unwrap_err();
        assert_eq!(
            err.fault,
            Fault::UndefinedVariable {
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn test_missing_return() {
        let program = program(vec![Value::Int(1)], &["f"], vec![
            Instruction::LoadConst(0),
            Instruction::StoreVar(0),
        ]);
        let err = reconstruct(program).unwrap_err();
        assert_eq!(err.fault, Fault::MissingReturn);
        assert_eq!(err.path, CodePath::root(2));
    }

    #[test]
    fn test_return_checks() {
        let dangling = program(
            vec![Value::str("a")],
            &[],
            vec![
                Instruction::LoadConst(0),
                Instruction::LoadConst(0),
                Instruction::Return,
            ],
        );
        assert_eq!(
            reconstruct(dangling).unwrap_err().fault,
            Fault::DanglingOperands { count: 1 }
        );

        let not_a_string = program(
            vec![Value::Int(72)],
            &[],
            vec![Instruction::LoadConst(0), Instruction::Return],
        );
        assert!(matches!(
            reconstruct(not_a_string).unwrap_err().fault,
            Fault::TypeMismatch {
                operation: "RETURN",
                ..
            }
        ));
    }

    #[test]
    fn test_loop_over_non_mapping() {
        let program = program(
            vec![Value::str("ola")],
            &["x"],
            vec![
                Instruction::LoadConst(0),
                Instruction::ForEachKey {
                    slot: 0,
                    body: vec![],
                },
            ],
        );
        let err = reconstruct(program).unwrap_err();
        assert_eq!(err.op, "FOR_EACH_KEY");
        assert!(matches!(err.fault, Fault::TypeMismatch { .. }));
    }

    #[test]
    fn test_snapshots_and_history() {
        let program = program(
            vec![Value::Int(72)],
            &["f"],
            vec![
                Instruction::LoadConst(0),
                Instruction::CallBuiltin {
                    builtin: Builtin::Chr,
                    argc: 1,
                },
                Instruction::StoreVar(0),
                Instruction::LoadVar(0),
                Instruction::Return,
            ],
        );
        let mut engine = Engine::new(program, DEFAULT_SNAPSHOT_LIMIT);
        assert_eq!(engine.step_forward(), Err(HistoryError::Empty));

        engine.run().unwrap();
        // One initial snapshot plus one per instruction
        assert_eq!(engine.total_snapshots(), 6);
        assert_eq!(engine.history_position(), 5);
        assert_eq!(engine.result(), Some("H"));
        assert_eq!(engine.trace().get_output(), vec!["f = 'H'", "FLAG: H"]);

        assert_eq!(engine.step_forward(), Err(HistoryError::AtEnd));
        engine.rewind_to_start().unwrap();
        assert_eq!(engine.step_backward(), Err(HistoryError::AtStart));

        let first = engine.current_snapshot().unwrap();
        assert!(first.executed.is_none());
        assert!(first.stack.is_empty());

        engine.step_forward().unwrap();
        engine.step_forward().unwrap();
        let after_chr = engine.current_snapshot().unwrap();
        assert_eq!(after_chr.executed, Some(CodePath::root(1)));
        assert_eq!(after_chr.stack.values(), &[Value::str("H")]);
        assert!(after_chr.result.is_none());

        engine.jump_to_end().unwrap();
        assert_eq!(
            engine.current_snapshot().and_then(|s| s.result.as_deref()),
            Some("H")
        );
    }

    #[test]
    fn test_oversized_repeat_is_a_fault() {
        let program = program(
            vec![Value::str("m"), Value::Int(i64::MAX)],
            &[],
            vec![
                Instruction::LoadConst(0),
                Instruction::LoadConst(1),
                Instruction::Repeat,
                Instruction::Return,
            ],
        );
        let mut engine = Engine::new(program, DEFAULT_SNAPSHOT_LIMIT);
        let err = engine.run().unwrap_err();
        assert_eq!(err.path, CodePath::root(2));
        assert_eq!(err.op, "REPEAT");
        assert!(matches!(err.fault, Fault::StringTooLong { .. }));
        assert!(engine.result().is_none());
    }

    #[test]
    fn test_snapshot_limit_aborts_run() {
        let program = program(vec![Value::str("x")], &[], vec![
            Instruction::LoadConst(0),
            Instruction::Return,
        ]);
        let mut engine = Engine::new(program, 1);
        let err = engine.run().unwrap_err();
        assert!(matches!(err.fault, Fault::SnapshotLimitExceeded { .. }));
        assert_eq!(err.op, "SNAPSHOT");
        assert!(engine.result().is_none());
    }

    #[test]
    fn test_rerun_starts_fresh() {
        let program = program(
            vec![Value::str("iss")],
            &["i"],
            vec![
                Instruction::LoadConst(0),
                Instruction::StoreVar(0),
                Instruction::LoadVar(0),
                Instruction::Return,
            ],
        );
        let mut engine = Engine::new(program, DEFAULT_SNAPSHOT_LIMIT);
        engine.run().unwrap();
        let first = engine.total_snapshots();
        engine.run().unwrap();
        assert_eq!(engine.total_snapshots(), first);
        assert_eq!(engine.trace().len(), 2);
    }
}
