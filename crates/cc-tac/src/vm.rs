//! Component K — the TAC interpreter.
//!
//! A small register/variable machine: two fixed-capacity value arrays
//! (temps, vars), a byte-addressed bump-allocated virtual heap, a call
//! stack bounded by `max_call_depth`, a monotonic step counter bounded by
//! `max_steps`, and the state machine spec.md §4.K specifies. Every opcode
//! dispatch either advances `pc` or sets a typed fault and transitions to
//! `State::Error` — there is no silent fallthrough.

use tracing::trace;

use crate::error::{LoadError, VmFault};
use crate::instruction::Instruction;
use crate::labels::LabelTable;
use crate::opcode::Opcode;
use crate::operand::Operand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Stopped,
    Running,
    Paused,
    Finished,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl Value {
    fn as_int(self) -> i32 {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v as i32,
        }
    }

    fn as_float(self) -> f32 {
        match self {
            Value::Int(v) => v as f32,
            Value::Float(v) => v,
        }
    }

    fn is_truthy(self) -> bool {
        match self {
            Value::Int(v) => v != 0,
            Value::Float(v) => v != 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VmConfig {
    pub temp_capacity: usize,
    pub var_capacity: usize,
    pub heap_size: usize,
    pub max_call_depth: usize,
    pub max_steps: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            temp_capacity: 256,
            var_capacity: 256,
            heap_size: 64 * 1024,
            max_call_depth: 256,
            max_steps: 1_000_000,
        }
    }
}

struct Frame {
    return_address: u32,
    result_operand: Operand,
}

pub struct Vm {
    config: VmConfig,
    code: Vec<Instruction>,
    labels: LabelTable,
    label_order: Vec<u16>,
    pc: u32,
    state: State,
    step_count: u64,
    last_error: Option<VmFault>,
    temps: Vec<Value>,
    vars: Vec<Value>,
    heap: Vec<u8>,
    heap_top: u32,
    call_stack: Vec<Frame>,
    pending_params: Vec<Value>,
    trace_enabled: bool,
}

impl Vm {
    pub fn new(config: VmConfig) -> Self {
        Self {
            temps: vec![Value::default(); config.temp_capacity],
            vars: vec![Value::default(); config.var_capacity],
            heap: vec![0u8; config.heap_size],
            config,
            code: Vec::new(),
            labels: LabelTable::build(&[]).expect("empty stream never fails to build a label table"),
            label_order: Vec::new(),
            pc: 0,
            state: State::Stopped,
            step_count: 0,
            last_error: None,
            heap_top: 0,
            call_stack: Vec::new(),
            pending_params: Vec::new(),
            trace_enabled: false,
        }
    }

    pub fn trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_error(&self) -> Option<VmFault> {
        self.last_error
    }

    pub fn get_temp(&self, id: u16) -> Option<Value> {
        self.temps.get(id as usize).copied()
    }

    pub fn get_var(&self, id: u16) -> Option<Value> {
        self.vars.get(id as usize).copied()
    }

    pub fn set_var(&mut self, id: u16, value: Value) -> bool {
        match self.vars.get_mut(id as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copies `code` into engine memory and builds the label table. Fails
    /// if the engine is not `STOPPED`, if any `LABEL` instruction's operand
    /// doesn't decode to a label id, or if any jump/call target names a
    /// label the stream never defines.
    pub fn load(&mut self, code: Vec<Instruction>) -> Result<(), LoadError> {
        if self.state != State::Stopped {
            return Err(LoadError::NotStopped(self.state));
        }
        let labels = LabelTable::build(&code)?;
        let mut label_order = Vec::new();
        for instr in &code {
            if instr.opcode == Opcode::Label {
                if let Some(id) = instr.label_id() {
                    if !label_order.contains(&id) {
                        label_order.push(id);
                    }
                }
            }
        }
        for instr in &code {
            let target = match instr.opcode {
                Opcode::Goto | Opcode::Call => instr.operand1.as_label(),
                Opcode::IfTrue | Opcode::IfFalse => instr.operand2.as_label(),
                _ => None,
            };
            if let Some(id) = target {
                if labels.resolve(id).is_none() {
                    return Err(LoadError::UnresolvedLabel(id));
                }
            }
        }
        self.code = code;
        self.labels = labels;
        self.label_order = label_order;
        self.pc = 0;
        self.step_count = 0;
        self.last_error = None;
        Ok(())
    }

    pub fn set_entry_point(&mut self, addr: u32) {
        self.pc = addr;
    }

    pub fn set_entry_label(&mut self, id: u16) -> Result<(), LoadError> {
        let addr = self.labels.resolve(id).ok_or(LoadError::UnresolvedLabel(id))?;
        self.pc = addr;
        Ok(())
    }

    /// Resolve a canonical "main" entry by the documented heuristic: one
    /// function-start label in the stream -> use `L1`; two -> use `L2`;
    /// otherwise the first label defined. `name` is accepted for interface
    /// compatibility and logged, but — faithfully to the source this is
    /// lifted from — never actually consulted. Flagged as a compatibility
    /// shim, not a real symbol lookup; a real implementation needs a
    /// `FunctionTable` surfaced by the TAC generator.
    pub fn set_entry_function(&mut self, name: &str) -> Result<(), LoadError> {
        tracing::debug!(requested = name, "set_entry_function ignores the name and uses the label-count heuristic");
        let chosen = match self.label_order.len() {
            0 => return Err(LoadError::UnresolvedLabel(1)),
            1 => 1u16,
            2 => 2u16,
            _ => self.label_order[0],
        };
        self.set_entry_label(chosen)
    }

    pub fn reset(&mut self) {
        self.pc = 0;
        self.step_count = 0;
        self.last_error = None;
        self.state = State::Stopped;
        self.call_stack.clear();
        self.pending_params.clear();
    }

    pub fn run(&mut self) -> Result<(), VmFault> {
        if self.state == State::Stopped || self.state == State::Paused {
            self.state = State::Running;
        }
        while self.state == State::Running {
            self.dispatch_one()?;
        }
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), VmFault> {
        if self.state == State::Stopped || self.state == State::Paused {
            self.state = State::Running;
        }
        if self.state != State::Running {
            return Ok(());
        }
        self.dispatch_one()?;
        if self.state == State::Running {
            self.state = State::Paused;
        }
        Ok(())
    }

    fn fault(&mut self, err: VmFault) -> Result<(), VmFault> {
        self.last_error = Some(err);
        self.state = State::Error;
        Err(err)
    }

    fn dispatch_one(&mut self) -> Result<(), VmFault> {
        if self.pc as usize >= self.code.len() {
            self.state = State::Finished;
            return Ok(());
        }
        self.step_count += 1;
        if self.step_count > self.config.max_steps {
            return self.fault(VmFault::MaxSteps);
        }
        let pc = self.pc;
        let instr = self.code[pc as usize];
        if self.trace_enabled {
            trace!(pc, opcode = ?instr.opcode, result = ?instr.result, op1 = ?instr.operand1, op2 = ?instr.operand2, "dispatch");
        }
        self.execute(pc, instr)
    }

    fn read_operand(&self, pc: u32, op: Operand) -> Result<Value, VmFault> {
        if let Some(v) = op.as_immediate() {
            return Ok(Value::Int(v));
        }
        if let Some(v) = op.as_float_immediate() {
            return Ok(Value::Float(v));
        }
        if let Some(id) = op.as_temp() {
            return self.temps.get(id as usize).copied().ok_or(VmFault::InvalidOperand { pc });
        }
        if let Some(id) = op.as_var() {
            return self.vars.get(id as usize).copied().ok_or(VmFault::InvalidOperand { pc });
        }
        Err(VmFault::InvalidOperand { pc })
    }

    fn write_operand(&mut self, pc: u32, op: Operand, value: Value) -> Result<(), VmFault> {
        if let Some(id) = op.as_temp() {
            let slot = self.temps.get_mut(id as usize).ok_or(VmFault::InvalidOperand { pc })?;
            *slot = value;
            return Ok(());
        }
        if let Some(id) = op.as_var() {
            let slot = self.vars.get_mut(id as usize).ok_or(VmFault::InvalidOperand { pc })?;
            *slot = value;
            return Ok(());
        }
        Err(VmFault::InvalidOperand { pc })
    }

    fn resolve_target(&self, pc: u32, op: Operand) -> Result<u32, VmFault> {
        if let Some(addr) = op.as_immediate() {
            return Ok(addr as u32);
        }
        if let Some(id) = op.as_label() {
            return self.labels.resolve(id).ok_or(VmFault::InvalidOperand { pc });
        }
        Err(VmFault::InvalidOperand { pc })
    }

    fn execute(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        match instr.opcode {
            Opcode::Nop | Opcode::Label => {
                self.pc += 1;
                Ok(())
            }

            Opcode::Assign => {
                let v = self.read_operand(pc, instr.operand1)?;
                self.write_operand(pc, instr.result, v)?;
                self.pc += 1;
                Ok(())
            }

            op if op.is_arithmetic() => self.execute_arithmetic(pc, instr),
            op if op.is_bitwise() => self.execute_bitwise(pc, instr),
            op if op.is_logical() => self.execute_logical(pc, instr),
            op if op.is_relational() => self.execute_relational(pc, instr),
            op if op.is_unary() => self.execute_unary(pc, instr),

            Opcode::Goto => {
                let target = self.resolve_target(pc, instr.operand1)?;
                if target as usize > self.code.len() {
                    return self.fault(VmFault::InvalidMemory { pc });
                }
                self.pc = target;
                Ok(())
            }

            Opcode::IfTrue | Opcode::IfFalse => {
                let cond = self.read_operand(pc, instr.operand1)?.is_truthy();
                let take = if instr.opcode == Opcode::IfTrue { cond } else { !cond };
                if take {
                    let target = self.resolve_target(pc, instr.operand2)?;
                    if target as usize > self.code.len() {
                        return self.fault(VmFault::InvalidMemory { pc });
                    }
                    self.pc = target;
                } else {
                    self.pc += 1;
                }
                Ok(())
            }

            Opcode::Call => {
                if self.call_stack.len() >= self.config.max_call_depth {
                    return self.fault(VmFault::StackOverflow { pc });
                }
                let target = self.resolve_target(pc, instr.operand1)?;
                if target as usize >= self.code.len() {
                    return self.fault(VmFault::InvalidMemory { pc });
                }
                let params = std::mem::take(&mut self.pending_params);
                if params.len() == 1 {
                    self.write_operand(pc, Operand::var(3), params[0])?;
                } else {
                    for (k, value) in params.into_iter().enumerate() {
                        self.write_operand(pc, Operand::var((k + 2) as u16), value)?;
                    }
                }
                self.call_stack.push(Frame { return_address: pc + 1, result_operand: instr.result });
                self.pc = target;
                Ok(())
            }

            Opcode::Param => {
                let v = self.read_operand(pc, instr.operand1)?;
                self.pending_params.push(v);
                self.pc += 1;
                Ok(())
            }

            Opcode::Return => {
                let v = self.read_operand(pc, instr.operand1)?;
                self.temps[0] = v;
                match self.call_stack.pop() {
                    Some(frame) => {
                        if !frame.result_operand.is_none() {
                            self.write_operand(pc, frame.result_operand, v)?;
                        }
                        self.pc = frame.return_address;
                    }
                    None => self.state = State::Finished,
                }
                Ok(())
            }

            Opcode::ReturnVoid => {
                match self.call_stack.pop() {
                    Some(frame) => self.pc = frame.return_address,
                    None => self.state = State::Finished,
                }
                Ok(())
            }

            Opcode::Load => {
                let addr = self.read_operand(pc, instr.operand1)?.as_int();
                let v = self.heap_read_i32(pc, addr)?;
                self.write_operand(pc, instr.result, Value::Int(v))?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Store => {
                let addr = self.read_operand(pc, instr.operand1)?.as_int();
                let v = self.read_operand(pc, instr.operand2)?.as_int();
                self.heap_write_i32(pc, addr, v)?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Addr => {
                let id = instr.operand1.as_var().or(instr.operand1.as_temp()).ok_or(VmFault::InvalidOperand { pc })?;
                self.write_operand(pc, instr.result, Value::Int(id as i32))?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Index => {
                let base = self.read_operand(pc, instr.operand1)?.as_int();
                let index = self.read_operand(pc, instr.operand2)?.as_int();
                self.write_operand(pc, instr.result, Value::Int(base + index * 4))?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Member | Opcode::MemberPtr => {
                let base = self.read_operand(pc, instr.operand1)?.as_int();
                let offset = self.read_operand(pc, instr.operand2)?.as_int();
                self.write_operand(pc, instr.result, Value::Int(base + offset))?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Cast => {
                let v = self.read_operand(pc, instr.operand1)?;
                let cast = if instr.flags == 1 { Value::Float(v.as_float()) } else { Value::Int(v.as_int()) };
                self.write_operand(pc, instr.result, cast)?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Sizeof => {
                let v = self.read_operand(pc, instr.operand1)?;
                self.write_operand(pc, instr.result, v)?;
                self.pc += 1;
                Ok(())
            }

            Opcode::Phi => {
                let v = self.read_operand(pc, instr.operand1)?;
                self.write_operand(pc, instr.result, v)?;
                self.pc += 1;
                Ok(())
            }
        }
    }

    fn execute_arithmetic(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        let a = self.read_operand(pc, instr.operand1)?;
        let b = self.read_operand(pc, instr.operand2)?;
        let result = match a {
            Value::Float(fa) => {
                let fb = b.as_float();
                match instr.opcode {
                    Opcode::Add => Value::Float(fa + fb),
                    Opcode::Sub => Value::Float(fa - fb),
                    Opcode::Mul => Value::Float(fa * fb),
                    Opcode::Div => {
                        if fb == 0.0 {
                            return self.fault(VmFault::DivisionByZero { pc });
                        }
                        Value::Float(fa / fb)
                    }
                    Opcode::Mod => {
                        if fb == 0.0 {
                            return self.fault(VmFault::DivisionByZero { pc });
                        }
                        Value::Float(fa % fb)
                    }
                    _ => unreachable!("is_arithmetic guards the opcode set"),
                }
            }
            Value::Int(ia) => {
                let ib = b.as_int();
                match instr.opcode {
                    Opcode::Add => Value::Int(ia.wrapping_add(ib)),
                    Opcode::Sub => Value::Int(ia.wrapping_sub(ib)),
                    Opcode::Mul => Value::Int(ia.wrapping_mul(ib)),
                    Opcode::Div => {
                        if ib == 0 {
                            return self.fault(VmFault::DivisionByZero { pc });
                        }
                        Value::Int(ia.wrapping_div(ib))
                    }
                    Opcode::Mod => {
                        if ib == 0 {
                            return self.fault(VmFault::DivisionByZero { pc });
                        }
                        Value::Int(ia.wrapping_rem(ib))
                    }
                    _ => unreachable!("is_arithmetic guards the opcode set"),
                }
            }
        };
        self.write_operand(pc, instr.result, result)?;
        self.pc += 1;
        Ok(())
    }

    fn execute_bitwise(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        let ia = self.read_operand(pc, instr.operand1)?.as_int();
        let ib = self.read_operand(pc, instr.operand2)?.as_int();
        let result = match instr.opcode {
            Opcode::And => ia & ib,
            Opcode::Or => ia | ib,
            Opcode::Xor => ia ^ ib,
            Opcode::Shl => ia.wrapping_shl(ib as u32),
            Opcode::Shr => ia.wrapping_shr(ib as u32),
            _ => unreachable!("is_bitwise guards the opcode set"),
        };
        self.write_operand(pc, instr.result, Value::Int(result))?;
        self.pc += 1;
        Ok(())
    }

    fn execute_logical(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        let a = self.read_operand(pc, instr.operand1)?.is_truthy();
        let b = self.read_operand(pc, instr.operand2)?.is_truthy();
        let result = match instr.opcode {
            Opcode::LogicalAnd => a && b,
            Opcode::LogicalOr => a || b,
            _ => unreachable!("is_logical guards the opcode set"),
        };
        self.write_operand(pc, instr.result, Value::Int(result as i32))?;
        self.pc += 1;
        Ok(())
    }

    fn execute_relational(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        let a = self.read_operand(pc, instr.operand1)?;
        let b = self.read_operand(pc, instr.operand2)?;
        let result = match a {
            Value::Float(fa) => {
                let fb = b.as_float();
                match instr.opcode {
                    Opcode::Eq => fa == fb,
                    Opcode::Ne => fa != fb,
                    Opcode::Lt => fa < fb,
                    Opcode::Le => fa <= fb,
                    Opcode::Gt => fa > fb,
                    Opcode::Ge => fa >= fb,
                    _ => unreachable!("is_relational guards the opcode set"),
                }
            }
            Value::Int(ia) => {
                let ib = b.as_int();
                match instr.opcode {
                    Opcode::Eq => ia == ib,
                    Opcode::Ne => ia != ib,
                    Opcode::Lt => ia < ib,
                    Opcode::Le => ia <= ib,
                    Opcode::Gt => ia > ib,
                    Opcode::Ge => ia >= ib,
                    _ => unreachable!("is_relational guards the opcode set"),
                }
            }
        };
        self.write_operand(pc, instr.result, Value::Int(result as i32))?;
        self.pc += 1;
        Ok(())
    }

    fn execute_unary(&mut self, pc: u32, instr: Instruction) -> Result<(), VmFault> {
        let a = self.read_operand(pc, instr.operand1)?;
        let result = match instr.opcode {
            Opcode::Neg => match a {
                Value::Int(v) => Value::Int(v.wrapping_neg()),
                Value::Float(v) => Value::Float(-v),
            },
            Opcode::Not => Value::Int(!a.is_truthy() as i32),
            Opcode::BitwiseNot => Value::Int(!a.as_int()),
            _ => unreachable!("is_unary guards the opcode set"),
        };
        self.write_operand(pc, instr.result, result)?;
        self.pc += 1;
        Ok(())
    }

    /// Bump-allocate `size` bytes from the virtual heap. `free` is
    /// intentionally a no-op that always succeeds, per spec.md §4.K's
    /// resource model.
    pub fn heap_alloc(&mut self, pc_context: u32, size: u32) -> Result<u32, VmFault> {
        let addr = self.heap_top;
        let end = addr.checked_add(size).ok_or(VmFault::InvalidMemory { pc: pc_context })?;
        if end as usize > self.heap.len() {
            return Err(VmFault::InvalidMemory { pc: pc_context });
        }
        self.heap_top = end;
        Ok(addr)
    }

    pub fn heap_free(&mut self, _addr: u32) -> Result<(), VmFault> {
        Ok(())
    }

    fn heap_read_i32(&self, pc: u32, addr: i32) -> Result<i32, VmFault> {
        let addr = usize::try_from(addr).map_err(|_| VmFault::InvalidMemory { pc })?;
        let bytes: [u8; 4] = self.heap.get(addr..addr + 4).ok_or(VmFault::InvalidMemory { pc })?.try_into().unwrap();
        Ok(i32::from_le_bytes(bytes))
    }

    fn heap_write_i32(&mut self, pc: u32, addr: i32, value: i32) -> Result<(), VmFault> {
        let addr = usize::try_from(addr).map_err(|_| VmFault::InvalidMemory { pc })?;
        let slot = self.heap.get_mut(addr..addr + 4).ok_or(VmFault::InvalidMemory { pc })?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;

    fn program(instrs: Vec<Instruction>) -> Vm {
        let mut vm = Vm::new(VmConfig::default());
        vm.load(instrs).unwrap();
        vm
    }

    #[test]
    fn tac_arithmetic_matches_the_literal_scenario() {
        let mut vm = program(vec![
            Instruction::new(Opcode::Assign, Operand::temp(0), Operand::immediate(5), Operand::NONE),
            Instruction::new(Opcode::Assign, Operand::temp(1), Operand::immediate(3), Operand::NONE),
            Instruction::new(Opcode::Add, Operand::temp(2), Operand::temp(0), Operand::temp(1)),
        ]);
        vm.run().unwrap();
        assert_eq!(vm.get_temp(2), Some(Value::Int(8)));
        assert_eq!(vm.step_count(), 3);
        assert_eq!(vm.state(), State::Finished);
    }

    #[test]
    fn tac_division_by_zero_matches_the_literal_scenario() {
        let mut vm = program(vec![
            Instruction::new(Opcode::Assign, Operand::temp(0), Operand::immediate(5), Operand::NONE),
            Instruction::new(Opcode::Assign, Operand::temp(1), Operand::immediate(0), Operand::NONE),
            Instruction::new(Opcode::Div, Operand::temp(2), Operand::temp(0), Operand::temp(1)),
        ]);
        let err = vm.run().unwrap_err();
        assert_eq!(err, VmFault::DivisionByZero { pc: 2 });
        assert_eq!(vm.state(), State::Error);
        assert_eq!(vm.pc(), 2);
        assert_eq!(vm.last_error(), Some(VmFault::DivisionByZero { pc: 2 }));
    }

    #[test]
    fn run_is_deterministic_for_identical_initial_state() {
        let code = vec![
            Instruction::new(Opcode::Assign, Operand::temp(0), Operand::immediate(2), Operand::NONE),
            Instruction::new(Opcode::Assign, Operand::temp(1), Operand::immediate(4), Operand::NONE),
            Instruction::new(Opcode::Mul, Operand::temp(2), Operand::temp(0), Operand::temp(1)),
        ];
        let mut a = Vm::new(VmConfig::default());
        a.load(code.clone()).unwrap();
        a.run().unwrap();
        let mut b = Vm::new(VmConfig::default());
        b.load(code).unwrap();
        b.run().unwrap();
        assert_eq!(a.get_temp(2), b.get_temp(2));
        assert_eq!(a.step_count(), b.step_count());
    }

    #[test]
    fn run_respects_the_step_limit() {
        let mut config = VmConfig::default();
        config.max_steps = 5;
        let mut vm = Vm::new(config);
        vm.load(vec![Instruction::new(Opcode::Goto, Operand::NONE, Operand::immediate(0), Operand::NONE)]).unwrap();
        let err = vm.run().unwrap_err();
        assert_eq!(err, VmFault::MaxSteps);
        assert_eq!(vm.state(), State::Error);
    }

    #[test]
    fn goto_out_of_bounds_is_invalid_memory() {
        let mut vm = program(vec![Instruction::new(Opcode::Goto, Operand::NONE, Operand::immediate(99), Operand::NONE)]);
        let err = vm.run().unwrap_err();
        assert_eq!(err, VmFault::InvalidMemory { pc: 0 });
    }

    #[test]
    fn call_and_return_round_trip_a_single_argument() {
        // main:  PARAM 41; CALL f; RETURN t0
        // f:     LABEL 1; ADD t0 <- v3, 1; RETURN t0
        let code = vec![
            Instruction::new(Opcode::Param, Operand::NONE, Operand::immediate(41), Operand::NONE),
            Instruction::new(Opcode::Call, Operand::temp(5), Operand::label(1), Operand::NONE),
            Instruction::new(Opcode::Return, Operand::NONE, Operand::temp(5), Operand::NONE),
            Instruction::label(1),
            Instruction::new(Opcode::Add, Operand::temp(0), Operand::var(3), Operand::immediate(1)),
            Instruction::new(Opcode::Return, Operand::NONE, Operand::temp(0), Operand::NONE),
        ];
        let mut vm = Vm::new(VmConfig::default());
        vm.load(code).unwrap();
        vm.run().unwrap();
        assert_eq!(vm.state(), State::Finished);
        assert_eq!(vm.get_temp(5), Some(Value::Int(42)));
    }

    #[test]
    fn load_rejects_an_unresolved_jump_target() {
        let mut vm = Vm::new(VmConfig::default());
        let err = vm.load(vec![Instruction::new(Opcode::Goto, Operand::NONE, Operand::label(7), Operand::NONE)]).unwrap_err();
        assert!(matches!(err, LoadError::UnresolvedLabel(7)));
    }

    #[test]
    fn set_entry_function_picks_l1_for_a_single_function() {
        let mut vm = Vm::new(VmConfig::default());
        vm.load(vec![Instruction::label(1), Instruction::new(Opcode::ReturnVoid, Operand::NONE, Operand::NONE, Operand::NONE)]).unwrap();
        vm.set_entry_function("main").unwrap();
        assert_eq!(vm.pc(), 0);
    }

    #[test]
    fn heap_round_trips_a_write_then_read() {
        let mut vm = Vm::new(VmConfig::default());
        vm.load(vec![]).unwrap();
        let addr = vm.heap_alloc(0, 4).unwrap();
        vm.heap_write_i32(0, addr as i32, 99).unwrap();
        assert_eq!(vm.heap_read_i32(0, addr as i32).unwrap(), 99);
    }
}
