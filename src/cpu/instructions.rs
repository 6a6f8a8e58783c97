use std::fmt;

use crate::cpu::command::{Command, CommandType};
use crate::cpu::operand::{decode_operand, Operand};
use crate::cpu::{decode_error, Machine};
use crate::error::EmuError;

/// The closed set of base opcodes. Ordinals match the wire format
/// exactly — these are what the paired assembler emits, not an arbitrary
/// internal numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Noop,
    Debug,
    Halt,
    Die,
    Load,
    Store,
    Move,
    Add,
    Compare,
    Multiply,
    Branch,
    GetIp,
    SetIp,
    GetSp,
    SetSp,
    Call,
    Ret,
    Push,
    Pop,
    Divide,
    Modulo,
}

impl Opcode {
    fn from_ordinal(ordinal: u16) -> Result<Opcode, EmuError> {
        Ok(match ordinal {
            0 => Opcode::Noop,
            1 => Opcode::Debug,
            2 => Opcode::Halt,
            3 => Opcode::Die,
            4 => Opcode::Load,
            5 => Opcode::Store,
            6 => Opcode::Move,
            7 => Opcode::Add,
            8 => Opcode::Compare,
            9 => Opcode::Multiply,
            10 => Opcode::Branch,
            11 => Opcode::GetIp,
            12 => Opcode::SetIp,
            13 => Opcode::GetSp,
            14 => Opcode::SetSp,
            15 => Opcode::Call,
            16 => Opcode::Ret,
            17 => Opcode::Push,
            18 => Opcode::Pop,
            19 => Opcode::Divide,
            20 => Opcode::Modulo,
            other => return Err(decode_error(format!("unknown opcode ordinal {other}"))),
        })
    }

    /// Number of operands this opcode consumes.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Noop | Opcode::Debug | Opcode::Halt | Opcode::Die | Opcode::Ret => 0,
            Opcode::Load
            | Opcode::Store
            | Opcode::Move => 2,
            Opcode::Add | Opcode::Compare | Opcode::Multiply | Opcode::Divide | Opcode::Modulo => {
                3
            }
            Opcode::Branch
            | Opcode::GetIp
            | Opcode::SetIp
            | Opcode::GetSp
            | Opcode::SetSp
            | Opcode::Call
            | Opcode::Push
            | Opcode::Pop => 1,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Noop => "noop",
            Opcode::Debug => "debug",
            Opcode::Halt => "halt",
            Opcode::Die => "die",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Move => "move",
            Opcode::Add => "add",
            Opcode::Compare => "compare",
            Opcode::Multiply => "multiply",
            Opcode::Branch => "branch",
            Opcode::GetIp => "get_ip",
            Opcode::SetIp => "set_ip",
            Opcode::GetSp => "get_sp",
            Opcode::SetSp => "set_sp",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Divide => "divide",
            Opcode::Modulo => "modulo",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A fully decoded instruction: an opcode, its operands, and every
/// conditional prefix that must pass before it executes. Transient —
/// produced by `decode_instruction`, consumed once by the executor.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub op: Opcode,
    pub operands: Vec<Operand>,
    pub commands: Vec<Command>,
}

/// Reads one instruction at `mem[ip]`, advancing `ip` past the opcode word,
/// every operand word (and any segment-prefix words), and — recursively —
/// past every command-prefix word and its operands.
///
/// Commands are pushed onto the *inner* instruction as decoding unwinds, so
/// `commands[0]` ends up the prefix closest to the opcode in the wire
/// format, not the first one written. That order is never observed:
/// commands are pure AND-combined predicates, so the order they're checked
/// in doesn't change the result.
pub fn decode_instruction(machine: &mut Machine) -> Result<Instruction, EmuError> {
    let word = machine.fetch();
    let is_command_prefix = (word >> 15) & 1 == 1;

    if is_command_prefix {
        let ty = CommandType::from_ordinal(word & 0xFF)?;
        let mut operands = Vec::with_capacity(ty.arity());
        for _ in 0..ty.arity() {
            operands.push(decode_operand(machine)?);
        }
        let mut instr = decode_instruction(machine)?;
        instr.commands.push(Command { ty, operands });
        Ok(instr)
    } else {
        let op = Opcode::from_ordinal(word)?;
        let mut operands = Vec::with_capacity(op.arity());
        for _ in 0..op.arity() {
            operands.push(decode_operand(machine)?);
        }
        Ok(Instruction {
            op,
            operands,
            commands: Vec::new(),
        })
    }
}
