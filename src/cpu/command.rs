use crate::cpu::operand::{eval, Operand};
use crate::cpu::{as_signed, decode_error, Machine};
use crate::error::EmuError;

/// The predicate kind of a conditional prefix. Ordinals are
/// fixed by the wire format: `eq=0, ne=1, lt=2, le=3, gt=4, ge=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CommandType {
    pub fn from_ordinal(ordinal: u16) -> Result<CommandType, EmuError> {
        match ordinal {
            0 => Ok(CommandType::Eq),
            1 => Ok(CommandType::Ne),
            2 => Ok(CommandType::Lt),
            3 => Ok(CommandType::Le),
            4 => Ok(CommandType::Gt),
            5 => Ok(CommandType::Ge),
            other => Err(decode_error(format!("unknown command type {other}"))),
        }
    }

    /// All six predicates currently take exactly one operand.
    pub fn arity(self) -> usize {
        1
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            CommandType::Eq => "eq",
            CommandType::Ne => "ne",
            CommandType::Lt => "lt",
            CommandType::Le => "le",
            CommandType::Gt => "gt",
            CommandType::Ge => "ge",
        }
    }
}

/// A conditional prefix: a predicate plus the operands it is evaluated
/// against. All commands on an instruction must pass for the
/// base instruction to execute.
#[derive(Debug, Clone)]
pub struct Command {
    pub ty: CommandType,
    pub operands: Vec<Operand>,
}

/// Evaluates one command's predicate against its single operand.
/// Unsigned comparison for `eq`/`ne`, signed two's-complement for the rest.
pub fn evaluate(machine: &Machine, cmd: &Command) -> Result<bool, EmuError> {
    let x = eval(machine, &cmd.operands[0])?;
    Ok(match cmd.ty {
        CommandType::Eq => x == 0,
        CommandType::Ne => x != 0,
        CommandType::Lt => as_signed(x) < 0,
        CommandType::Le => as_signed(x) <= 0,
        CommandType::Gt => as_signed(x) > 0,
        CommandType::Ge => as_signed(x) >= 0,
    })
}
