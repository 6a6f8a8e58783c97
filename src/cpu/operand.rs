use std::fmt;

use crate::cpu::{decode_error, Machine};
use crate::error::EmuError;

/// How an operand word sources or sinks a 16-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Imm,
    Reg,
    Deref,
}

impl OperandType {
    fn from_bits(bits: u16) -> Result<OperandType, EmuError> {
        match bits {
            0 => Ok(OperandType::Imm),
            1 => Ok(OperandType::Reg),
            2 => Ok(OperandType::Deref),
            _ => Err(decode_error(format!("reserved operand type {bits}"))),
        }
    }

    /// The disassembly sigil for this operand type.
    pub fn sigil(self) -> char {
        match self {
            OperandType::Imm => '#',
            OperandType::Reg => '$',
            OperandType::Deref => '*',
        }
    }
}

/// A single decoded operand, optionally carrying a segment prefix that
/// routes a load/store to an address space other than memory. Segments
/// never nest: `segment` is itself a plain operand, never
/// one that in turn carries a `segment`.
#[derive(Debug, Clone)]
pub struct Operand {
    pub ty: OperandType,
    pub value: u16,
    pub segment: Option<Box<Operand>>,
}

impl Operand {
    pub fn imm(value: u16) -> Operand {
        Operand {
            ty: OperandType::Imm,
            value,
            segment: None,
        }
    }

    pub fn reg(value: u16) -> Operand {
        Operand {
            ty: OperandType::Reg,
            value,
            segment: None,
        }
    }

    /// The segment selector this operand carries for load/store, or 0
    /// (memory) if it carries none (`seg = op.segment ? eval(op.segment) : 0`).
    pub fn segment_selector(&self, machine: &Machine) -> Result<u16, EmuError> {
        match &self.segment {
            Some(seg) => eval(machine, seg),
            None => Ok(0),
        }
    }
}

/// Reads one operand word at `mem[ip]`, advancing `ip`, recursing at most
/// once to pick up a segment prefix.
pub fn decode_operand(machine: &mut Machine) -> Result<Operand, EmuError> {
    decode_operand_inner(machine, true)
}

fn decode_operand_inner(machine: &mut Machine, allow_segment: bool) -> Result<Operand, EmuError> {
    let word = machine.fetch();
    let has_segment_prefix = (word >> 15) & 1 == 1;
    let ty = OperandType::from_bits((word >> 12) & 0b11)?;
    let value = word & 0x0FFF;

    if has_segment_prefix {
        if !allow_segment {
            return Err(decode_error("segment prefix nested deeper than one level"));
        }
        let segment = Operand {
            ty,
            value,
            segment: None,
        };
        let mut data = decode_operand_inner(machine, false)?;
        data.segment = Some(Box::new(segment));
        Ok(data)
    } else {
        Ok(Operand {
            ty,
            value,
            segment: None,
        })
    }
}

/// `eval_ref(op)`: the register index an operand names, for `reg`/`deref`.
/// Undefined (an error) for `imm`.
pub fn eval_ref(machine: &Machine, op: &Operand) -> Result<u8, EmuError> {
    match op.ty {
        OperandType::Imm => Err(EmuError::Operand),
        OperandType::Reg => Ok(op.value as u8),
        OperandType::Deref => Ok(machine.read_reg(op.value as u8) as u8),
    }
}

/// `eval(op)`: the 16-bit value an operand names.
pub fn eval(machine: &Machine, op: &Operand) -> Result<u16, EmuError> {
    match op.ty {
        OperandType::Imm => Ok(op.value),
        _ => {
            let index = eval_ref(machine, op)?;
            Ok(machine.read_reg(index))
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(seg) = &self.segment {
            write!(f, "{seg}:")?;
        }
        write!(f, "{}{}", self.ty.sigil(), self.value)
    }
}
