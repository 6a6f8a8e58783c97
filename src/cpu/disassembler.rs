use std::fmt::Write as _;

use crate::cpu::instructions::Instruction;

/// Renders one decoded instruction the way the debugger's `si` command
/// prints it: mnemonic, then comma-separated operands (each with
/// its sigil and optional `segment:` prefix), then any conditional
/// prefixes trailing as `!mnemonic operand`.
///
/// This is deliberately the *only* disassembly this crate does — a general
/// assembler/disassembler is out of scope.
pub fn format_instruction(instr: &Instruction) -> String {
    let mut out = String::new();
    out.push_str(instr.op.mnemonic());

    for (i, operand) in instr.operands.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, " {operand}");
    }

    for cmd in &instr.commands {
        if !instr.operands.is_empty() {
            out.push(',');
        }
        let _ = write!(out, " !{}", cmd.ty.mnemonic());
        for operand in &cmd.operands {
            let _ = write!(out, " {operand}");
        }
    }

    out
}
