use std::io::{self, BufRead, Read, Write};

use tracing::debug;

use crate::cpu::command::evaluate;
use crate::cpu::debugger::Debugger;
use crate::cpu::instructions::{Instruction, Opcode};
use crate::cpu::memory::WordStorage;
use crate::cpu::operand::{eval, eval_ref};
use crate::cpu::Machine;
use crate::error::EmuError;

/// What the run loop should do after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Terminate,
}

/// 16-bit value a segment-1 `load` returns for a standard-input read that
/// hit EOF.
pub const STDIN_EOF_SENTINEL: u16 = 0xFFFF;

/// Executes one decoded instruction against `machine`, invoking `debugger`
/// for the `debug` opcode. Conditional prefixes are checked first; a false
/// predicate skips the base instruction with zero side effects.
pub fn execute(
    machine: &mut Machine,
    instr: &Instruction,
    debugger: &mut Debugger,
) -> Result<Signal, EmuError> {
    for cmd in &instr.commands {
        if !evaluate(machine, cmd)? {
            return Ok(Signal::Continue);
        }
    }

    let signal = dispatch(machine, instr, debugger)?;

    if machine.verbose {
        debug!(op = %instr.op, "executed");
    }

    Ok(signal)
}

fn dispatch(
    machine: &mut Machine,
    instr: &Instruction,
    debugger: &mut Debugger,
) -> Result<Signal, EmuError> {
    match instr.op {
        Opcode::Noop => {}

        Opcode::Debug => match debugger.attach(machine) {
            Ok(()) => {}
            Err(EmuError::DebuggerQuit) => return Ok(Signal::Terminate),
            Err(e) => return Err(e),
        },

        Opcode::Halt => {
            println!("Hit enter to continue");
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
        }

        Opcode::Die => return Ok(Signal::Terminate),

        Opcode::Load => {
            let dest = &instr.operands[0];
            let src = &instr.operands[1];
            let seg = src.segment_selector(machine)?;
            match seg {
                0 => {
                    let value = machine.read_word(eval(machine, src)?);
                    let index = eval_ref(machine, dest)?;
                    machine.write_reg(index, value);
                }
                1 => {
                    let mut byte = [0u8; 1];
                    let value = match io::stdin().lock().read(&mut byte)? {
                        0 => STDIN_EOF_SENTINEL,
                        _ => byte[0] as u16,
                    };
                    let index = eval_ref(machine, dest)?;
                    machine.write_reg(index, value);
                }
                other => return Err(EmuError::Segment(other)),
            }
        }

        Opcode::Store => {
            let dest = &instr.operands[0];
            let src = &instr.operands[1];
            let seg = dest.segment_selector(machine)?;
            match seg {
                0 => {
                    let addr = eval(machine, dest)?;
                    let value = eval(machine, src)?;
                    machine.write_word(addr, value);
                }
                1 => {
                    let value = eval(machine, src)?;
                    io::stdout().lock().write_all(&[(value & 0xFF) as u8])?;
                    io::stdout().lock().flush()?;
                }
                other => return Err(EmuError::Segment(other)),
            }
        }

        Opcode::Pop => {
            let value = machine.stack_pop();
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, value);
        }

        Opcode::Push => {
            let value = eval(machine, &instr.operands[0])?;
            machine.stack_push(value);
        }

        Opcode::Move => {
            let value = eval(machine, &instr.operands[1])?;
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, value);
        }

        Opcode::Add => {
            let a = eval(machine, &instr.operands[1])?;
            let b = eval(machine, &instr.operands[2])?;
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, a.wrapping_add(b));
        }

        Opcode::Compare => {
            let a = eval(machine, &instr.operands[1])?;
            let b = eval(machine, &instr.operands[2])?;
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, a.wrapping_sub(b));
        }

        Opcode::Multiply => {
            let a = eval(machine, &instr.operands[1])?;
            let b = eval(machine, &instr.operands[2])?;
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, a.wrapping_mul(b));
        }

        Opcode::Divide => {
            let a = eval(machine, &instr.operands[1])?;
            let b = eval(machine, &instr.operands[2])?;
            if b == 0 {
                return Err(EmuError::Arithmetic("division by zero".into()));
            }
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, a / b);
        }

        Opcode::Modulo => {
            let a = eval(machine, &instr.operands[1])?;
            let b = eval(machine, &instr.operands[2])?;
            if b == 0 {
                return Err(EmuError::Arithmetic("modulo by zero".into()));
            }
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, a % b);
        }

        Opcode::Branch => {
            let target = eval(machine, &instr.operands[0])?;
            machine.set_ip(target);
        }

        Opcode::Call => {
            let target = eval(machine, &instr.operands[0])?;
            let return_addr = machine.ip();
            machine.stack_push(return_addr);
            machine.set_ip(target);
        }

        Opcode::Ret => {
            let addr = machine.stack_pop();
            machine.set_ip(addr);
        }

        Opcode::GetIp => {
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, machine.ip_alias() as u16);
        }

        Opcode::SetIp => {
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.set_ip_alias(index);
        }

        Opcode::GetSp => {
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.write_reg(index, machine.sp_alias() as u16);
        }

        Opcode::SetSp => {
            let index = eval_ref(machine, &instr.operands[0])?;
            machine.set_sp_alias(index);
        }
    }

    Ok(Signal::Continue)
}
