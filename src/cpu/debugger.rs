use std::io::{self, BufRead, Write};

use ansi_term::Colour;
use nom::branch::alt;
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map, map_res, opt};
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

use crate::cpu::disassembler::format_instruction;
use crate::cpu::instructions::decode_instruction;
use crate::cpu::operand::{Operand, OperandType};
use crate::cpu::{decode_error, Machine};
use crate::error::EmuError;

/// An interactive single-step REPL, attached by the `debug` opcode. Holds
/// the last non-empty line typed so an empty line can replay it verbatim —
/// including re-decoding `si` from wherever IP now is, not the instruction
/// originally stepped.
#[derive(Default)]
pub struct Debugger {
    last_line: Option<String>,
}

impl Debugger {
    pub fn new() -> Debugger {
        Debugger::default()
    }

    /// Runs the `"> "` prompt loop until `q` or end-of-input.
    pub fn attach(&mut self, machine: &mut Machine) -> Result<(), EmuError> {
        let stdin = io::stdin();
        loop {
            print!("{} ", Colour::Cyan.paint(">"));
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end_matches(['\n', '\r']);

            self.run_one(machine, line)?;
        }
    }

    /// Executes one already-read REPL line, applying the implicit-repeat
    /// rule (an empty `line` replays `last_line` unchanged). Exposed so
    /// `q`/`p`/`si` dispatch can be driven directly without going through
    /// `attach`'s stdin loop.
    pub fn run_one(&mut self, machine: &mut Machine, line: &str) -> Result<(), EmuError> {
        if !line.is_empty() {
            self.last_line = Some(line.to_string());
        }
        let Some(effective) = self.last_line.clone() else {
            return Ok(());
        };
        self.dispatch(machine, &effective)
    }

    fn dispatch(&mut self, machine: &mut Machine, line: &str) -> Result<(), EmuError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = words.first() else {
            return Ok(());
        };

        match cmd {
            "q" => Err(EmuError::DebuggerQuit),
            "p" => {
                if let Some(arg) = words.get(1) {
                    let (_, operand) = parse_operand(arg)
                        .map_err(|e| decode_error(format!("bad operand {arg:?}: {e}")))?;
                    println!("{arg} = #{}", describe(machine, &operand));
                }
                Ok(())
            }
            "si" => {
                let instr = decode_instruction(machine)?;
                println!("{}", Colour::Yellow.paint(format_instruction(&instr)));
                super::executor::execute(machine, &instr, self)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn describe(machine: &Machine, operand: &Operand) -> u16 {
    match operand.ty {
        OperandType::Imm => operand.value,
        OperandType::Reg => machine.read_reg(operand.value as u8),
        OperandType::Deref => machine.read_reg(machine.read_reg(operand.value as u8) as u8),
    }
}

fn sigil(input: &str) -> IResult<&str, OperandType> {
    alt((
        map(char('#'), |_| OperandType::Imm),
        map(char('$'), |_| OperandType::Reg),
        map(char('*'), |_| OperandType::Deref),
    ))(input)
}

fn value(input: &str) -> IResult<&str, u16> {
    map_res(digit1, str::parse)(input)
}

fn bare_operand(input: &str) -> IResult<&str, Operand> {
    map(tuple((sigil, value)), |(ty, value)| Operand {
        ty,
        value,
        segment: None,
    })(input)
}

/// Parses the textual operand syntax the debugger's `p` command and `si`
/// disassembly share: `sigilN`, optionally prefixed by `sigilN:` naming a
/// segment.
pub fn parse_operand(input: &str) -> IResult<&str, Operand> {
    let (input, _) = multispace0(input)?;
    let (input, segment) = opt(terminated(bare_operand, char(':')))(input)?;
    let (input, mut data) = preceded(multispace0, bare_operand)(input)?;
    data.segment = segment.map(Box::new);
    Ok((input, data))
}
