use rvarch::imm::{signext, Imm};
use rvarch::inst::{self, Encoding, Inst};
use rvarch::reg::Reg;

use crate::error::Error;
use crate::parser;

// ----------------------------------------------------------------------------
// Pseudo-op expansion

fn enc(name: &str) -> &'static Encoding {
    inst::lookup(name).unwrap()
}

/// Expand one statement into its 1 or 2 concrete instructions. Anything
/// that is not a pseudo-op falls through to the concrete parser.
pub fn expand(fields: &[String]) -> Result<Vec<Inst<Imm>>, Error> {
    let (op, args) = fields.split_first().ok_or(Error::SyntaxError)?;

    macro_rules! arg {
        ($index:expr, Reg) => {{
            let arg = args.get($index).ok_or(Error::MissingArgument)?;
            Reg::parse(arg)
                .map_err(|_| Error::ParseArgument(arg.to_string(), "Reg".to_string()))?
        }};
        ($index:expr, Imm) => {{
            let arg = args.get($index).ok_or(Error::MissingArgument)?;
            Imm::parse(arg)
        }};
        ($index:expr, Int) => {{
            let arg = args.get($index).ok_or(Error::MissingArgument)?;
            match Imm::parse(arg) {
                Imm::Int(value) => value,
                Imm::Label(_) => {
                    return Err(Error::ParseArgument(arg.to_string(), "Int".to_string()))
                }
            }
        }};
    }

    match op.as_str() {
        "nop" => Ok(vec![Inst::I(enc("addi"), Reg::ZERO, Reg::ZERO, Imm::Int(0))]),

        "li" => {
            let rd = arg!(0, Reg);
            let value = arg!(1, Int);
            if value > 2047 || value < -2048 {
                // lui takes the upper 20 bits; the addi below adds a
                // sign-extended low half, so bump the upper part when
                // bit 11 is set
                let mut upper = ((value as u32) >> 12) as i32;
                if value & 0x800 != 0 {
                    upper += 1;
                }
                let lower = signext(value & 0xFFF, 12);
                Ok(vec![
                    Inst::U(enc("lui"), rd, Imm::Int(upper)),
                    Inst::I(enc("addi"), rd, rd, Imm::Int(lower)),
                ])
            } else {
                Ok(vec![Inst::I(enc("addi"), rd, Reg::ZERO, Imm::Int(value))])
            }
        }

        "mv" => Ok(vec![Inst::I(
            enc("addi"),
            arg!(0, Reg),
            arg!(1, Reg),
            Imm::Int(0),
        )]),
        "not" => Ok(vec![Inst::I(
            enc("xori"),
            arg!(0, Reg),
            arg!(1, Reg),
            Imm::Int(-1),
        )]),
        "neg" => Ok(vec![Inst::R(enc("sub"), arg!(0, Reg), Reg::ZERO, arg!(1, Reg))]),

        "seqz" => Ok(vec![Inst::I(
            enc("sltiu"),
            arg!(0, Reg),
            arg!(1, Reg),
            Imm::Int(1),
        )]),
        "snez" => Ok(vec![Inst::R(enc("sltu"), arg!(0, Reg), Reg::ZERO, arg!(1, Reg))]),
        "sltz" => Ok(vec![Inst::R(enc("slt"), arg!(0, Reg), arg!(1, Reg), Reg::ZERO)]),
        "sgtz" => Ok(vec![Inst::R(enc("slt"), arg!(0, Reg), Reg::ZERO, arg!(1, Reg))]),

        "beqz" => Ok(vec![Inst::B(enc("beq"), arg!(0, Reg), Reg::ZERO, arg!(1, Imm))]),
        "bnez" => Ok(vec![Inst::B(enc("bne"), arg!(0, Reg), Reg::ZERO, arg!(1, Imm))]),
        "blez" => Ok(vec![Inst::B(enc("bge"), Reg::ZERO, arg!(0, Reg), arg!(1, Imm))]),
        "bgez" => Ok(vec![Inst::B(enc("bge"), arg!(0, Reg), Reg::ZERO, arg!(1, Imm))]),
        "bltz" => Ok(vec![Inst::B(enc("blt"), arg!(0, Reg), Reg::ZERO, arg!(1, Imm))]),
        "bgtz" => Ok(vec![Inst::B(enc("blt"), Reg::ZERO, arg!(0, Reg), arg!(1, Imm))]),

        // two-register comparisons reduce to the swapped-operand forms
        "bgt" => Ok(vec![Inst::B(enc("blt"), arg!(1, Reg), arg!(0, Reg), arg!(2, Imm))]),
        "ble" => Ok(vec![Inst::B(enc("bge"), arg!(1, Reg), arg!(0, Reg), arg!(2, Imm))]),
        "bgtu" => Ok(vec![Inst::B(enc("bltu"), arg!(1, Reg), arg!(0, Reg), arg!(2, Imm))]),
        "bleu" => Ok(vec![Inst::B(enc("bgeu"), arg!(1, Reg), arg!(0, Reg), arg!(2, Imm))]),

        "j" => Ok(vec![Inst::J(enc("jal"), Reg::ZERO, arg!(0, Imm))]),
        "jal" if args.len() == 1 => Ok(vec![Inst::J(enc("jal"), Reg::RA, arg!(0, Imm))]),
        "jr" => Ok(vec![Inst::I(enc("jalr"), Reg::ZERO, arg!(0, Reg), Imm::Int(0))]),
        "jalr" if args.len() == 1 => {
            Ok(vec![Inst::I(enc("jalr"), Reg::RA, arg!(0, Reg), Imm::Int(0))])
        }
        "ret" => Ok(vec![Inst::I(enc("jalr"), Reg::ZERO, Reg::RA, Imm::Int(0))]),

        "call" => {
            let to = arg!(0, Imm);
            Ok(vec![
                Inst::U(enc("auipc"), Reg::T1, to.clone()),
                Inst::I(enc("jalr"), Reg::RA, Reg::T1, to),
            ])
        }
        "tail" => {
            let to = arg!(0, Imm);
            Ok(vec![
                Inst::U(enc("auipc"), Reg::T1, to.clone()),
                Inst::I(enc("jalr"), Reg::ZERO, Reg::T1, to),
            ])
        }
        "la" => {
            let rd = arg!(0, Reg);
            let to = arg!(1, Imm);
            Ok(vec![
                Inst::U(enc("auipc"), rd, to.clone()),
                Inst::I(enc("addi"), rd, rd, to),
            ])
        }

        // loads of a label go through an address-forming auipc
        "lb" | "lh" | "lw" if args.len() == 2 => {
            let e = enc(op);
            let rd = arg!(0, Reg);
            let to = arg!(1, Imm);
            Ok(vec![
                Inst::U(enc("auipc"), rd, to.clone()),
                Inst::I(e, rd, rd, to),
            ])
        }

        // stores are pseudo only when the offset slot holds a label
        "sb" | "sh" | "sw" => {
            let e = enc(op);
            let rs2 = arg!(0, Reg);
            let to = arg!(1, Imm);
            let base = arg!(2, Reg);
            match to {
                Imm::Int(_) => Ok(vec![Inst::S(e, rs2, base, to)]),
                Imm::Label(_) => Ok(vec![
                    Inst::U(enc("auipc"), base, to.clone()),
                    Inst::S(e, rs2, base, to),
                ]),
            }
        }

        _ => parser::parse_inst(fields).map(|inst| vec![inst]),
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(line: &str) -> Vec<Inst<Imm>> {
        expand(&crate::tokenizer::tokenize(line)).unwrap()
    }

    #[test]
    fn nop() {
        assert_eq!(
            rows("nop"),
            vec![Inst::I(enc("addi"), Reg::ZERO, Reg::ZERO, Imm::Int(0))]
        );
    }

    #[test]
    fn li_small() {
        assert_eq!(
            rows("li x5, 2047"),
            vec![Inst::I(enc("addi"), Reg::T0, Reg::ZERO, Imm::Int(2047))]
        );
        assert_eq!(
            rows("li x5, -2048"),
            vec![Inst::I(enc("addi"), Reg::T0, Reg::ZERO, Imm::Int(-2048))]
        );
    }

    #[test]
    fn li_split() {
        assert_eq!(
            rows("li x5, 2048"),
            vec![
                Inst::U(enc("lui"), Reg::T0, Imm::Int(1)),
                Inst::I(enc("addi"), Reg::T0, Reg::T0, Imm::Int(-2048)),
            ]
        );
        assert_eq!(
            rows("li x5, 0x12345"),
            vec![
                Inst::U(enc("lui"), Reg::T0, Imm::Int(0x12)),
                Inst::I(enc("addi"), Reg::T0, Reg::T0, Imm::Int(0x345)),
            ]
        );
        assert_eq!(
            rows("li x5, -2049"),
            vec![
                Inst::U(enc("lui"), Reg::T0, Imm::Int(0xFFFFF)),
                Inst::I(enc("addi"), Reg::T0, Reg::T0, Imm::Int(0x7FF)),
            ]
        );
        // low half negative: upper compensates
        assert_eq!(
            rows("li x5, -4097"),
            vec![
                Inst::U(enc("lui"), Reg::T0, Imm::Int(0xFFFFF)),
                Inst::I(enc("addi"), Reg::T0, Reg::T0, Imm::Int(-1)),
            ]
        );
    }

    #[test]
    fn register_moves() {
        assert_eq!(
            rows("mv x1, x2"),
            vec![Inst::I(enc("addi"), Reg::RA, Reg::SP, Imm::Int(0))]
        );
        assert_eq!(
            rows("not x1, x2"),
            vec![Inst::I(enc("xori"), Reg::RA, Reg::SP, Imm::Int(-1))]
        );
        assert_eq!(
            rows("neg x1, x2"),
            vec![Inst::R(enc("sub"), Reg::RA, Reg::ZERO, Reg::SP)]
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(
            rows("seqz x1, x2"),
            vec![Inst::I(enc("sltiu"), Reg::RA, Reg::SP, Imm::Int(1))]
        );
        assert_eq!(
            rows("snez x1, x2"),
            vec![Inst::R(enc("sltu"), Reg::RA, Reg::ZERO, Reg::SP)]
        );
        assert_eq!(
            rows("sltz x1, x2"),
            vec![Inst::R(enc("slt"), Reg::RA, Reg::SP, Reg::ZERO)]
        );
        assert_eq!(
            rows("sgtz x1, x2"),
            vec![Inst::R(enc("slt"), Reg::RA, Reg::ZERO, Reg::SP)]
        );
    }

    #[test]
    fn branches() {
        let to = || Imm::Label("l".to_string());
        assert_eq!(
            rows("beqz x1, l"),
            vec![Inst::B(enc("beq"), Reg::RA, Reg::ZERO, to())]
        );
        assert_eq!(
            rows("blez x1, l"),
            vec![Inst::B(enc("bge"), Reg::ZERO, Reg::RA, to())]
        );
        assert_eq!(
            rows("bgt x1, x2, l"),
            vec![Inst::B(enc("blt"), Reg::SP, Reg::RA, to())]
        );
        assert_eq!(
            rows("bleu x1, x2, l"),
            vec![Inst::B(enc("bgeu"), Reg::SP, Reg::RA, to())]
        );
    }

    #[test]
    fn jumps() {
        let to = || Imm::Label("f".to_string());
        assert_eq!(rows("j f"), vec![Inst::J(enc("jal"), Reg::ZERO, to())]);
        assert_eq!(rows("jal f"), vec![Inst::J(enc("jal"), Reg::RA, to())]);
        assert_eq!(
            rows("jal x3, f"),
            vec![Inst::J(enc("jal"), Reg::GP, to())]
        );
        assert_eq!(
            rows("jr x1"),
            vec![Inst::I(enc("jalr"), Reg::ZERO, Reg::RA, Imm::Int(0))]
        );
        assert_eq!(
            rows("ret"),
            vec![Inst::I(enc("jalr"), Reg::ZERO, Reg::RA, Imm::Int(0))]
        );
    }

    #[test]
    fn call_tail_la() {
        let to = || Imm::Label("f".to_string());
        assert_eq!(
            rows("call f"),
            vec![
                Inst::U(enc("auipc"), Reg::T1, to()),
                Inst::I(enc("jalr"), Reg::RA, Reg::T1, to()),
            ]
        );
        assert_eq!(
            rows("tail f"),
            vec![
                Inst::U(enc("auipc"), Reg::T1, to()),
                Inst::I(enc("jalr"), Reg::ZERO, Reg::T1, to()),
            ]
        );
        assert_eq!(
            rows("la x10, f"),
            vec![
                Inst::U(enc("auipc"), Reg::A0, to()),
                Inst::I(enc("addi"), Reg::A0, Reg::A0, to()),
            ]
        );
    }

    #[test]
    fn label_loads_and_stores() {
        let var = || Imm::Label("var".to_string());
        assert_eq!(
            rows("lw x5, var"),
            vec![
                Inst::U(enc("auipc"), Reg::T0, var()),
                Inst::I(enc("lw"), Reg::T0, Reg::T0, var()),
            ]
        );
        assert_eq!(
            rows("lw x5, 8(x2)"),
            vec![Inst::I(enc("lw"), Reg::T0, Reg::SP, Imm::Int(8))]
        );
        assert_eq!(
            rows("sw x5, var, x6"),
            vec![
                Inst::U(enc("auipc"), Reg::T1, var()),
                Inst::S(enc("sw"), Reg::T0, Reg::T1, var()),
            ]
        );
        assert_eq!(
            rows("sw x5, 8(x2)"),
            vec![Inst::S(enc("sw"), Reg::T0, Reg::SP, Imm::Int(8))]
        );
    }

    #[test]
    fn li_rejects_label() {
        assert_eq!(
            expand(&crate::tokenizer::tokenize("li x5, foo")),
            Err(Error::ParseArgument("foo".to_string(), "Int".to_string()))
        );
    }
}
