use rvarch::imm::Imm;
use rvarch::inst::{self, Class, Inst};
use rvarch::reg::Reg;

use crate::error::Error;

/// Parse one already-expanded field vector into a concrete instruction.
/// The mnemonic table picks the encoding class, the class picks the
/// operand shape.
pub fn parse_inst(fields: &[String]) -> Result<Inst<Imm>, Error> {
    let (op, args) = fields.split_first().ok_or(Error::SyntaxError)?;
    let enc = inst::lookup(op).ok_or_else(|| Error::UnknownOperation(op.clone()))?;

    // Get argument by index and parse as Type
    // Example: arg!(0, Reg) -> Reg
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
    }

    Ok(match enc.class {
        Class::Op => Inst::R(enc, arg!(0, Reg), arg!(1, Reg), arg!(2, Reg)),
        Class::OpImm | Class::Jalr => Inst::I(enc, arg!(0, Reg), arg!(1, Reg), arg!(2, Imm)),
        Class::Load => Inst::I(enc, arg!(0, Reg), arg!(2, Reg), arg!(1, Imm)),
        Class::Store => Inst::S(enc, arg!(0, Reg), arg!(2, Reg), arg!(1, Imm)),
        Class::Branch => Inst::B(enc, arg!(0, Reg), arg!(1, Reg), arg!(2, Imm)),
        Class::Lui | Class::Auipc => Inst::U(enc, arg!(0, Reg), arg!(1, Imm)),
        Class::Jal => Inst::J(enc, arg!(0, Reg), arg!(1, Imm)),
        Class::Ecall => Inst::E(enc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        crate::tokenizer::tokenize(line)
    }

    #[test]
    fn concrete_shapes() {
        let inst = parse_inst(&fields("add x1, x2, x3")).unwrap();
        assert_eq!(
            inst,
            Inst::R(inst::lookup("add").unwrap(), Reg::RA, Reg::SP, Reg::GP)
        );

        let inst = parse_inst(&fields("lw x5, 8(x2)")).unwrap();
        assert_eq!(
            inst,
            Inst::I(inst::lookup("lw").unwrap(), Reg::T0, Reg::SP, Imm::Int(8))
        );

        let inst = parse_inst(&fields("sw x5, -4(x2)")).unwrap();
        assert_eq!(
            inst,
            Inst::S(inst::lookup("sw").unwrap(), Reg::T0, Reg::SP, Imm::Int(-4))
        );

        let inst = parse_inst(&fields("beq x1, x2, loop")).unwrap();
        assert_eq!(
            inst,
            Inst::B(
                inst::lookup("beq").unwrap(),
                Reg::RA,
                Reg::SP,
                Imm::Label("loop".to_string())
            )
        );
    }

    #[test]
    fn bad_input() {
        assert_eq!(
            parse_inst(&fields("frobnicate x1")),
            Err(Error::UnknownOperation("frobnicate".to_string()))
        );
        assert_eq!(parse_inst(&fields("add x1, x2")), Err(Error::MissingArgument));
        assert_eq!(
            parse_inst(&fields("add x1, x2, x99")),
            Err(Error::ParseArgument("x99".to_string(), "Reg".to_string()))
        );
    }
}
