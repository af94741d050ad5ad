use std::collections::HashMap;
use std::fmt::Display;

use color_print::cformat;
use once_cell::sync::Lazy;

use crate::imm::Imm;
use crate::op::{self, OpCode};
use crate::reg::Reg;

// ----------------------------------------------------------------------------
// Mnemonic table

/// Encoding class of a concrete mnemonic, named after the major opcode
/// it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Op,
    OpImm,
    Load,
    Store,
    Branch,
    Lui,
    Auipc,
    Jal,
    Jalr,
    Ecall,
}

impl Class {
    pub fn opcode(self) -> u32 {
        match self {
            Class::Op => OpCode::OP,
            Class::OpImm => OpCode::OP_IMM,
            Class::Load => OpCode::LOAD,
            Class::Store => OpCode::STORE,
            Class::Branch => OpCode::BRANCH,
            Class::Lui => OpCode::LUI,
            Class::Auipc => OpCode::AUIPC,
            Class::Jal => OpCode::JAL,
            Class::Jalr => OpCode::JALR,
            Class::Ecall => OpCode::ECALL,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Encoding {
    pub name: &'static str,
    pub class: Class,
    pub funct3: u32,
    pub funct7: u32,
}

static MNEMONICS: Lazy<HashMap<&'static str, Encoding>> = Lazy::new(|| {
    let mut map = HashMap::new();
    let mut def = |name: &'static str, class: Class, funct3: u32, funct7: u32| {
        map.insert(name, Encoding { name, class, funct3, funct7 });
    };

    def("addi", Class::OpImm, 0b000, 0);
    def("slli", Class::OpImm, 0b001, 0);
    def("slti", Class::OpImm, 0b010, 0);
    def("sltiu", Class::OpImm, 0b011, 0);
    def("xori", Class::OpImm, 0b100, 0);
    def("srli", Class::OpImm, 0b101, 0);
    def("srai", Class::OpImm, 0b101, 0);
    def("ori", Class::OpImm, 0b110, 0);
    def("andi", Class::OpImm, 0b111, 0);

    def("add", Class::Op, 0b000, 0);
    def("sub", Class::Op, 0b000, 0b0100000);
    def("sll", Class::Op, 0b001, 0);
    def("slt", Class::Op, 0b010, 0);
    def("sltu", Class::Op, 0b011, 0);
    def("xor", Class::Op, 0b100, 0);
    def("srl", Class::Op, 0b000, 0);
    def("sra", Class::Op, 0b101, 0b0100000);
    def("or", Class::Op, 0b110, 0);
    def("and", Class::Op, 0b111, 0);
    def("mul", Class::Op, 0b000, 0b0000001);
    def("mulh", Class::Op, 0b001, 0b0000001);
    def("mulhsu", Class::Op, 0b010, 0b0000001);
    def("mulhu", Class::Op, 0b011, 0b0000001);
    def("div", Class::Op, 0b100, 0b0000001);
    def("divu", Class::Op, 0b101, 0b0000001);
    def("rem", Class::Op, 0b110, 0b0000001);
    def("remu", Class::Op, 0b111, 0b0000001);

    def("lb", Class::Load, 0b000, 0);
    def("lh", Class::Load, 0b001, 0);
    def("lw", Class::Load, 0b010, 0);
    def("lbu", Class::Load, 0b100, 0);
    def("lhu", Class::Load, 0b101, 0);

    def("sb", Class::Store, 0b000, 0);
    def("sh", Class::Store, 0b001, 0);
    def("sw", Class::Store, 0b010, 0);

    def("beq", Class::Branch, 0b000, 0);
    def("bne", Class::Branch, 0b001, 0);
    def("blt", Class::Branch, 0b100, 0);
    def("bge", Class::Branch, 0b101, 0);
    def("bltu", Class::Branch, 0b110, 0);
    def("bgeu", Class::Branch, 0b111, 0);

    def("lui", Class::Lui, 0, 0);
    def("auipc", Class::Auipc, 0, 0);
    def("jal", Class::Jal, 0, 0);
    def("jalr", Class::Jalr, 0, 0);
    def("ecall", Class::Ecall, 0, 0);

    map
});

pub fn lookup(mnemonic: &str) -> Option<&'static Encoding> {
    MNEMONICS.get(mnemonic)
}

// ----------------------------------------------------------------------------
// Instruction

/// A concrete instruction, one variant per hardware format. Generic over
/// the immediate type: `Inst<Imm>` may still hold labels, `Inst<i32>` is
/// fully resolved and ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst<T> {
    /// rd, rs1, rs2
    R(&'static Encoding, Reg, Reg, Reg),
    /// rd, rs1, imm
    I(&'static Encoding, Reg, Reg, T),
    /// rs2, rs1, imm
    S(&'static Encoding, Reg, Reg, T),
    /// rs1, rs2, offset
    B(&'static Encoding, Reg, Reg, T),
    /// rd, imm
    U(&'static Encoding, Reg, T),
    /// rd, offset
    J(&'static Encoding, Reg, T),
    E(&'static Encoding),
}

impl<T> Inst<T> {
    pub fn encoding(&self) -> &'static Encoding {
        match self {
            Inst::R(e, ..)
            | Inst::I(e, ..)
            | Inst::S(e, ..)
            | Inst::B(e, ..)
            | Inst::U(e, ..)
            | Inst::J(e, ..)
            | Inst::E(e) => *e,
        }
    }

    /// Returns a reference to the immediate value if this instruction has one
    pub fn imm(&self) -> Option<&T> {
        match self {
            Inst::I(_, _, _, imm)
            | Inst::S(_, _, _, imm)
            | Inst::B(_, _, _, imm)
            | Inst::U(_, _, imm)
            | Inst::J(_, _, imm) => Some(imm),
            Inst::R(..) | Inst::E(_) => None,
        }
    }
}

impl Inst<Imm> {
    /// Resolve the immediate against the symbol table. `row` is the word
    /// index of this instruction. A label in an I- or S-slot points at
    /// the row below the `auipc` that paired with it, hence the +1 bias;
    /// branch and jump targets are plain PC-relative byte deltas. On
    /// failure the offending label name is returned.
    pub fn resolve(
        &self,
        row: u32,
        lookup: impl Fn(&str) -> Option<u32>,
    ) -> Result<Inst<i32>, String> {
        let near = |imm: &Imm, bias: i32| -> Result<i32, String> {
            match imm {
                Imm::Int(value) => Ok(*value),
                Imm::Label(label) => {
                    let target = lookup(label).ok_or_else(|| label.clone())?;
                    Ok((target as i32 - row as i32 + bias) * 4)
                }
            }
        };
        Ok(match self {
            Inst::R(e, rd, rs1, rs2) => Inst::R(*e, *rd, *rs1, *rs2),
            Inst::I(e, rd, rs1, imm) => Inst::I(*e, *rd, *rs1, near(imm, 1)?),
            Inst::S(e, rs2, rs1, imm) => Inst::S(*e, *rs2, *rs1, near(imm, 1)?),
            Inst::B(e, rs1, rs2, to) => Inst::B(*e, *rs1, *rs2, near(to, 0)?),
            Inst::J(e, rd, to) => Inst::J(*e, *rd, near(to, 0)?),
            Inst::U(e, rd, imm) => {
                let value = match (e.class, imm) {
                    (Class::Lui, Imm::Int(value)) => *value,
                    (Class::Lui, Imm::Label(label)) => return Err(label.clone()),
                    (_, Imm::Int(value)) => ((*value as u32) << 12) as i32,
                    (_, Imm::Label(label)) => {
                        let target = lookup(label).ok_or_else(|| label.clone())?;
                        let offset = (target as i32 - row as i32) * 4;
                        if offset < 0 {
                            // compensate the sign-extended low half added
                            // by the paired addi/jalr/load/store
                            ((offset >> 12) + 1) << 12
                        } else {
                            offset
                        }
                    }
                };
                Inst::U(*e, *rd, value)
            }
            Inst::E(e) => Inst::E(*e),
        })
    }
}

impl Inst<i32> {
    pub fn encode(&self) -> u32 {
        match self {
            Inst::R(e, rd, rs1, rs2) => {
                op::enc_r(e.class.opcode(), e.funct3, e.funct7, *rd, *rs1, *rs2)
            }
            Inst::I(e, rd, rs1, imm) => op::enc_i(e.class.opcode(), e.funct3, *rd, *rs1, *imm),
            Inst::S(e, rs2, rs1, imm) => op::enc_s(e.class.opcode(), e.funct3, *rs1, *rs2, *imm),
            Inst::B(e, rs1, rs2, offset) => {
                op::enc_b(e.class.opcode(), e.funct3, *rs1, *rs2, *offset)
            }
            Inst::U(e, rd, imm) => match e.class {
                Class::Lui => op::enc_u(OpCode::LUI, *rd, (*imm as u32) << 12),
                _ => op::enc_u(OpCode::AUIPC, *rd, *imm as u32 & 0xFFFF_F000),
            },
            Inst::J(e, rd, offset) => op::enc_j(e.class.opcode(), *rd, *offset),
            Inst::E(_) => OpCode::ECALL,
        }
    }
}

impl<T: Display> Inst<T> {
    pub fn cformat(&self) -> String {
        macro_rules! row {
            ($name:expr, $a:expr, $b:expr, $c:expr) => {
                cformat!("<r>{:<7}</><b>{:<5}{:<5}{:<8}</>", $name, $a, $b, $c)
            };
        }
        match self {
            Inst::R(e, rd, rs1, rs2) => row!(e.name, rd, rs1, rs2),
            Inst::I(e, rd, rs1, imm) => row!(e.name, rd, rs1, imm),
            Inst::S(e, rs2, rs1, imm) => row!(e.name, rs2, rs1, imm),
            Inst::B(e, rs1, rs2, to) => row!(e.name, rs1, rs2, to),
            Inst::U(e, rd, imm) => row!(e.name, rd, "", imm),
            Inst::J(e, rd, to) => row!(e.name, rd, "", to),
            Inst::E(e) => row!(e.name, "", "", ""),
        }
    }
}

// ----------------------------------------------------------------------------
