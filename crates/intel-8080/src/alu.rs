//! The arithmetic-logic unit.
//!
//! Pure combinational function of (accumulator, operand, opcode, carry-in).
//! Has no state of its own; see §4.1.

use crate::flags::{self, Flags};

/// ALU operation selector, matching the low 3 bits of an ALU instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    /// Decode from the 3-bit ALU opcode field.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0b111 {
            0b000 => Self::Add,
            0b001 => Self::Adc,
            0b010 => Self::Sub,
            0b011 => Self::Sbb,
            0b100 => Self::Ana,
            0b101 => Self::Xra,
            0b110 => Self::Ora,
            _ => Self::Cmp,
        }
    }
}

/// Result of an ALU evaluation: the 8-bit result and the flags it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub result: u8,
    pub flags: Flags,
}

fn even_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

/// Evaluate an ALU operation. `carry_in` is only consulted by ADC and SBB.
#[must_use]
pub fn evaluate(acc: u8, operand: u8, op: AluOp, carry_in: bool) -> AluResult {
    let cin = u16::from(carry_in);
    let a = u16::from(acc);
    let b = u16::from(operand);

    let (result, carry, aux_carry) = match op {
        AluOp::Add => {
            let wide = a + b;
            let aux = (acc & 0xF) + (operand & 0xF) > 0xF;
            (wide as u8, wide > 0xFF, aux)
        }
        AluOp::Adc => {
            let wide = a + b + cin;
            let aux = (acc & 0xF) + (operand & 0xF) + u16::from(carry_in) > 0xF;
            (wide as u8, wide > 0xFF, aux)
        }
        AluOp::Sub | AluOp::Cmp => {
            let wide = a.wrapping_sub(b) & 0xFF;
            (wide as u8, a < b, false)
        }
        AluOp::Sbb => {
            let borrow = b + cin;
            let wide = a.wrapping_sub(borrow) & 0xFF;
            (wide as u8, a < borrow, false)
        }
        AluOp::Ana => {
            let r = acc & operand;
            let aux = (acc & 0xF) & (operand & 0xF) > 0xF;
            (r, false, aux)
        }
        AluOp::Xra => (acc ^ operand, false, false),
        AluOp::Ora => (acc | operand, false, false),
    };

    // CMP computes A-B for flag purposes only; the result port is cleared.
    let exposed = if op == AluOp::Cmp { 0 } else { result };

    let flags = Flags::ZERO
        .set(flags::Z, if op == AluOp::Cmp { acc == operand } else { result == 0 })
        .set(flags::C, carry)
        .set(flags::S, result & 0x80 != 0)
        .set(flags::P, even_parity(result))
        .set(flags::AC, aux_carry);

    AluResult { result: exposed, flags }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_sets_carry_and_matches_wide_sum() {
        for a in 0u16..256 {
            for b in 0u16..256 {
                let r = evaluate(a as u8, b as u8, AluOp::Add, false);
                let expected = a + b;
                let got = u16::from(r.result) + 256 * u16::from(r.flags.carry());
                assert_eq!(got, expected, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn cmp_exposes_zero_and_flags_reflect_comparison() {
        for a in 0u16..256 {
            for b in 0u16..256 {
                let r = evaluate(a as u8, b as u8, AluOp::Cmp, false);
                assert_eq!(r.result, 0);
                assert_eq!(r.flags.zero(), a == b);
                assert_eq!(r.flags.carry(), a < b);
            }
        }
    }

    #[test]
    fn xra_with_self_is_zero_with_parity_and_no_carry() {
        for a in 0u16..256 {
            let r = evaluate(a as u8, a as u8, AluOp::Xra, false);
            assert_eq!(r.result, 0);
            assert!(r.flags.zero());
            assert!(!r.flags.carry());
            assert!(!r.flags.sign());
            assert!(r.flags.parity());
        }
    }

    #[test]
    fn ana_and_ora_never_set_carry() {
        for a in 0u16..256 {
            for b in 0u16..256 {
                let ana = evaluate(a as u8, b as u8, AluOp::Ana, false);
                let ora = evaluate(a as u8, b as u8, AluOp::Ora, false);
                assert!(!ana.flags.carry());
                assert!(!ora.flags.carry());
            }
        }
    }

    #[test]
    fn add_flag_examples() {
        let r = evaluate(200, 100, AluOp::Add, false);
        assert_eq!(r.result, 44);
        assert!(r.flags.carry());
        assert!(!r.flags.zero());

        let r = evaluate(0, 0, AluOp::Add, false);
        assert_eq!(r.result, 0);
        assert!(r.flags.zero());
        assert!(!r.flags.carry());
    }

    #[test]
    fn sbb_with_incoming_borrow() {
        let r = evaluate(50, 100, AluOp::Sbb, true);
        assert_eq!(r.result, 205);
        assert!(r.flags.carry());
    }
}
