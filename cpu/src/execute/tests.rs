use test_strategy::proptest;

use base::prelude::*;
use base::u20;

use super::execute;
use super::op_jump::condition_holds;
use crate::error::EmulationError;
use crate::memory::{FlatMemory, MemoryConfiguration, MAX_MEMORY_SIZE};
use crate::registers::RegisterFile;
use crate::status::StatusFlags;

const COMPLAIN: &str = "failed to set up instruction as test data";

struct Machine {
    regs: RegisterFile,
    mem: FlatMemory,
}

impl Machine {
    fn new() -> Machine {
        Machine::with_memory(MemoryConfiguration::default())
    }

    fn large() -> Machine {
        Machine::with_memory(MemoryConfiguration {
            size: MAX_MEMORY_SIZE,
        })
    }

    fn with_memory(config: MemoryConfiguration) -> Machine {
        Machine {
            regs: RegisterFile::new(),
            mem: FlatMemory::new(&config).expect("valid test configuration"),
        }
    }

    fn run(&mut self, inst: &Instruction, ext: &[u16]) -> Result<u32, EmulationError> {
        execute(inst, &mut self.regs, &mut self.mem, ext)
    }

    fn set(&mut self, r: Register, value: u32) {
        self.regs.write(r, value, OperandWidth::AddressWord);
    }

    fn get(&self, r: Register) -> u32 {
        self.regs.read(r)
    }

    fn set_flags(&mut self, bits: u16) {
        self.regs.set_status(StatusFlags::from_bits(bits));
    }

    fn poke(&mut self, addr: u32, bytes: &[u8]) {
        let addr = Address::try_from(addr).expect(COMPLAIN);
        self.mem.load(addr, bytes).expect(COMPLAIN);
    }

    fn poke_word(&mut self, addr: u32, w: u16) {
        self.poke(addr, &w.to_le_bytes());
    }

    fn word_at(&self, addr: u32) -> u16 {
        let bytes = self.mem.as_bytes();
        let i = addr as usize;
        u16::from_le_bytes([bytes[i], bytes[i + 1]])
    }
}

fn reg(r: Register) -> Operand {
    Operand::register(r)
}

fn double(
    opcode: DoubleOperandOpcode,
    width: OperandWidth,
    src: Operand,
    dst: Operand,
) -> Instruction {
    Instruction::DoubleOperand(DoubleOperand::new(opcode, width, src, dst).expect(COMPLAIN))
}

fn double_x(
    opcode: DoubleOperandOpcode,
    width: OperandWidth,
    src: Operand,
    dst: Operand,
    ext: Extension,
) -> Instruction {
    Instruction::DoubleOperand(
        DoubleOperand::extended(opcode, width, src, dst, ext).expect(COMPLAIN),
    )
}

fn single(opcode: SingleOperandOpcode, width: OperandWidth, operand: Operand) -> Instruction {
    Instruction::SingleOperand(SingleOperand::new(opcode, width, operand).expect(COMPLAIN))
}

fn single_x(
    opcode: SingleOperandOpcode,
    width: OperandWidth,
    operand: Operand,
    ext: Extension,
) -> Instruction {
    Instruction::SingleOperand(
        SingleOperand::extended(opcode, width, operand, ext).expect(COMPLAIN),
    )
}

fn address(opcode: AddressOpcode, src: Operand, dst: Operand, high: u8) -> Instruction {
    Instruction::Address(AddressInstruction::new(opcode, src, dst, high).expect(COMPLAIN))
}

fn repeated(times: u8, zero_carry: bool) -> Extension {
    Extension::Register {
        repeat: Repetition::Times(times),
        zero_carry,
    }
}

#[test]
fn test_jz_taken() {
    let mut m = Machine::new();
    m.regs.set_pc(u20!(0x1000));
    m.set_flags(StatusFlags::Z);
    let jz = Instruction::jump(Condition::JZ, 10).expect(COMPLAIN);
    assert_eq!(m.run(&jz, &[]), Ok(2));
    assert_eq!(m.regs.pc(), u20!(0x1016));
}

#[test]
fn test_jump_not_taken_moves_to_next_word() {
    let mut m = Machine::new();
    m.regs.set_pc(u20!(0x1000));
    let jz = Instruction::jump(Condition::JZ, 10).expect(COMPLAIN);
    assert_eq!(m.run(&jz, &[]), Ok(2));
    assert_eq!(m.regs.pc(), u20!(0x1002));
}

#[proptest]
fn jump_condition_table(
    n: bool,
    z: bool,
    c: bool,
    v: bool,
    #[strategy(0..8_u16)] field: u16,
) {
    let condition = Condition::from_field(field);
    let mut sr = StatusFlags::from_bits(0);
    sr.set_negative(n);
    sr.set_zero(z);
    sr.set_carry(c);
    sr.set_overflow(v);
    let expected = match condition {
        Condition::Jne => !z,
        Condition::Jeq => z,
        Condition::Jnc => !c,
        Condition::Jc => c,
        Condition::Jn => n,
        Condition::Jge => !(n ^ v),
        Condition::Jl => n ^ v,
        Condition::Jmp => true,
    };
    assert_eq!(condition_holds(condition, sr), expected);

    let mut m = Machine::new();
    m.regs.set_pc(u20!(0x4000));
    m.regs.set_status(sr);
    let jump = Instruction::jump(condition, 4).expect(COMPLAIN);
    assert_eq!(m.run(&jump, &[]), Ok(2));
    let target = if expected { u20!(0x400A) } else { u20!(0x4002) };
    assert_eq!(m.regs.pc(), target);
    assert_eq!(m.regs.status(), sr);
}

#[proptest]
fn jump_offsets(#[strategy(-512..=511_i32)] offset: i32) {
    let mut m = Machine::new();
    m.regs.set_pc(u20!(0x8000));
    let jmp = Instruction::jump(Condition::Jmp, offset).expect(COMPLAIN);
    assert_eq!(m.run(&jmp, &[]), Ok(2));
    assert_eq!(i64::from(m.regs.pc().bits()), 0x8002 + 2 * i64::from(offset));
}

#[test]
fn test_jump_offset_range() {
    assert_eq!(
        Instruction::jump(Condition::Jmp, 512),
        Err(InstructionError::JumpOffsetOutOfRange(512))
    );
    assert_eq!(
        Instruction::jump(Condition::Jmp, -513),
        Err(InstructionError::JumpOffsetOutOfRange(-513))
    );
}

#[test]
fn test_jump_beyond_memory_fails() {
    let mut m = Machine::new();
    m.regs.set_pc(u20!(0xFFFE));
    let before = m.regs.clone();
    let jmp = Instruction::jump(Condition::Jmp, 10).expect(COMPLAIN);
    assert_eq!(
        m.run(&jmp, &[]),
        Err(EmulationError::AddressOutOfRange(u20!(0x1_0014)))
    );
    assert_eq!(m.regs, before);
}

#[test]
fn test_call_register() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    m.regs.set_pc(u20!(0x8000));
    m.set(Register::R4, 0x9000);
    let call = single(SingleOperandOpcode::Call, OperandWidth::Word, reg(Register::R4));
    assert_eq!(m.run(&call, &[]), Ok(4));
    assert_eq!(m.word_at(0x0FFE), 0x8000);
    assert_eq!(m.regs.sp(), u20!(0x0FFE));
    assert_eq!(m.regs.pc(), u20!(0x9000));
}

#[test]
fn test_reti() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    m.poke_word(0x1000, 0x0008);
    m.poke_word(0x1002, 0x9000);
    assert_eq!(m.run(&Instruction::Reti, &[]), Ok(5));
    assert_eq!(m.regs.status().bits(), 0x0008);
    assert_eq!(m.regs.pc(), u20!(0x9000));
    assert_eq!(m.regs.sp(), u20!(0x1004));
}

#[proptest]
fn call_then_ret_round_trip(
    #[strategy(0..0x8000_u32)] p: u32,
    #[strategy(1..0x8000_u32)] s: u32,
    #[strategy(0..0x8000_u32)] t: u32,
) {
    let (p, s, t) = (2 * p, 2 * s, 2 * t);
    let mut m = Machine::new();
    m.set(Register::PC, p);
    m.set(Register::SP, s);
    m.set(Register::R4, t);
    let call = single(SingleOperandOpcode::Call, OperandWidth::Word, reg(Register::R4));
    assert_eq!(m.run(&call, &[]), Ok(4));
    assert_eq!(m.get(Register::PC), t);
    assert_eq!(m.get(Register::SP), s - 2);
    assert_eq!(u32::from(m.word_at(s - 2)), p);
    assert_eq!(m.run(&Instruction::Ret, &[]), Ok(4));
    assert_eq!(m.get(Register::PC), p);
    assert_eq!(m.get(Register::SP), s);
}

#[test]
fn test_nop_dint_eint_touch_only_gie() {
    let mut m = Machine::new();
    m.regs.set_pc(u20!(0x4400));
    m.set(Register::R7, 0x1_2345);
    m.set_flags(StatusFlags::C | StatusFlags::Z);
    let before = m.regs.clone();

    assert_eq!(m.run(&Instruction::Nop, &[]), Ok(1));
    assert_eq!(m.regs, before);

    assert_eq!(m.run(&Instruction::Eint, &[]), Ok(1));
    let mut expected = before.clone();
    expected.set_status(StatusFlags::from_bits(
        StatusFlags::C | StatusFlags::Z | StatusFlags::GIE,
    ));
    assert_eq!(m.regs, expected);

    assert_eq!(m.run(&Instruction::Dint, &[]), Ok(1));
    assert_eq!(m.regs, before);
}

#[test]
fn test_failed_call_changes_nothing() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    m.regs.set_pc(u20!(0x8000));
    m.poke_word(0x0200, 0x1235);
    let before = m.regs.clone();
    let call = single(SingleOperandOpcode::Call, OperandWidth::Word, Operand::absolute());
    assert_eq!(
        m.run(&call, &[0x0200]),
        Err(EmulationError::MisalignedTarget(u20!(0x1235)))
    );
    assert_eq!(m.regs, before);
    assert_eq!(m.word_at(0x0FFE), 0);
}

#[test]
fn test_partial_pushm_changes_nothing() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x0004));
    m.set(Register::R7, 0x7777);
    m.set(Register::R6, 0x6666);
    let before = m.regs.clone();
    let pushm = Instruction::Pushm(
        RegisterRange::new(OperandWidth::Word, 4, Register::R7).expect(COMPLAIN),
    );
    assert_eq!(
        m.run(&pushm, &[]),
        Err(EmulationError::StackOverflow(u20!(0)))
    );
    assert_eq!(m.regs, before);
    assert_eq!(&m.mem.as_bytes()[0..4], &[0, 0, 0, 0]);
}

#[test]
fn test_reti_past_end_of_memory() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0xFFFE));
    m.poke_word(0xFFFE, 0x0008);
    let before = m.regs.clone();
    assert_eq!(
        m.run(&Instruction::Reti, &[]),
        Err(EmulationError::StackOverflow(u20!(0x1_0000)))
    );
    assert_eq!(m.regs, before);
}

#[test]
fn test_ret_past_end_of_memory() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1_0000));
    let before = m.regs.clone();
    assert_eq!(
        m.run(&Instruction::Ret, &[]),
        Err(EmulationError::StackOverflow(u20!(0x1_0000)))
    );
    assert_eq!(m.regs, before);
}

#[test]
fn test_ret_and_reta_do_not_wrap_sp() {
    let mut m = Machine::large();
    m.regs.set_sp(u20!(0xF_FFFE));
    m.poke_word(0xF_FFFE, 0x4400);
    let before = m.regs.clone();
    assert_eq!(
        m.run(&Instruction::Ret, &[]),
        Err(EmulationError::StackOverflow(u20!(0xF_FFFE)))
    );
    assert_eq!(m.regs, before);

    m.regs.set_sp(u20!(0xF_FFFC));
    m.poke_word(0xF_FFFC, 0x4400);
    m.poke_word(0xF_FFFE, 0x0000);
    let before = m.regs.clone();
    assert_eq!(
        m.run(&Instruction::Reta, &[]),
        Err(EmulationError::StackOverflow(u20!(0xF_FFFC)))
    );
    assert_eq!(m.regs, before);
}

#[test]
fn test_branch() {
    let mut m = Machine::new();
    let br = Instruction::branch(Operand::immediate());
    assert_eq!(
        m.run(&br, &[0x1001]),
        Err(EmulationError::MisalignedTarget(u20!(0x1001)))
    );
    assert_eq!(m.regs.pc(), u20!(0));
    assert_eq!(m.run(&br, &[0x1000]), Ok(3));
    assert_eq!(m.regs.pc(), u20!(0x1000));

    m.set(Register::R5, 0x2000);
    assert_eq!(m.run(&Instruction::branch(reg(Register::R5)), &[]), Ok(2));
    assert_eq!(m.regs.pc(), u20!(0x2000));

    m.poke_word(0x0300, 0x3000);
    assert_eq!(m.run(&Instruction::branch(Operand::absolute()), &[0x0300]), Ok(3));
    assert_eq!(m.regs.pc(), u20!(0x3000));
}

#[test]
fn test_ret_to_odd_address() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    m.poke_word(0x1000, 0x4401);
    assert_eq!(
        m.run(&Instruction::Ret, &[]),
        Err(EmulationError::MisalignedTarget(u20!(0x4401)))
    );
    assert_eq!(m.regs.sp(), u20!(0x1000));
}

#[test]
fn test_extension_word_mismatch() {
    let mut m = Machine::new();
    let br = Instruction::branch(Operand::immediate());
    assert_eq!(
        m.run(&br, &[]),
        Err(EmulationError::ExtensionWordMismatch {
            expected: 1,
            supplied: 0
        })
    );
    assert_eq!(
        m.run(&Instruction::Nop, &[0x1234]),
        Err(EmulationError::ExtensionWordMismatch {
            expected: 0,
            supplied: 1
        })
    );
}

#[test]
fn test_add_sets_flags() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x7FFF);
    m.set(Register::R6, 0x0001);
    let add = double(
        DoubleOperandOpcode::Add,
        OperandWidth::Word,
        reg(Register::R5),
        reg(Register::R6),
    );
    assert_eq!(m.run(&add, &[]), Ok(1));
    assert_eq!(m.get(Register::R6), 0x8000);
    let sr = m.regs.status();
    assert!(sr.negative() && sr.overflow() && !sr.zero() && !sr.carry());
}

#[test]
fn test_result_stored_in_sr_wins() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0100);
    let add = double(
        DoubleOperandOpcode::Add,
        OperandWidth::Word,
        reg(Register::R5),
        reg(Register::SR),
    );
    assert_eq!(m.run(&add, &[]), Ok(1));
    assert_eq!(m.regs.status().bits(), StatusFlags::V);
}

#[test]
fn test_cmp_discards_result() {
    let mut m = Machine::new();
    m.set(Register::R6, 5);
    let cmp = double(
        DoubleOperandOpcode::Cmp,
        OperandWidth::Word,
        Operand::immediate(),
        reg(Register::R6),
    );
    assert_eq!(m.run(&cmp, &[5]), Ok(2));
    assert_eq!(m.get(Register::R6), 5);
    assert!(m.regs.status().zero());
    assert!(m.regs.status().carry());
}

#[test]
fn test_byte_operation_clears_upper_bits() {
    let mut m = Machine::new();
    m.set(Register::R5, 0xABCD);
    m.set(Register::R6, 0xF_1234);
    let mov = double(
        DoubleOperandOpcode::Mov,
        OperandWidth::Byte,
        reg(Register::R5),
        reg(Register::R6),
    );
    assert_eq!(m.run(&mov, &[]), Ok(1));
    assert_eq!(m.get(Register::R6), 0xCD);
}

#[test]
fn test_symbolic_to_absolute() {
    let mut m = Machine::new();
    // MOV EDE,&0200h at 4400h; its extension words are at 4402h and 4404h.
    m.regs.set_pc(u20!(0x4406));
    m.poke_word(0x4502, 0xBEEF);
    let mov = double(
        DoubleOperandOpcode::Mov,
        OperandWidth::Word,
        Operand::symbolic(),
        Operand::absolute(),
    );
    assert_eq!(m.run(&mov, &[0x0100, 0x0200]), Ok(6));
    assert_eq!(m.word_at(0x0200), 0xBEEF);
}

#[test]
fn test_autoincrement_source() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0300);
    m.poke_word(0x0300, 0x1111);
    let mov = double(
        DoubleOperandOpcode::Mov,
        OperandWidth::Word,
        Operand::autoincrement(Register::R5).expect(COMPLAIN),
        reg(Register::R6),
    );
    assert_eq!(m.run(&mov, &[]), Ok(2));
    assert_eq!(m.get(Register::R6), 0x1111);
    assert_eq!(m.get(Register::R5), 0x0302);

    let mov_b = double(
        DoubleOperandOpcode::Mov,
        OperandWidth::Byte,
        Operand::autoincrement(Register::R5).expect(COMPLAIN),
        reg(Register::R6),
    );
    assert_eq!(m.run(&mov_b, &[]), Ok(2));
    assert_eq!(m.get(Register::R5), 0x0303);
}

#[test]
fn test_indexed_destination() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0300);
    m.set(Register::R6, 1);
    m.poke_word(0x0302, 0x00FF);
    let add = double(
        DoubleOperandOpcode::Add,
        OperandWidth::Word,
        reg(Register::R6),
        Operand::indexed(Register::R5),
    );
    assert_eq!(m.run(&add, &[0x0002]), Ok(4));
    assert_eq!(m.word_at(0x0302), 0x0100);
}

#[test]
fn test_decimal_add() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0001);
    m.set(Register::R6, 0x0999);
    let dadd = double(
        DoubleOperandOpcode::Dadd,
        OperandWidth::Word,
        reg(Register::R5),
        reg(Register::R6),
    );
    assert_eq!(m.run(&dadd, &[]), Ok(1));
    assert_eq!(m.get(Register::R6), 0x1000);
    assert!(!m.regs.status().carry());
}

#[test]
fn test_rrc_sxt_swpb() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0001);
    m.set_flags(StatusFlags::C);
    let rrc = single(SingleOperandOpcode::Rrc, OperandWidth::Word, reg(Register::R5));
    assert_eq!(m.run(&rrc, &[]), Ok(1));
    assert_eq!(m.get(Register::R5), 0x8000);
    assert!(m.regs.status().carry() && m.regs.status().negative());

    m.set(Register::R5, 0x0080);
    let sxt = single(SingleOperandOpcode::Sxt, OperandWidth::Word, reg(Register::R5));
    assert_eq!(m.run(&sxt, &[]), Ok(1));
    assert_eq!(m.get(Register::R5), 0xF_FF80);
    assert!(m.regs.status().negative() && m.regs.status().carry());

    m.set(Register::R5, 0x1234);
    let flags = m.regs.status();
    let swpb = single(SingleOperandOpcode::Swpb, OperandWidth::Word, reg(Register::R5));
    assert_eq!(m.run(&swpb, &[]), Ok(1));
    assert_eq!(m.get(Register::R5), 0x3412);
    assert_eq!(m.regs.status(), flags);
}

#[test]
fn test_push_widths() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    m.set(Register::R5, 0x1234);
    let push_b = single(SingleOperandOpcode::Push, OperandWidth::Byte, reg(Register::R5));
    assert_eq!(m.run(&push_b, &[]), Ok(3));
    assert_eq!(m.regs.sp(), u20!(0x0FFE));
    assert_eq!(m.mem.as_bytes()[0x0FFE], 0x34);

    m.set(Register::R5, 0xA_BCDE);
    let push_a = single_x(
        SingleOperandOpcode::Push,
        OperandWidth::AddressWord,
        reg(Register::R5),
        Extension::plain(true),
    );
    assert_eq!(m.run(&push_a, &[]), Ok(4));
    assert_eq!(m.regs.sp(), u20!(0x0FFA));
    assert_eq!(&m.mem.as_bytes()[0x0FFA..0x0FFE], &[0xDE, 0xBC, 0x0A, 0x00]);
}

#[test]
fn test_push_sp_pushes_old_value() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    let push = single(SingleOperandOpcode::Push, OperandWidth::Word, reg(Register::SP));
    assert_eq!(m.run(&push, &[]), Ok(3));
    assert_eq!(m.word_at(0x0FFE), 0x1000);
}

#[test]
fn test_repeated_rrax() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x8000);
    let rrax = single_x(
        SingleOperandOpcode::Rra,
        OperandWidth::Word,
        reg(Register::R5),
        repeated(4, false),
    );
    assert_eq!(m.run(&rrax, &[]), Ok(5));
    assert_eq!(m.get(Register::R5), 0xF800);
}

#[test]
fn test_zero_carry() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x0002);
    m.set_flags(StatusFlags::C);
    let rrux = single_x(
        SingleOperandOpcode::Rrc,
        OperandWidth::Word,
        reg(Register::R5),
        repeated(1, true),
    );
    assert_eq!(m.run(&rrux, &[]), Ok(2));
    assert_eq!(m.get(Register::R5), 0x0001);
    assert!(!m.regs.status().carry());
}

#[test]
fn test_repeat_count_from_register() {
    let mut m = Machine::new();
    m.set(Register::R4, 0x0012);
    m.set(Register::R6, 2);
    let addx = double_x(
        DoubleOperandOpcode::Add,
        OperandWidth::Word,
        reg(Register::R6),
        reg(Register::R7),
        Extension::Register {
            repeat: Repetition::CountIn(Register::R4),
            zero_carry: false,
        },
    );
    assert_eq!(m.run(&addx, &[]), Ok(4));
    assert_eq!(m.get(Register::R7), 6);
}

#[test]
fn test_extended_absolute_source() {
    let mut m = Machine::large();
    m.poke(0x1_2340, &[0x45, 0x23, 0x01, 0x00]);
    m.set(Register::R8, 1);
    let addx = double_x(
        DoubleOperandOpcode::Add,
        OperandWidth::AddressWord,
        Operand::absolute(),
        reg(Register::R8),
        Extension::Memory {
            src_high: 1,
            dst_high: 0,
        },
    );
    assert_eq!(m.run(&addx, &[0x2340]), Ok(4));
    assert_eq!(m.get(Register::R8), 0x1_2346);
}

#[test]
fn test_calla_then_reta() {
    let mut m = Machine::large();
    m.regs.set_pc(u20!(0x1_0004));
    m.regs.set_sp(u20!(0x2000));
    m.set(Register::R5, 0x2_0000);
    let calla = Instruction::Calla(Calla::new(reg(Register::R5), 0).expect(COMPLAIN));
    assert_eq!(m.run(&calla, &[]), Ok(5));
    assert_eq!(m.regs.pc(), u20!(0x2_0000));
    assert_eq!(m.regs.sp(), u20!(0x1FFC));
    assert_eq!(m.word_at(0x1FFC), 0x0004);
    assert_eq!(m.word_at(0x1FFE), 0x0001);

    assert_eq!(m.run(&Instruction::Reta, &[]), Ok(4));
    assert_eq!(m.regs.pc(), u20!(0x1_0004));
    assert_eq!(m.regs.sp(), u20!(0x2000));
}

#[test]
fn test_calla_immediate_and_symbolic() {
    let mut m = Machine::large();
    m.regs.set_sp(u20!(0x2000));
    let imm = Instruction::Calla(Calla::new(Operand::immediate(), 2).expect(COMPLAIN));
    assert_eq!(m.run(&imm, &[0x4680]), Ok(5));
    assert_eq!(m.regs.pc(), u20!(0x2_4680));

    // CALLA EDE at 1_0000h, with its extension word at 1_0002h.
    m.regs.set_pc(u20!(0x1_0004));
    m.poke(0x2_0002, &[0x00, 0x00, 0x03, 0x00]);
    let ede = Instruction::Calla(Calla::new(Operand::symbolic(), 1).expect(COMPLAIN));
    assert_eq!(m.run(&ede, &[0x0000]), Ok(6));
    assert_eq!(m.regs.pc(), u20!(0x3_0000));
}

#[test]
fn test_pushm_then_popm() {
    let mut m = Machine::new();
    m.regs.set_sp(u20!(0x1000));
    let values = [0x1_0004, 0x2_0005, 0x3_0006, 0x4_0007];
    let regs = [Register::R4, Register::R5, Register::R6, Register::R7];
    for (r, v) in regs.iter().zip(values) {
        m.set(*r, v);
    }
    let range = RegisterRange::new(OperandWidth::AddressWord, 4, Register::R7).expect(COMPLAIN);
    assert_eq!(m.run(&Instruction::Pushm(range), &[]), Ok(6));
    assert_eq!(m.regs.sp(), u20!(0x0FF0));
    // The lowest register ends up at the lowest address.
    assert_eq!(m.word_at(0x0FF0), 0x0004);
    assert_eq!(m.word_at(0x0FF2), 0x0001);

    for r in regs {
        m.set(r, 0);
    }
    assert_eq!(m.run(&Instruction::Popm(range), &[]), Ok(6));
    assert_eq!(m.regs.sp(), u20!(0x1000));
    for (r, v) in regs.iter().zip(values) {
        assert_eq!(m.get(*r), v);
    }
}

#[test]
fn test_rotate_multiple() {
    let mut m = Machine::new();
    m.set(Register::R5, 0x8_0003);
    let rram = Instruction::Rotate(
        RotateMultiple::new(RotateKind::Rra, OperandWidth::AddressWord, 2, Register::R5)
            .expect(COMPLAIN),
    );
    assert_eq!(m.run(&rram, &[]), Ok(2));
    assert_eq!(m.get(Register::R5), 0xE_0000);
    assert!(m.regs.status().carry());

    m.set(Register::R6, 0x1_1234);
    let rlam = Instruction::Rotate(
        RotateMultiple::new(RotateKind::Rla, OperandWidth::Word, 4, Register::R6)
            .expect(COMPLAIN),
    );
    assert_eq!(m.run(&rlam, &[]), Ok(4));
    assert_eq!(m.get(Register::R6), 0x2340);
    assert!(m.regs.status().carry());
}

#[test]
fn test_address_arithmetic() {
    let mut m = Machine::large();
    let mova = address(AddressOpcode::Mova, Operand::immediate(), reg(Register::R9), 1);
    assert_eq!(m.run(&mova, &[0x2345]), Ok(2));
    assert_eq!(m.get(Register::R9), 0x1_2345);

    m.set(Register::R10, 0xF_0000);
    let adda = address(AddressOpcode::Adda, reg(Register::R9), reg(Register::R10), 0);
    assert_eq!(m.run(&adda, &[]), Ok(1));
    assert_eq!(m.get(Register::R10), 0x0_2345);
    assert!(m.regs.status().carry());

    let cmpa = address(AddressOpcode::Cmpa, reg(Register::R9), reg(Register::R9), 0);
    assert_eq!(m.run(&cmpa, &[]), Ok(1));
    assert!(m.regs.status().zero());
    assert_eq!(m.get(Register::R9), 0x1_2345);

    let suba = address(AddressOpcode::Suba, Operand::immediate(), reg(Register::R9), 0);
    assert_eq!(m.run(&suba, &[0x0345]), Ok(3));
    assert_eq!(m.get(Register::R9), 0x1_2000);
}

#[test]
fn test_mova_memory_forms() {
    let mut m = Machine::large();
    m.set(Register::R9, 0xA_BCDE);
    let store = address(AddressOpcode::Mova, reg(Register::R9), Operand::absolute(), 1);
    assert_eq!(m.run(&store, &[0x0000]), Ok(4));
    assert_eq!(&m.mem.as_bytes()[0x1_0000..0x1_0004], &[0xDE, 0xBC, 0x0A, 0x00]);

    m.set(Register::R5, 0x1_0004);
    let load = address(
        AddressOpcode::Mova,
        Operand::indexed(Register::R5),
        reg(Register::R6),
        0,
    );
    assert_eq!(m.run(&load, &[0xFFFC]), Ok(4));
    assert_eq!(m.get(Register::R6), 0xA_BCDE);

    m.set(Register::R10, 0x1_0000);
    let pop = address(
        AddressOpcode::Mova,
        Operand::autoincrement(Register::R10).expect(COMPLAIN),
        reg(Register::R11),
        0,
    );
    assert_eq!(m.run(&pop, &[]), Ok(3));
    assert_eq!(m.get(Register::R11), 0xA_BCDE);
    assert_eq!(m.get(Register::R10), 0x1_0004);
}
