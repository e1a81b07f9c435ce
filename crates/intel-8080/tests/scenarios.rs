//! End-to-end scenarios S1-S6, transcribed from the original processor and
//! ALU test suites this simulator's timing model is grounded on.

use intel_8080::Machine;

const CYCLE_BUDGET: u64 = 200;

fn run_program(program: &[u8]) -> Machine {
    let mut machine = Machine::new();
    machine.load(program).expect("program fits in 64 KiB");
    machine.start_bounded(CYCLE_BUDGET);
    assert!(machine.is_halted(), "program did not halt within {CYCLE_BUDGET} cycles");
    machine
}

#[test]
fn s1_mvi_fills_every_working_register() {
    let program = [
        0x00, 0x06, 0x12, 0x0E, 0x13, 0x16, 0x14, 0x1E, 0x15, 0x26, 0x16, 0x2E, 0x17, 0x3E, 0x18,
        0x76,
    ];
    let machine = run_program(&program);
    let regs = machine.cu().registers();
    assert_eq!(regs.b, 0x12);
    assert_eq!(regs.c, 0x13);
    assert_eq!(regs.d, 0x14);
    assert_eq!(regs.e, 0x15);
    assert_eq!(regs.h, 0x16);
    assert_eq!(regs.l, 0x17);
    assert_eq!(regs.a, 0x18);
    assert_eq!(machine.pc(), 15);
}

#[test]
fn s2_mvi_m_writes_into_memory_through_hl() {
    let program = [0x00, 0x26, 0x01, 0x2E, 0x08, 0x36, 0x75, 0x76];
    let machine = run_program(&program);
    let regs = machine.cu().registers();
    assert_eq!(regs.h, 0x01);
    assert_eq!(regs.l, 0x08);
    assert_eq!(machine.memory_at(0x0108), 117);
}

#[test]
fn s3_adi_adds_an_immediate_into_a() {
    let program = [0x00, 0xC6, 0x05, 0x76];
    let machine = run_program(&program);
    assert_eq!(machine.cu().registers().a, 5);
    assert!(!machine.cu().flags().zero());
    assert!(!machine.cu().flags().carry());
}

#[test]
fn s4_lxi_loads_register_pairs_and_sp() {
    let program = [
        0x00, 0x01, 0x05, 0x07, 0x11, 0x03, 0x09, 0x21, 0x06, 0x02, 0x31, 0x34, 0x12, 0x76,
    ];
    let machine = run_program(&program);
    let regs = machine.cu().registers();
    assert_eq!(regs.b, 7);
    assert_eq!(regs.c, 5);
    assert_eq!(regs.d, 9);
    assert_eq!(regs.e, 3);
    assert_eq!(regs.h, 2);
    assert_eq!(regs.l, 6);
    assert_eq!(machine.cu().sp(), 0x1234);
}

#[test]
fn nop_costs_four_cycles() {
    let mut machine = Machine::new();
    machine.load(&[0x00, 0x76]).unwrap();
    machine.tick();
    let mut cycles = 1;
    while !machine.cu().is_instruction_complete() {
        machine.tick();
        cycles += 1;
    }
    assert_eq!(cycles, 4);
}

#[test]
fn mvi_register_costs_seven_cycles() {
    let mut machine = Machine::new();
    machine.load(&[0x06, 0x12, 0x76]).unwrap();
    machine.tick();
    let mut cycles = 1;
    while !machine.cu().is_instruction_complete() {
        machine.tick();
        cycles += 1;
    }
    assert_eq!(cycles, 7);
}

#[test]
fn lxi_costs_ten_cycles() {
    let mut machine = Machine::new();
    machine.load(&[0x21, 0x06, 0x02, 0x76]).unwrap();
    machine.tick();
    let mut cycles = 1;
    while !machine.cu().is_instruction_complete() {
        machine.tick();
        cycles += 1;
    }
    assert_eq!(cycles, 10);
}

#[test]
fn hlt_costs_seven_cycles() {
    let mut machine = Machine::new();
    machine.load(&[0x76]).unwrap();
    machine.tick();
    let mut cycles = 1;
    while !machine.cu().is_instruction_complete() {
        machine.tick();
        cycles += 1;
    }
    assert_eq!(cycles, 7);
    assert!(machine.is_halted());
}

#[test]
fn unimplemented_opcode_advances_pc_and_keeps_running() {
    // 0x08 and 0x10 are undefined data-transfer-group encodings on the 8080.
    let mut machine = Machine::new();
    machine.load(&[0x08, 0x76]).unwrap();
    machine.start_bounded(CYCLE_BUDGET);
    assert!(machine.is_halted());
}

#[test]
fn reset_after_halt_zeroes_everything_and_allows_reload() {
    let mut machine = run_program(&[0x00, 0x06, 0x12, 0x76]);
    assert_eq!(machine.cu().registers().b, 0x12);

    machine.reset();
    assert_eq!(machine.cu().registers().b, 0);
    assert_eq!(machine.pc(), 0);
    assert!(!machine.is_halted());
    assert_eq!(machine.memory_at(1), 0);

    machine.load(&[0x76]).unwrap();
    machine.start_bounded(CYCLE_BUDGET);
    assert!(machine.is_halted());
}
