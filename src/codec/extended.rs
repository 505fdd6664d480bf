// Extended operations shared by the DonnBits and byte-wise grammars.
//
// An escape token is followed by a sub-opcode byte and opcode-specific
// Encoded Value operands. Each operation synthesizes structured output:
// segment loader jump tables, entry vectors, runs and delta sequences.

use log::trace;

use super::context::DecodeContext;
use crate::error::DecompressError;

/// `MOVE.W #imm,-(SP)`.
const OP_MOVE_W_IMM_PUSH: u16 = 0x3F3C;
/// `_LoadSeg` trap.
const OP_LOAD_SEG: u16 = 0xA9F0;
/// `BSR.W`.
const OP_BSR_W: u16 = 0x6100;
/// `JMP d16(A5)`.
const OP_JMP_A5: u16 = 0x4EED;

/// Bias folded into each jump table delta.
const JUMP_TABLE_BIAS: i32 = 6;
/// Size of every synthesized jump table / entry vector record.
const RECORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedOp {
    JumpTable,
    EntryVector,
    RunLengthByte,
    RunLengthWord,
    DiffWord,
    DiffEncodedWord,
    DiffEncodedLong,
}

impl TryFrom<u8> for ExtendedOp {
    type Error = DecompressError;

    fn try_from(op: u8) -> Result<Self, Self::Error> {
        Ok(match op {
            0 => Self::JumpTable,
            1 => Self::EntryVector,
            2 => Self::RunLengthByte,
            3 => Self::RunLengthWord,
            4 => Self::DiffWord,
            5 => Self::DiffEncodedWord,
            6 => Self::DiffEncodedLong,
            _ => {
                return Err(DecompressError::cant(format!(
                    "unknown extended opcode {op:#04X}"
                )));
            }
        })
    }
}

/// Read a sub-opcode and execute it.
pub fn handle_extended(ctx: &mut DecodeContext<'_>) -> Result<(), DecompressError> {
    let op = ExtendedOp::try_from(ctx.read_u8()?)?;
    trace!("extended {op:?} at input offset {}", ctx.position());
    match op {
        ExtendedOp::JumpTable => jump_table(ctx),
        ExtendedOp::EntryVector => entry_vector(ctx),
        ExtendedOp::RunLengthByte => run_length(ctx, 1),
        ExtendedOp::RunLengthWord => run_length(ctx, 2),
        ExtendedOp::DiffWord => diff_word(ctx),
        ExtendedOp::DiffEncodedWord => diff_encoded(ctx, 2),
        ExtendedOp::DiffEncodedLong => diff_encoded(ctx, 4),
    }
}

/// Encoded count operand, reinterpreted as unsigned.
fn read_count(ctx: &mut DecodeContext<'_>) -> Result<usize, DecompressError> {
    Ok(ctx.read_encoded()? as u32 as usize)
}

/// `seg n delta*n` → n records of `offset 3F3C seg A9F0`.
fn jump_table(ctx: &mut DecodeContext<'_>) -> Result<(), DecompressError> {
    let seg = ctx.read_encoded()? as u16;
    let entries = read_count(ctx)?;
    let mut offset = JUMP_TABLE_BIAS as u16;

    for _ in 0..entries {
        let delta = ctx.read_encoded()?.wrapping_sub(JUMP_TABLE_BIAS);
        offset = offset.wrapping_add(delta as u16);

        ctx.ensure_output(RECORD_LEN)?;
        ctx.write_u16(offset)?;
        ctx.write_u16(OP_MOVE_W_IMM_PUSH)?;
        ctx.write_u16(seg)?;
        ctx.write_u16(OP_LOAD_SEG)?;
    }
    Ok(())
}

/// `branch delta n offset [offset...]` → n records of `6100 branch 4EED offset`.
///
/// Each record after the first moves the branch back by one record. A zero
/// `delta` means every later offset is read from the stream.
fn entry_vector(ctx: &mut DecodeContext<'_>) -> Result<(), DecompressError> {
    let mut branch = ctx.read_encoded()? as i16;
    let delta = ctx.read_encoded()? as i16;
    let entries = read_count(ctx)?;
    let mut offset = ctx.read_encoded()? as u16;

    for i in 0..entries {
        if i > 0 {
            branch = branch.wrapping_sub(RECORD_LEN as i16);
            offset = if delta != 0 {
                offset.wrapping_add(delta as u16)
            } else {
                ctx.read_encoded()? as u16
            };
        }

        ctx.ensure_output(RECORD_LEN)?;
        ctx.write_u16(OP_BSR_W)?;
        ctx.write_u16(branch as u16)?;
        ctx.write_u16(OP_JMP_A5)?;
        ctx.write_u16(offset)?;
    }
    Ok(())
}

/// `value n` → `n + 1` copies of `value` at `width` bytes.
fn run_length(ctx: &mut DecodeContext<'_>, width: usize) -> Result<(), DecompressError> {
    let value = ctx.read_encoded()? as u32;
    let count = read_count(ctx)?;

    let total = count
        .checked_add(1)
        .and_then(|n| n.checked_mul(width))
        .ok_or(DecompressError::OutputOutOfBounds)?;
    ctx.ensure_output(total)?;

    for _ in 0..=count {
        match width {
            1 => ctx.write_u8(value as u8)?,
            _ => ctx.write_u16(value as u16)?,
        }
    }
    Ok(())
}

/// `value n d*n` with raw signed byte deltas → `n + 1` words.
fn diff_word(ctx: &mut DecodeContext<'_>) -> Result<(), DecompressError> {
    let mut value = ctx.read_encoded()?;
    let count = read_count(ctx)?;

    for i in 0..=count {
        if i > 0 {
            let delta = ctx.read_u8()? as i8;
            value = value.wrapping_add(i32::from(delta));
        }
        ctx.write_u16(value as u16)?;
    }
    Ok(())
}

/// `value n d*n` with Encoded Value deltas → `n + 1` words or longs.
fn diff_encoded(ctx: &mut DecodeContext<'_>, width: usize) -> Result<(), DecompressError> {
    let mut value = ctx.read_encoded()?;
    let count = read_count(ctx)?;

    for i in 0..=count {
        if i > 0 {
            value = value.wrapping_add(ctx.read_encoded()?);
        }
        match width {
            2 => ctx.write_u16(value as u16)?,
            _ => ctx.write_u32(value as u32)?,
        }
    }
    Ok(())
}
