use bitstream::{BitReader, BitWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u64 },
    Align,
    U8(u8),
    U16(u16),
    I16(i16),
    U24(u32),
    U32(u32),
    Bytes(Vec<u8>),
    CString(Vec<u8>),
}

fn mask_value(bits: u8, value: u64) -> u64 {
    if bits >= 64 {
        value
    } else {
        let mask = (1u64 << bits) - 1;
        value & mask
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=64, any::<u64>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        Just(Op::Align),
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<i16>().prop_map(Op::I16),
        (0u32..=0x00FF_FFFF).prop_map(Op::U24),
        any::<u32>().prop_map(Op::U32),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Op::Bytes),
        prop::collection::vec(1u8..=255, 0..16).prop_map(Op::CString),
    ]
}

fn is_aligned_op(op: &Op) -> bool {
    !matches!(op, Op::Bit(_) | Op::Bits { .. } | Op::Align)
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = BitWriter::new();

        for op in &ops {
            if is_aligned_op(op) {
                writer.align_to_byte();
            }
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Align => writer.align_to_byte(),
                Op::U8(v) => writer.write_u8_aligned(*v).unwrap(),
                Op::U16(v) => writer.write_u16_aligned(*v).unwrap(),
                Op::I16(v) => writer.write_i16_aligned(*v).unwrap(),
                Op::U24(v) => writer.write_u24_aligned(*v).unwrap(),
                Op::U32(v) => writer.write_u32_aligned(*v).unwrap(),
                Op::Bytes(v) => writer.write_bytes(v).unwrap(),
                Op::CString(v) => {
                    writer.write_bytes(v).unwrap();
                    writer.write_u8_aligned(0).unwrap();
                }
            }
        }

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);

        for op in &ops {
            if is_aligned_op(op) {
                reader.align_to_byte().unwrap();
            }
            match op {
                Op::Bit(b) => prop_assert_eq!(reader.read_bit().unwrap(), *b),
                Op::Bits { bits, value } => prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value),
                Op::Align => reader.align_to_byte().unwrap(),
                Op::U8(v) => prop_assert_eq!(reader.read_u8_aligned().unwrap(), *v),
                Op::U16(v) => prop_assert_eq!(reader.read_u16_aligned().unwrap(), *v),
                Op::I16(v) => prop_assert_eq!(reader.read_i16_aligned().unwrap(), *v),
                Op::U24(v) => prop_assert_eq!(reader.read_u24_aligned().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32_aligned().unwrap(), *v),
                Op::Bytes(v) => prop_assert_eq!(reader.read_bytes(v.len()).unwrap(), v.as_slice()),
                Op::CString(v) => prop_assert_eq!(reader.read_until(0).unwrap(), v.as_slice()),
            }
        }
    }

    #[test]
    fn prop_reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..64), widths in prop::collection::vec(0u8..=70, 0..32)) {
        let mut reader = BitReader::new(&data);
        for width in widths {
            let _ = reader.read_bits(width);
            let _ = reader.align_to_byte();
            let _ = reader.read_u24_aligned();
            let _ = reader.read_until(0);
        }
    }
}
