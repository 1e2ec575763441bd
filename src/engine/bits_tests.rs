//! Exhaustive test suite for `BitReader` edge cases.
use super::*;

#[test]
/// Sequential reads without offset across primitive types.
fn test_read_aligned_bytes() {
    let data = [0x12, 0x34, 0x56, 0x78];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_u8(8).unwrap(), 0x12);
    assert_eq!(reader.read_u16(16).unwrap(), 0x5634);
    assert_eq!(reader.read_u8(8).unwrap(), 0x78);
}

#[test]
/// Read fields spanning two bytes (non-aligned).
fn test_read_non_aligned_bytes() {
    let data = [0b11100000, 0b00001100];
    let mut reader = BitReader::new(&data);
    reader.read_u64(2).unwrap();
    assert_eq!(reader.read_u8(5).unwrap(), 24);
    assert_eq!(reader.read_u8(5).unwrap(), 25);
}

#[test]
/// Read a field that crosses byte boundaries after an initial offset.
fn test_read_spanning_multiple_bytes() {
    let data = [0b10101111, 0b11111010];
    let mut reader = BitReader::new(&data);
    reader.read_u64(4).unwrap();
    assert_eq!(reader.read_u8(8).unwrap(), 170);
    assert_eq!(reader.read_u8(4).unwrap(), 15);
}

#[test]
fn test_read_out_of_bounds() {
    let data = [0xFF];
    let mut reader = BitReader::new(&data);
    assert!(reader.read_u8(8).is_ok());
    assert!(matches!(
        reader.read_u8(1),
        Err(BitReaderError::OutOfBounds {
            asked: 1,
            available: 0
        })
    ));
}

#[test]
fn test_read_num_bit_too_high() {
    let data = [0xFF];
    let mut reader = BitReader::new(&data);
    assert!(matches!(
        reader.read_u8(9),
        Err(BitReaderError::TooLongForType { max: 8, asked: 9 })
    ));
    assert!(matches!(
        reader.read_u16(17),
        Err(BitReaderError::TooLongForType { max: 16, asked: 17 })
    ));
    assert!(matches!(
        reader.read_u32(33),
        Err(BitReaderError::TooLongForType { max: 32, asked: 33 })
    ));
    assert!(matches!(
        reader.read_u64(65),
        Err(BitReaderError::TooLongForType { max: 64, asked: 65 })
    ));
}

#[test]
fn test_read_max() {
    let data = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_u64(64).unwrap(), 0x8877665544332211);
}

#[test]
fn test_read_signed_sign_extends() {
    // 0xFE in 8 bits is -2.
    let data = [0xFE];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_i64(8).unwrap(), -2);

    // 4-bit field 0b1110 is -2 when sign-extended, 14 unsigned.
    let data = [0b1110_0000];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_i64(4).unwrap(), -2);
}

#[test]
fn test_read_and_out() {
    let data = [0x11, 0x22];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_u8(7).unwrap(), 0b0010001);
    assert_eq!(reader.read_u16(9).unwrap(), 0b001000100);
    assert!(matches!(
        reader.read_u8(2),
        Err(BitReaderError::OutOfBounds {
            asked: 2,
            available: 0
        })
    ))
}

#[test]
fn test_read_empty_buffer() {
    let data: [u8; 0] = [];
    let mut reader = BitReader::new(&data);
    assert!(matches!(
        reader.read_u8(1),
        Err(BitReaderError::OutOfBounds {
            asked: 1,
            available: 0
        })
    ))
}

#[test]
fn test_read_advance_cursor() {
    let data: [u8; 2] = [0xFF, 0xAF];
    let mut reader = BitReader::new(&data);
    assert!(reader.advance(12).is_ok());
    assert_eq!(reader.read_u16(4).unwrap(), 0b1010);
}

#[test]
fn test_read_out_of_bounds_advance_cursor() {
    let data: [u8; 2] = [0xFF, 0xFF];
    let mut reader = BitReader::new(&data);
    assert!(reader.advance(13).is_ok());
    assert!(matches!(
        reader.read_u16(4),
        Err(BitReaderError::OutOfBounds {
            asked: 4,
            available: 3
        })
    ));
}

#[test]
fn test_read_advance_bigger_than_buffer() {
    let data: [u8; 2] = [0xFF, 0xFF];
    let mut reader = BitReader::new(&data);
    assert!(matches!(
        reader.advance(17),
        Err(BitReaderError::OutOfBounds {
            asked: 17,
            available: 16
        })
    ));
}

#[test]
fn test_read_complete_slice() {
    let data = [0xFF, 0xAF, 0xE2, 0xF1, 0xBC];
    let mut reader = BitReader::new(&data);
    assert_eq!(
        reader.read_slice(data.len()).unwrap(),
        &[0xFF, 0xAF, 0xE2, 0xF1, 0xBC]
    );
}

#[test]
fn test_read_partial_slice() {
    let data = [0xFF, 0xAF, 0xE2, 0xF1, 0xBC];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_slice(3).unwrap(), &[0xFF, 0xAF, 0xE2]);
}

#[test]
fn test_read_out_of_bound_slice() {
    let data = [0xFF, 0xAF, 0xE2, 0xF1, 0xBC];
    let mut reader = BitReader::new(&data);
    assert!(matches!(
        reader.read_slice(data.len() + 1).unwrap_err(),
        BitReaderError::OutOfBounds {
            asked: 6,
            available: 5
        }
    ));
}

#[test]
fn test_read_non_aligned_slice() {
    let data = [0xFF, 0xAF, 0xE2, 0xF1, 0xBC];
    let mut reader = BitReader::new(&data);
    reader.bit_cursor = 4;
    assert!(matches!(
        reader.read_slice(4).unwrap_err(),
        BitReaderError::NonAlignedBit { cursor: 4 }
    ));
}

#[test]
fn test_read_remaining() {
    let data = [0x01, 0xAB, 0xCD, 0xEF];
    let mut reader = BitReader::new(&data);
    reader.read_u8(8).unwrap();
    assert_eq!(reader.read_remaining().unwrap(), &[0xAB, 0xCD, 0xEF]);
}
