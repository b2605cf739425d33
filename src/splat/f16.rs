use half::f16;


/// Packs two floats into one `u32` at half precision, first value in the low
/// 16 bits. The covariance texel layout depends on this bit order.
pub fn pack_f32s_to_u32(lower: f32, upper: f32) -> u32 {
    pack_f16s_to_u32(
        f16::from_f32(lower),
        f16::from_f32(upper),
    )
}

pub fn pack_f16s_to_u32(lower: f16, upper: f16) -> u32 {
    let upper_bits = (upper.to_bits() as u32) << 16;
    let lower_bits = lower.to_bits() as u32;
    upper_bits | lower_bits
}

pub fn unpack_u32_to_f16s(value: u32) -> (f16, f16) {
    let lower = f16::from_bits((value & 0xFFFF) as u16);
    let upper = f16::from_bits((value >> 16) as u16);
    (lower, upper)
}

pub fn unpack_u32_to_f32s(value: u32) -> (f32, f32) {
    let (lower, upper) = unpack_u32_to_f16s(value);
    (lower.to_f32(), upper.to_f32())
}
