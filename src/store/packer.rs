use crate::{
    splat::{
        f16::{pack_f32s_to_u32, unpack_u32_to_f32s},
        Position,
    },
    store::Texel,
};


/// Packs one batch of positions and colors starting at tile index `start`.
///
/// Positions keep their exact f32 bit patterns; colors are quantized to 8
/// bits per channel. The output always spans the full batch so recycled
/// slots past the real splat count are overwritten with zero texels. When an
/// attribute array is shorter than the positions, packing stops at the
/// shortest array.
pub fn pack_position_color(
    start: usize,
    batch_size: usize,
    positions: &[Position],
    colors: &[[f32; 4]],
) -> Vec<Texel> {
    let mut texels = vec![Texel::default(); batch_size];
    let count = positions.len().min(colors.len());

    for (slot, index) in (start..count.min(start + batch_size)).enumerate() {
        let position = positions[index];

        texels[slot] = [
            position[0].to_bits(),
            position[1].to_bits(),
            position[2].to_bits(),
            pack_rgba8(colors[index]),
        ];
    }

    texels
}

/// Covariance half of the batch: six values as three f16 pairs per splat.
pub fn pack_covariance(
    start: usize,
    batch_size: usize,
    covariance_a: &[[f32; 3]],
    covariance_b: &[[f32; 3]],
) -> Vec<Texel> {
    let mut texels = vec![Texel::default(); batch_size];
    let count = covariance_a.len().min(covariance_b.len());

    for (slot, index) in (start..count.min(start + batch_size)).enumerate() {
        let a = covariance_a[index];
        let b = covariance_b[index];

        texels[slot] = [
            pack_f32s_to_u32(a[0], a[1]),
            pack_f32s_to_u32(a[2], b[0]),
            pack_f32s_to_u32(b[1], b[2]),
            0,
        ];
    }

    texels
}


pub fn pack_rgba8(color: [f32; 4]) -> u32 {
    quantize_u8(color[0])
        | quantize_u8(color[1]) << 8
        | quantize_u8(color[2]) << 16
        | quantize_u8(color[3]) << 24
}

#[inline]
fn quantize_u8(channel: f32) -> u32 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u32
}


pub fn unpack_position(texel: Texel) -> Position {
    [
        f32::from_bits(texel[0]),
        f32::from_bits(texel[1]),
        f32::from_bits(texel[2]),
    ]
}

pub fn unpack_rgba8(packed: u32) -> [u8; 4] {
    [
        (packed & 0xFF) as u8,
        (packed >> 8 & 0xFF) as u8,
        (packed >> 16 & 0xFF) as u8,
        (packed >> 24) as u8,
    ]
}

pub fn unpack_covariance(texel: Texel) -> ([f32; 3], [f32; 3]) {
    let (xx, xy) = unpack_u32_to_f32s(texel[0]);
    let (xz, yy) = unpack_u32_to_f32s(texel[1]);
    let (yz, zz) = unpack_u32_to_f32s(texel[2]);

    ([xx, xy, xz], [yy, yz, zz])
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn positions_keep_exact_bits() {
        let positions = [[1.5, -2.25, 1.0e-8]];
        let colors = [[0.0, 0.0, 0.0, 0.0]];

        let texels = pack_position_color(0, 4, &positions, &colors);

        assert_eq!(unpack_position(texels[0]), positions[0]);
    }

    #[test]
    fn colors_quantize_round_to_nearest_and_clamp() {
        assert_eq!(unpack_rgba8(pack_rgba8([0.0, 1.0, 0.5, 2.0])), [0, 255, 128, 255]);
        assert_eq!(unpack_rgba8(pack_rgba8([-0.5, 0.25, 0.002, 1.0])), [0, 64, 1, 255]);
    }

    #[test]
    fn covariance_survives_half_precision() {
        let covariance_a = [[0.5, -0.125, 2.0]];
        let covariance_b = [[1.5, 0.0625, -4.0]];

        let texels = pack_covariance(0, 4, &covariance_a, &covariance_b);
        let (a, b) = unpack_covariance(texels[0]);

        assert_eq!(a, covariance_a[0]);
        assert_eq!(b, covariance_b[0]);
        assert_eq!(texels[0][3], 0);
    }

    #[test]
    fn partial_batch_zero_fills_remaining_slots() {
        let positions = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let colors = [[1.0; 4], [1.0; 4]];

        let texels = pack_position_color(0, 4, &positions, &colors);

        assert_ne!(texels[0], Texel::default());
        assert_ne!(texels[1], Texel::default());
        assert_eq!(texels[2], Texel::default());
        assert_eq!(texels[3], Texel::default());
    }

    #[test]
    fn second_batch_reads_from_its_start_index() {
        let positions: Vec<Position> = (0..6).map(|i| [i as f32, 0.0, 0.0]).collect();
        let colors = vec![[1.0; 4]; 6];

        let texels = pack_position_color(4, 4, &positions, &colors);

        assert_eq!(unpack_position(texels[0]), [4.0, 0.0, 0.0]);
        assert_eq!(unpack_position(texels[1]), [5.0, 0.0, 0.0]);
        assert_eq!(texels[2], Texel::default());
    }

    #[test]
    fn packing_stops_at_shortest_attribute_array() {
        let positions = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let colors = [[1.0; 4]];

        let texels = pack_position_color(0, 4, &positions, &colors);

        assert_ne!(texels[0], Texel::default());
        assert_eq!(texels[1], Texel::default());
    }
}
