use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn mul_div255_identity_at_full_scale() {
    assert_eq!(mul_div255_u8(200, 255), 200);
    assert_eq!(mul_div255_u8(200, 0), 0);
}

#[test]
fn cross_sign_follows_orientation() {
    let x = Vec2::new(1.0, 0.0);
    let y = Vec2::new(0.0, 1.0);
    assert_eq!(cross(x, y), 1.0);
    assert_eq!(cross(y, x), -1.0);
}
