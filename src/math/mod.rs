use std::cmp::Ordering;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// Total lexicographic order on coordinate triples.
///
/// Uses `f64::total_cmp`, so every position (including signed zeros and
/// NaN payloads) has one canonical place. This is the vertex order used
/// for export, which must match between an encoder and a decoder.
#[must_use]
pub fn lexicographic_order(a: &Point3, b: &Point3) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

/// Bit-exact key identifying a coordinate triple.
///
/// Two positions unify to the same mesh vertex iff their keys are equal.
#[must_use]
pub fn position_key(p: &Point3) -> [u64; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_order_is_coordinate_major() {
        let a = Point3::new(1.0, 9.0, 9.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 1.0);
        assert_eq!(lexicographic_order(&a, &b), Ordering::Less);
        assert_eq!(lexicographic_order(&b, &c), Ordering::Less);
        assert_eq!(lexicographic_order(&c, &c), Ordering::Equal);
    }

    #[test]
    fn position_key_distinguishes_signed_zero() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(-0.0, 0.0, 0.0);
        assert_ne!(position_key(&a), position_key(&b));
    }
}
