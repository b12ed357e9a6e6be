//! Back-to-front ordering of blended drawables

use std::cmp::Ordering;

/// Something the compositor draws, by index into its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawItem {
    /// Face of the shape
    Face(usize),
    /// Enabled sphere slot
    Sphere(usize),
}

/// Stable sort by `distance`, farthest first
///
/// Items at equal distance keep their input order.
pub fn sort_back_to_front<T, F>(items: &mut [T], mut distance: F)
where
    F: FnMut(&T) -> f32,
{
    items.sort_by(|a, b| compare_far_first(distance(a), distance(b)));
}

/// Farthest-first comparison; NaN distances sort last
fn compare_far_first(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farthest_first_with_stable_ties() {
        let mut items = vec![("a", 5.0), ("b", 2.0), ("c", 8.0), ("d", 2.0)];
        sort_back_to_front(&mut items, |(_, d)| *d);
        assert_eq!(items, vec![("c", 8.0), ("a", 5.0), ("b", 2.0), ("d", 2.0)]);
    }

    #[test]
    fn test_nan_distances_sort_last() {
        let mut items = vec![f32::NAN, 1.0, 3.0];
        sort_back_to_front(&mut items, |d| *d);
        assert_eq!(&items[..2], &[3.0, 1.0]);
        assert!(items[2].is_nan());
    }
}
