/// Smallest and largest value of a key type.
///
/// Used by [`RedBlackTree::validate`] to bound the key range checked at the
/// root. Implement it for custom key types, or use
/// [`RedBlackTree::validate_within`] to pass the bounds explicitly.
///
/// [`RedBlackTree::validate`]: crate::RedBlackTree::validate
/// [`RedBlackTree::validate_within`]: crate::RedBlackTree::validate_within
pub trait Bounded {
    fn min_bound() -> Self;
    fn max_bound() -> Self;
}

macro_rules! impl_bounded {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bounded for $ty {
                #[inline]
                fn min_bound() -> Self {
                    <$ty>::MIN
                }

                #[inline]
                fn max_bound() -> Self {
                    <$ty>::MAX
                }
            }
        )*
    };
}

impl_bounded!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char);

impl Bounded for bool {
    fn min_bound() -> Self {
        false
    }

    fn max_bound() -> Self {
        true
    }
}

/// Length in chars of [`String::max_bound`].
pub const STRING_MAX_BOUND_LEN: usize = 255;

impl Bounded for String {
    fn min_bound() -> Self {
        String::new()
    }

    /// There is no largest string. This one only beats strings that don't
    /// start with 255 `char::MAX`, which covers any realistic key.
    fn max_bound() -> Self {
        std::iter::repeat(char::MAX)
            .take(STRING_MAX_BOUND_LEN)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bounds() {
        assert_eq!(i8::min_bound(), -128);
        assert_eq!(i8::max_bound(), 127);
        assert_eq!(i16::min_bound(), -32768);
        assert_eq!(i32::max_bound(), 2_147_483_647);
        assert_eq!(i64::min_bound(), -9_223_372_036_854_775_808);
        assert_eq!(isize::max_bound(), isize::MAX);
        assert_eq!(u8::min_bound(), 0);
        assert_eq!(u8::max_bound(), 255);
        assert_eq!(u64::max_bound(), u64::MAX);
        assert_eq!(usize::min_bound(), 0);
        assert_eq!(u128::max_bound(), u128::MAX);
    }

    #[test]
    fn char_and_bool_bounds() {
        assert_eq!(char::min_bound(), '\0');
        assert_eq!(char::max_bound(), '\u{10FFFF}');
        assert!(!bool::min_bound());
        assert!(bool::max_bound());
    }

    #[test]
    fn string_bounds() {
        assert_eq!(String::min_bound(), "");
        let max = String::max_bound();
        assert_eq!(max.chars().count(), STRING_MAX_BOUND_LEN);
        assert!(max.as_str() > "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz");
        assert!(max.as_str() > "\u{10FFFF}");
    }
}
