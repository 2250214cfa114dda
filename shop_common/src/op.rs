//! Boilerplate operator implementations for single-field newtypes.

/// Implements a std::ops trait for a tuple newtype by delegating to the inner value.
///
/// * `op!(binary Money, Add, add)` implements `Money + Money`
/// * `op!(inplace Money, AddAssign, add_assign)` implements `Money += Money`
/// * `op!(unary Money, Neg, neg)` implements `-Money`
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
