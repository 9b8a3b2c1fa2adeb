use jiff::civil::{Date, DateTime};
use jiff::{Timestamp, Zoned};

use crate::{Def, Describe, ScalarType, Shape};

macro_rules! impl_jiff {
    ($($ty:ty => $ident:literal, $scalar:ident;)*) => {
        $(
            impl Describe for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape::builder::<Self>($ident)
                        .def(Def::Scalar(ScalarType::$scalar))
                        .build()
                };
            }
        )*
    };
}

impl_jiff! {
    Date => "Date", Date;
    DateTime => "DateTime", DateTime;
    Timestamp => "Timestamp", Timestamp;
    Zoned => "Zoned", Zoned;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_kinds_need_a_zone() {
        assert!(Date::SHAPE.scalar_type().is_some_and(ScalarType::is_civil));
        assert!(DateTime::SHAPE.scalar_type().is_some_and(ScalarType::is_civil));
        assert!(!Timestamp::SHAPE.scalar_type().is_some_and(ScalarType::is_civil));
        assert_eq!(Zoned::SHAPE.scalar_type(), Some(ScalarType::Zoned));
    }
}
