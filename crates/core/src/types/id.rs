//! Newtype IDs for bookings and blocked periods.
//!
//! Both collections hand out plain integer ids. The `define_id!` macro wraps
//! them so a blocked-period id can never be passed where a booking id is
//! expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`, `next()`
/// - `From<i32>`, `Into<i32>` and `FromStr` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use rjukan_stays_core::define_id;
/// define_id!(GuestId);
/// define_id!(RoomId);
///
/// let guest = GuestId::new(1);
/// assert_eq!(guest.next(), Some(GuestId::new(2)));
/// assert_eq!(GuestId::new(i32::MAX).next(), None);
///
/// // These are different types, so this won't compile:
/// // let _: GuestId = RoomId::new(1);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// The id handed out when a collection is empty.
            pub const FIRST: Self = Self(1);

            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }

            /// The id following this one, or `None` once the id space is used up.
            #[must_use]
            pub const fn next(&self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(BookingId);
define_id!(BlockedDateId);

/// Next id for a collection: one past the largest existing id, or
/// [`FIRST`](BookingId::FIRST) when the collection is empty.
///
/// Ids of deleted records are never reused while a larger id survives.
/// Returns `None` when the largest existing id has no successor.
pub fn next_id<I>(
    existing: impl IntoIterator<Item = I>,
    first: I,
    step: impl Fn(&I) -> Option<I>,
) -> Option<I>
where
    I: Ord,
{
    match existing.into_iter().max() {
        Some(max) => step(&max),
        None => Some(first),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_empty_collection_starts_at_one() {
        let ids: Vec<BookingId> = Vec::new();
        assert_eq!(
            next_id(ids, BookingId::FIRST, BookingId::next),
            Some(BookingId::new(1))
        );
    }

    #[test]
    fn test_next_id_is_max_plus_one_not_gap_fill() {
        let ids = [BookingId::new(1), BookingId::new(3)];
        assert_eq!(
            next_id(ids, BookingId::FIRST, BookingId::next),
            Some(BookingId::new(4))
        );
    }

    #[test]
    fn test_next_id_exhausted_at_max() {
        let ids = [BookingId::new(5), BookingId::new(i32::MAX)];
        assert_eq!(next_id(ids, BookingId::FIRST, BookingId::next), None);
        assert_eq!(BlockedDateId::new(i32::MAX).next(), None);
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&BlockedDateId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_id_from_str() {
        let id: BookingId = " 12 ".parse().unwrap();
        assert_eq!(id.as_i32(), 12);
        assert!("twelve".parse::<BookingId>().is_err());
    }
}
