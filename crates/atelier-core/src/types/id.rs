//! Typed ids for every entity the hub handles.
//!
//! Each id is its own newtype over [`uuid::Uuid`], so a `UserId` cannot be
//! handed to an API expecting a `MessageId`. Identity ids (users, sessions,
//! channels) are random v4. Event ids (messages, notifications) are v7:
//! their byte order follows the creation instant, so `>` on two event ids
//! compares creation order and an event id can serve directly as a replay
//! cursor. With the `sqlx` feature the ids also bind as Postgres `uuid`
//! columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares an id newtype.
///
/// `: random` mints v4 ids. `: time_ordered` mints v7 ids and derives
/// `Ord`, since ordering them is meaningful.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident: random
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        define_id!(@shared $name);
    };
    (
        $(#[$meta:meta])*
        $name:ident: time_ordered
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint an id stamped with the current instant.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        define_id!(@shared $name);
    };
    (@shared $name:ident) => {
        impl $name {
            /// Wrap an existing uuid.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Unwrap to the raw uuid.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Borrow the raw uuid.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// A user of the modeling app.
    UserId: random
);

define_id!(
    /// One connected device or browser tab.
    SessionId: random
);

define_id!(
    /// One live delivery channel.
    ChannelId: random
);

define_id!(
    /// A chat message. Time-ordered.
    MessageId: time_ordered
);

define_id!(
    /// A notification. Time-ordered.
    NotificationId: time_ordered
);
