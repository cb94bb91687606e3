// [libs/domain/models/src/ids.rs]
//! Identificadores soberanos de entidad, envueltos en newtypes para que el
//! compilador rechace el intercambio accidental entre `TenantId` y
//! `ProductionId` en las firmas de los repositorios.

use serde::{Deserialize, Serialize};
use std::fmt;
use typeshare::typeshare;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident) => {
        #[typeshare]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
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

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_newtype!(TenantId);
uuid_newtype!(ProductionId);
uuid_newtype!(InvitationId);
