//! `define_port_error!` builds the error enum for a driven port.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept `impl Into<T>`, so adapters can write
//! `AppointmentRepositoryError::query("timeout")` without allocating first.
//! `kind()` returns the variant's snake_case name for structured log fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*

            /// Snake_case variant name, stable across message changes.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant { .. } => ::paste::paste! {
                            stringify!([<$variant:snake>])
                        },
                    )*
                }
            }
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant {
                    $($field: $field.into()),*
                }
            }
        }
    };
}

pub(crate) use define_port_error;
