//! Macro generating port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor
//! whose parameters take `impl Into<FieldType>`.

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
                $variant $( {
                    $(
                        #[doc = concat!("`", stringify!($field), "` detail of the error.")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build a `", stringify!($variant), "` error.")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = concat!("Build a `", stringify!($variant), "` error.")]
            #[must_use]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;
