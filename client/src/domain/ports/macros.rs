//! Helper macro generating port error enums with `impl Into` constructors.
//!
//! Every variant gets a snake-case constructor, so adapters write
//! `RestTransportError::network("connection refused")` instead of spelling out
//! struct variants.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
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
                        #[doc = concat!("Detail `", stringify!($field), "` of the failure.")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated constructors.
    define_port_error! {
        pub enum ExampleTransportError {
            Network { message: String } => "network: {message}",
            Status { status: u16 } => "status {status}",
            Rejected { status: u16, status_text: String } => "rejected {status}: {status_text}",
            Closed => "closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleTransportError::network("connection refused");
        assert_eq!(err.to_string(), "network: connection refused");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ExampleTransportError::status(404_u16);
        assert_eq!(err.to_string(), "status 404");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleTransportError::rejected(401_u16, "Unauthorized");
        assert_eq!(err.to_string(), "rejected 401: Unauthorized");
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(ExampleTransportError::closed(), ExampleTransportError::Closed);
    }
}
