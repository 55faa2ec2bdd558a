//! Helper macro generating the port error enums.
//!
//! Every port error in this crate has the same shape: a small closed enum
//! whose variants are either bare or carry one diagnostic `message`, each
//! with a snake_case constructor accepting anything `Into<String>`. The
//! macro keeps the port definitions declarative.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $field:ident: String })? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $({ $field: String })?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Construct [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<String>)?) -> Self {
                        Self::$variant $({ $field: $field.into() })?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ExamplePortError {
            Gone => "resource gone",
            Broken { message: String } => "broken: {message}",
        }
    }

    #[test]
    fn message_variants_accept_anything_stringy() {
        let err = ExamplePortError::broken("pipe");
        assert_eq!(err.to_string(), "broken: pipe");
        assert_eq!(
            err,
            ExamplePortError::Broken {
                message: "pipe".to_owned()
            }
        );
    }

    #[test]
    fn bare_variants_get_constructors_too() {
        assert_eq!(ExamplePortError::gone().to_string(), "resource gone");
    }
}
