/// Declares a C-like enum over a fixed-width wire representation, with an
/// `Unknown(repr)` catch-all so a value this build doesn't recognize is
/// preserved instead of rejected. This is the shape used throughout the
/// message modules for header fields (message type, OXM class, action
/// type, ...): every such field is taken off the wire as an integer first,
/// and turning it into something unrecognized should never itself be a
/// decode error.
macro_rules! enum_with_unknown {
    (
        $( #[$attr:meta] )*
        pub enum $name:ident($repr:ty) {
            $( $(#[$variant_attr:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $( #[$attr] )*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_attr])* $variant, )+
            /// A value not among the known variants above.
            Unknown($repr),
        }

        impl ::core::convert::From<$repr> for $name {
            fn from(value: $repr) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }
        }

        impl ::core::convert::From<$name> for $repr {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )+
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}
