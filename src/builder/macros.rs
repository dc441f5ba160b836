//! Macros for declaring state tags.

/// Generate a `State` implementation for a fieldless enum.
///
/// Each variant may carry an explicit display name; otherwise the variant
/// identifier is used.
///
/// # Example
///
/// ```
/// use kickguard::state_enum;
/// use kickguard::core::State;
///
/// state_enum! {
///     pub enum GateState {
///         Closed = "GATE_CLOSED",
///         Open,
///     }
/// }
///
/// assert_eq!(GateState::Closed.name(), "GATE_CLOSED");
/// assert_eq!(GateState::Open.name(), "Open");
/// ```
#[macro_export]
macro_rules! state_enum {
    (@label $variant:ident, $label:literal) => {
        $label
    };
    (@label $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@label $variant $(, $label)?)),*
                }
            }
        }
    };
}
