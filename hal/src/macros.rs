#![macro_use]

// Event macros. These forward to `defmt` when the feature is enabled and
// only borrow their arguments otherwise, so call sites never need a cfg.

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = ($(&$x,)*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = ($(&$x,)*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = ($(&$x,)*);
    }};
}

/// Defines one flash register view (`NS` or `SEC` prefixed registers).
macro_rules! register_set {
    ($name:ident, $prefix:ident, $secure:literal, $doc:expr $(, { $($extra:tt)* })?) => {
        paste::paste! {
            #[doc = $doc]
            #[derive(Debug, PartialEq, Eq, Clone, Copy)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            pub struct $name {
                _priv: (),
            }

            impl $name {
                #[allow(dead_code)]
                pub(crate) const fn new() -> Self {
                    Self { _priv: () }
                }
            }

            impl RegisterSet for $name {
                fn keyr(&self) -> u32 {
                    [<$prefix KEYR>]
                }

                fn sr(&self) -> u32 {
                    [<$prefix SR>]
                }

                fn cr(&self) -> u32 {
                    [<$prefix CR>]
                }

                fn ccr(&self) -> u32 {
                    [<$prefix CCR>]
                }

                fn is_secure(&self) -> bool {
                    $secure
                }

                $($($extra)*)?
            }
        }
    };
}
