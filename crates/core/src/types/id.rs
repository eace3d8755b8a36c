//! Typed Shopify global IDs.
//!
//! Shopify identifies every resource with a global ID of the form
//! `gid://shopify/<Resource>/<local>`. Older catalog code paths hand around the
//! bare numeric part instead (`"8123456789"`). The `define_gid!` macro creates
//! a wrapper per resource that accepts either form, always stores the fully
//! qualified one, and refuses IDs for a different resource so a product ID can
//! never be sent where a variant ID is expected.

use thiserror::Error;

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors produced when parsing a global ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("ID is empty")]
    Empty,
    #[error("expected a {expected} ID, got a {found} ID")]
    WrongResource {
        expected: &'static str,
        found: String,
    },
    #[error("malformed {resource} ID: {raw}")]
    Malformed { resource: &'static str, raw: String },
}

/// Normalize `raw` into a fully qualified global ID for `resource`.
///
/// Bare IDs are only accepted when `allow_bare` is set and the value is purely
/// numeric; cart IDs carry an opaque token and must always be fully qualified.
///
/// # Errors
///
/// Returns `IdError` if the value is empty, names another resource, or is not
/// a global ID at all.
pub fn normalize_gid(raw: &str, resource: &'static str, allow_bare: bool) -> Result<String, IdError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(IdError::Empty);
    }

    if let Some(rest) = raw.strip_prefix(GID_PREFIX) {
        let Some((found, local)) = rest.split_once('/') else {
            return Err(IdError::Malformed {
                resource,
                raw: raw.to_string(),
            });
        };
        if found != resource {
            return Err(IdError::WrongResource {
                expected: resource,
                found: found.to_string(),
            });
        }
        if local.is_empty() {
            return Err(IdError::Malformed {
                resource,
                raw: raw.to_string(),
            });
        }
        return Ok(raw.to_string());
    }

    if allow_bare && raw.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(format!("{GID_PREFIX}{resource}/{raw}"));
    }

    Err(IdError::Malformed {
        resource,
        raw: raw.to_string(),
    })
}

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` through the validating `TryFrom<String>`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`, `FromStr`
/// - `parse()`, `as_str()`, `local_part()` and `numeric()` accessors
///
/// # Example
///
/// ```rust
/// # use scamp_core::define_gid;
/// define_gid!(OrderId, "Order", bare);
///
/// let id = OrderId::parse("42").unwrap();
/// assert_eq!(id.as_str(), "gid://shopify/Order/42");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal, bare) => {
        $crate::define_gid!(@impl $name, $resource, true);
    };
    ($name:ident, $resource:literal) => {
        $crate::define_gid!(@impl $name, $resource, false);
    };
    (@impl $name:ident, $resource:literal, $allow_bare:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Shopify resource name embedded in the global ID.
            pub const RESOURCE: &'static str = $resource;

            /// Parse and normalize an ID.
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the value is not an ID for this resource.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::normalize_gid(raw, $resource, $allow_bare).map(Self)
            }

            /// The fully qualified global ID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The part after `gid://shopify/<Resource>/`.
            #[must_use]
            pub fn local_part(&self) -> &str {
                let prefix_len = $crate::GID_PREFIX.len() + $resource.len() + 1;
                self.0.get(prefix_len..).unwrap_or_default()
            }

            /// The numeric ID, when the local part is numeric.
            #[must_use]
            pub fn numeric(&self) -> Option<u64> {
                self.local_part().parse().ok()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ProductId, "Product", bare);
define_gid!(VariantId, "ProductVariant", bare);
define_gid!(CartId, "Cart");
define_gid!(CartLineId, "CartLine");
