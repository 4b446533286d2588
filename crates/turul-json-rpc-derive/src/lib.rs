//! # JSON-RPC Derive Macros
//!
//! `#[derive(JsonRpcParams)]` generates the ordered field list and the
//! by-name / by-position binders that `turul-json-rpc-codec` uses to decode
//! request `params` onto a typed struct.
//!
//! Use it through the re-export in `turul_json_rpc_codec`; the generated code
//! refers to that crate by name.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod params_derive;
mod utils;


/// Derive macro for binding JSON-RPC params onto a struct
///
/// The struct must implement `Default`, and every bound field must implement
/// `serde::de::DeserializeOwned`. Fields are bound in declaration order for
/// positional params and by wire name for named params.
///
/// # Attributes
///
/// - `#[rpc(rename_all = "...")]` - Wire-name rule for all fields (`lowercase`,
///   `UPPERCASE`, `PascalCase`, `camelCase`, `snake_case`,
///   `SCREAMING_SNAKE_CASE`, `kebab-case`, `SCREAMING-KEBAB-CASE`)
/// - `#[rpc(case_insensitive)]` - Match named params ignoring ASCII case
/// - `#[rpc(rename = "...")]` - Wire name of one field
/// - `#[rpc(skip)]` - Leave a field out of binding; it keeps its default
///
/// `#[serde(rename = "...")]`, `#[serde(rename_all = "...")]` and
/// `#[serde(skip)]` are honoured when no `rpc` attribute says otherwise.
///
/// # Example
///
/// ```rust,ignore
/// use turul_json_rpc_codec::JsonRpcParams;
///
/// #[derive(Default, JsonRpcParams)]
/// #[rpc(rename_all = "UPPERCASE")]
/// struct MultiplyArgs {
///     a: i64,
///     b: i64,
/// }
/// ```
#[proc_macro_derive(JsonRpcParams, attributes(rpc))]
pub fn derive_json_rpc_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    params_derive::derive_json_rpc_params_impl(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
