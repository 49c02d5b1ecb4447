//! Procedural macros for ruleguard.
//!
//! This crate provides `#[derive(Inspect)]`, which attaches rule descriptors to
//! a struct and its fields and implements `ruleguard::Inspect` for it.

use proc_macro::TokenStream;

mod inspect;

/// Derive `ruleguard::Inspect` for a struct with named fields.
///
/// # Attributes
///
/// On the struct or on a field:
///
/// - `#[rule(not_null)]` - a rule whose validator reference is its kind
/// - `#[rule(length(min = 3, max = 50))]` - a rule with parameters; any
///   `serde::Serialize` expression works as a value
/// - `#[rule(email(required = true, message_key = "user.email"))]` - reserved
///   keys `validator`, `message_key` and `required` set the descriptor itself
/// - `#[rule(exempt)]` - the exempt-from-validation marker
/// - `#[meta(audited)]` - a descriptor without a validator reference
///
/// On a field:
///
/// - `#[inspect(skip)]` - leave the field out entirely
/// - `#[inspect(synthetic)]` - declare the field but never validate or read it
///
/// Several rules may share one attribute: `#[rule(not_null, email)]`.
///
/// # Example
///
/// ```rust,ignore
/// use ruleguard::prelude::*;
///
/// #[derive(Inspect)]
/// struct CreateUser {
///     #[rule(email(required = true))]
///     email: String,
///
///     #[rule(length(min = 3, max = 50))]
///     username: String,
/// }
/// ```
#[proc_macro_derive(Inspect, attributes(rule, meta, inspect))]
pub fn derive_inspect(input: TokenStream) -> TokenStream {
    inspect::derive_inspect_impl(input)
}
