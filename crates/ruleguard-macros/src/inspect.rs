//! Implementation of #[derive(Inspect)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, LitStr};

pub fn derive_inspect_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldSpec {
    ident: syn::Ident,
    name: String,
    rules: Vec<TokenStream2>,
    synthetic: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Inspect cannot be derived for generic types; implement it by hand",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inspect requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Inspect only works on structs",
            ))
        }
    };

    let type_rules = descriptors(&input.attrs)?;

    let mut specs = Vec::new();
    for field in fields {
        let (skip, synthetic) = inspect_flags(&field.attrs)?;
        if skip {
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name).to_string();
        specs.push(FieldSpec {
            ident,
            name,
            rules: descriptors(&field.attrs)?,
            synthetic,
        });
    }

    let members = specs.iter().map(|spec| {
        let field_name = &spec.name;
        let rules = &spec.rules;
        let synthetic = spec.synthetic.then(|| quote! { .synthetic() });
        quote! {
            .field(
                ::ruleguard::Member::field(#field_name)
                    #(.rule(#rules))*
                    #synthetic
            )
        }
    });

    let reads = specs.iter().filter(|spec| !spec.synthetic).map(|spec| {
        let field_name = &spec.name;
        let ident = &spec.ident;
        quote! {
            #field_name => ::ruleguard::__private::to_value(name, &self.#ident),
        }
    });

    Ok(quote! {
        impl ::ruleguard::Inspect for #name {
            fn metadata(&self) -> &::ruleguard::TypeMetadata {
                static METADATA: ::std::sync::OnceLock<::ruleguard::TypeMetadata> =
                    ::std::sync::OnceLock::new();
                METADATA.get_or_init(|| {
                    ::ruleguard::TypeMetadata::new(#type_name)
                        #(.rule(#type_rules))*
                        #(#members)*
                })
            }

            fn read_field(
                &self,
                name: &str,
            ) -> ::std::result::Result<::ruleguard::__private::Value, ::ruleguard::AccessError> {
                match name {
                    #(#reads)*
                    _ => ::std::result::Result::Err(
                        ::ruleguard::AccessError::no_such_member(#type_name, name),
                    ),
                }
            }
        }
    })
}

/// Parse `#[inspect(skip)]` and `#[inspect(synthetic)]`.
fn inspect_flags(attrs: &[Attribute]) -> syn::Result<(bool, bool)> {
    let mut skip = false;
    let mut synthetic = false;

    for attr in attrs.iter().filter(|a| a.path().is_ident("inspect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("synthetic") {
                synthetic = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `synthetic`"))
            }
        })?;
    }

    Ok((skip, synthetic))
}

/// Collect descriptor constructors from `#[rule(...)]` and `#[meta(...)]`.
fn descriptors(attrs: &[Attribute]) -> syn::Result<Vec<TokenStream2>> {
    let mut out = Vec::new();

    for attr in attrs {
        let is_rule = attr.path().is_ident("rule");
        if !is_rule && !attr.path().is_ident("meta") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            out.push(descriptor(meta, is_rule)?);
            Ok(())
        })?;
    }

    Ok(out)
}

/// One descriptor: `kind` or `kind(key = expr, ...)`.
fn descriptor(meta: ParseNestedMeta<'_>, is_rule: bool) -> syn::Result<TokenStream2> {
    let kind = meta
        .path
        .get_ident()
        .ok_or_else(|| meta.error("expected a rule kind"))?
        .to_string();
    let has_args = meta.input.peek(syn::token::Paren);

    if is_rule && kind == "exempt" {
        if has_args {
            return Err(meta.error("`exempt` takes no arguments"));
        }
        return Ok(quote! { ::ruleguard::RuleDescriptor::exempt() });
    }

    let constructor = if is_rule {
        quote! { ::ruleguard::RuleDescriptor::rule(#kind) }
    } else {
        quote! { ::ruleguard::RuleDescriptor::marker(#kind) }
    };

    let mut calls = Vec::new();
    if has_args {
        meta.parse_nested_meta(|arg| {
            let key = arg
                .path
                .get_ident()
                .ok_or_else(|| arg.error("expected a parameter name"))?
                .to_string();
            let value: Expr = arg.value()?.parse()?;

            // `validator`, `message_key` and `required` configure the descriptor itself.
            calls.push(match key.as_str() {
                "validator" | "message_key" => {
                    let method = syn::Ident::new(&key, proc_macro2::Span::call_site());
                    let lit = string_literal(&value, &key)?;
                    quote! { .#method(#lit) }
                }
                "required" => quote! { .required(#value) },
                _ => quote! { .param(#key, #value) },
            });
            Ok(())
        })?;
    }

    Ok(quote! { #constructor #(#calls)* })
}

fn string_literal(value: &Expr, key: &str) -> syn::Result<LitStr> {
    match value {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(
            other,
            format!("`{key}` expects a string literal"),
        )),
    }
}
