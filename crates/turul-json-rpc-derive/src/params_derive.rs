//! Implementation of #[derive(JsonRpcParams)]

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::utils::{extract_container_meta, extract_field_meta};

/// A field that takes part in binding, in declaration order
struct BoundField {
    ident: syn::Ident,
    wire_name: String,
    type_name: String,
}

/// Rendered type for error messages, e.g. `Option<String>`
fn type_name(ty: &syn::Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

pub fn derive_json_rpc_params_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let container = extract_container_meta(&input.attrs)?;

    let named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => Some(&fields.named),
            Fields::Unit => None,
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "JsonRpcParams can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "JsonRpcParams can only be derived for structs",
            ));
        }
    };

    let mut bound = Vec::new();
    for field in named.into_iter().flatten() {
        let meta = extract_field_meta(&field.attrs)?;
        if meta.skip {
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let ident_name = ident.unraw().to_string();
        let wire_name = match (meta.rename, container.rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(&ident_name),
            (None, None) => ident_name,
        };
        bound.push(BoundField {
            ident,
            wire_name,
            type_name: type_name(&field.ty),
        });
    }

    let slots = bound.iter().map(|field| {
        let wire_name = &field.wire_name;
        let type_name = &field.type_name;
        quote! {
            turul_json_rpc_codec::params::FieldSlot {
                name: #wire_name,
                type_name: #type_name,
            }
        }
    });

    let case_insensitive = container.case_insensitive;
    let bind_named = if bound.is_empty() {
        quote! {
            let _ = map;
            Ok(<Self as ::core::default::Default>::default())
        }
    } else {
        let arms = bound.iter().enumerate().map(|(index, field)| {
            let ident = &field.ident;
            quote! {
                if turul_json_rpc_codec::params::key_matches(&key, &fields[#index], #case_insensitive) {
                    value.#ident = turul_json_rpc_codec::params::decode_named(raw, &fields[#index])?;
                    continue;
                }
            }
        });
        quote! {
            let fields = <Self as turul_json_rpc_codec::params::JsonRpcParams>::fields();
            let mut value = <Self as ::core::default::Default>::default();
            for (key, raw) in map {
                #(#arms)*
            }
            Ok(value)
        }
    };

    let bind_positional = if bound.is_empty() {
        quote! {
            turul_json_rpc_codec::params::check_arity(&values, &[])?;
            Ok(<Self as ::core::default::Default>::default())
        }
    } else {
        let steps = bound.iter().enumerate().map(|(index, field)| {
            let ident = &field.ident;
            quote! {
                if let Some(raw) = values.next() {
                    value.#ident =
                        turul_json_rpc_codec::params::decode_positional(raw, #index, &fields[#index])?;
                }
            }
        });
        quote! {
            let fields = <Self as turul_json_rpc_codec::params::JsonRpcParams>::fields();
            turul_json_rpc_codec::params::check_arity(&values, fields)?;
            let mut value = <Self as ::core::default::Default>::default();
            let mut values = values.into_iter();
            #(#steps)*
            Ok(value)
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics turul_json_rpc_codec::params::JsonRpcParams for #name #ty_generics #where_clause {
            fn fields() -> &'static [turul_json_rpc_codec::params::FieldSlot] {
                const FIELDS: &[turul_json_rpc_codec::params::FieldSlot] = &[#(#slots),*];
                FIELDS
            }

            fn bind_named(
                map: turul_json_rpc_codec::serde_json::Map<::std::string::String, turul_json_rpc_codec::serde_json::Value>,
            ) -> ::core::result::Result<Self, turul_json_rpc_codec::params::BindError> {
                #bind_named
            }

            fn bind_positional(
                values: ::std::vec::Vec<turul_json_rpc_codec::serde_json::Value>,
            ) -> ::core::result::Result<Self, turul_json_rpc_codec::params::BindError> {
                #bind_positional
            }
        }
    })
}
