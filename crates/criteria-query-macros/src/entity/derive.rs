//! Implementation of the `#[derive(Entity)]` macro.
//!
//! This macro generates an implementation of the `Entity` trait, field name
//! constants for building criteria, and a conversion into an entity
//! reference when the struct has an id field.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_entity_attrs, parse_field_attrs};

/// Main implementation of the Entity derive macro.
pub fn entity_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Entity can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Entity can only be derived for structs",
            ))
        }
    };

    let entity_attrs = parse_entity_attrs(&input.attrs)?;
    let entity_name = entity_attrs
        .entity
        .unwrap_or_else(|| struct_name.to_string());

    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut metadata_calls: Vec<TokenStream> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut constants: Vec<(String, String)> = Vec::new();
    let mut id_field = None;

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if seen.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate criteria name '{query_name}'"),
            ));
        }
        seen.push(query_name.clone());

        if attrs.id {
            if id_field.is_some() {
                return Err(Error::new(field.span(), "only one field can be marked id"));
            }
            id_field = Some(field_name);
        }

        let const_str = to_screaming_snake_case(&query_name);
        if syn::parse_str::<syn::Ident>(&const_str).is_err() {
            return Err(Error::new(
                field.span(),
                format!("criteria name '{query_name}' does not form a valid constant name"),
            ));
        }
        if const_str == "ENTITY" {
            return Err(Error::new(
                field.span(),
                format!(
                    "criteria name '{query_name}' maps to constant ENTITY, which shadows Entity::ENTITY; use #[criteria(rename = \"...\")]"
                ),
            ));
        }
        if let Some((other, _)) = constants.iter().find(|(_, name)| *name == const_str) {
            return Err(Error::new(
                field.span(),
                format!("criteria names '{other}' and '{query_name}' both map to constant {const_str}"),
            ));
        }
        constants.push((query_name.clone(), const_str.clone()));

        let const_name = format_ident!("{}", const_str);
        field_constants.push(quote! {
            /// Criteria path of this field.
            pub const #const_name: &'static str = #query_name;
        });

        metadata_calls.push(match attrs.association {
            Some(target) => quote! { .association(#query_name, #target) },
            None => quote! { .field(#query_name) },
        });
    }

    let entity_ref = id_field.map(|id| {
        quote! {
            impl #impl_generics ::core::convert::From<&#struct_name #ty_generics> for ::criteria_query::Value #where_clause {
                fn from(entity: &#struct_name #ty_generics) -> Self {
                    ::criteria_query::Value::Entity(::criteria_query::EntityRef::new(
                        <#struct_name #ty_generics as ::criteria_query::Entity>::ENTITY,
                        ::core::clone::Clone::clone(&entity.#id),
                    ))
                }
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::criteria_query::Entity for #struct_name #ty_generics #where_clause {
            const ENTITY: &'static str = #entity_name;

            fn metadata() -> ::criteria_query::EntityMetadata {
                ::criteria_query::EntityMetadata::new(#entity_name)
                    #(#metadata_calls)*
            }
        }

        #entity_ref
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("createdAt"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("billing-address"), "BILLING_ADDRESS");
        assert_eq!(to_screaming_snake_case("userId"), "USER_ID");
    }

    fn expand(tokens: TokenStream) -> Result<String> {
        entity_derive_impl(syn::parse2(tokens)?).map(|out| out.to_string())
    }

    #[test]
    fn test_expands_metadata() {
        let out = expand(quote! {
            #[criteria(entity = "Person")]
            struct User {
                #[criteria(id)]
                id: i64,
                #[criteria(rename = "fullName")]
                name: String,
                #[criteria(association = "Address")]
                address: Address,
                #[criteria(skip)]
                cache: Vec<u8>,
            }
        })
        .unwrap();

        assert!(out.contains("const ENTITY : & 'static str = \"Person\""));
        assert!(out.contains(". field (\"fullName\")"));
        assert!(out.contains(". association (\"address\" , \"Address\")"));
        assert!(out.contains("pub const FULL_NAME"));
        assert!(!out.contains("cache"));
        assert!(out.contains("From < & User >"));
    }

    #[test]
    fn test_no_id_no_conversion() {
        let out = expand(quote! {
            struct Tag { label: String }
        })
        .unwrap();
        assert!(out.contains("\"Tag\""));
        assert!(!out.contains("convert :: From"));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let err = expand(quote! { struct Pair(i64, i64); }).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_enums() {
        let err = expand(quote! { enum Status { Open } }).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_rejects_two_ids() {
        let err = expand(quote! {
            struct User {
                #[criteria(id)]
                id: i64,
                #[criteria(id)]
                uuid: String,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("only one field"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = expand(quote! {
            struct User {
                name: String,
                #[criteria(rename = "name")]
                nickname: String,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("duplicate criteria name"));
    }

    #[test]
    fn test_rejects_entity_constant() {
        let err = expand(quote! {
            struct Doc {
                entity: String,
                title: String,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("shadows Entity::ENTITY"));

        let out = expand(quote! {
            struct Doc {
                #[criteria(rename = "entityName")]
                entity: String,
            }
        })
        .unwrap();
        assert!(out.contains("pub const ENTITY_NAME"));
    }

    #[test]
    fn test_rejects_colliding_constants() {
        let err = expand(quote! {
            struct Event {
                created_at: i64,
                #[criteria(rename = "createdAt")]
                created: i64,
            }
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "criteria names 'created_at' and 'createdAt' both map to constant CREATED_AT"
        );
    }

    #[test]
    fn test_rejects_invalid_constant_name() {
        let err = expand(quote! {
            struct Account {
                #[criteria(rename = "2fa")]
                two_factor: bool,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("'2fa' does not form a valid constant name"));

        let err = expand(quote! {
            struct Account {
                #[criteria(rename = "full name")]
                name: String,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("'full name' does not form a valid constant name"));
    }
}
