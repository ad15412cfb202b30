//! Attribute parsing for the Entity derive macro.
//!
//! Parses the `#[criteria(...)]` attributes on the struct itself and on its
//! fields.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, MetaNameValue, Result, Token,
};

/// Struct-level attributes: `#[criteria(entity = "Name")]`.
#[derive(Debug, Clone, Default)]
pub struct EntityAttr {
    /// Entity name (default: the struct name).
    pub entity: Option<String>,
}

impl Parse for EntityAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = EntityAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("entity") => {
                    attr.entity = Some(string_value(nv, "entity")?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown criteria attribute on struct. Expected: entity = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes from `#[criteria(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    /// Leave this field out of the metadata.
    pub skip: bool,
    /// Name used in criteria (default: the field name).
    pub rename: Option<String>,
    /// Target entity when the field is an association.
    pub association: Option<String>,
    /// The field identifies instances.
    pub id: bool,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            skip: false,
            rename: None,
            association: None,
            id: false,
            span: Span::call_site(),
        }
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr {
            span: input.span(),
            ..FieldAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("id") => attr.id = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(nv, "rename")?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("association") => {
                    attr.association = Some(string_value(nv, "association")?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown criteria attribute. Expected: skip, id, rename = \"...\", or association = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && (attr.id || attr.association.is_some() || attr.rename.is_some()) {
            return Err(Error::new(
                attr.span,
                "skip cannot be combined with other criteria attributes",
            ));
        }
        if attr.id && attr.association.is_some() {
            return Err(Error::new(attr.span, "an id field cannot be an association"));
        }

        Ok(attr)
    }
}

fn string_value(nv: &MetaNameValue, name: &str) -> Result<String> {
    match &nv.value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => non_empty(s, name),
        other => Err(Error::new(
            other.span(),
            format!("{name} must be a string literal"),
        )),
    }
}

fn non_empty(s: &LitStr, name: &str) -> Result<String> {
    let value = s.value();
    if value.is_empty() {
        Err(Error::new(s.span(), format!("{name} must not be empty")))
    } else {
        Ok(value)
    }
}

/// Extract the struct's `#[criteria(...)]` attribute.
pub fn parse_entity_attrs(attrs: &[Attribute]) -> Result<EntityAttr> {
    for attr in attrs {
        if attr.path().is_ident("criteria") {
            return attr.parse_args::<EntityAttr>();
        }
    }
    Ok(EntityAttr::default())
}

/// Extract a field's `#[criteria(...)]` attribute.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("criteria") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}
