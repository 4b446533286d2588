//! Attribute parsing shared by the derive implementations

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Result, Token};

/// How field idents are turned into wire names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    LowerCase,
    UpperCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
    ScreamingKebabCase,
}

impl RenameRule {
    pub fn parse(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(RenameRule::LowerCase),
            "UPPERCASE" => Some(RenameRule::UpperCase),
            "PascalCase" => Some(RenameRule::PascalCase),
            "camelCase" => Some(RenameRule::CamelCase),
            "snake_case" => Some(RenameRule::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnakeCase),
            "kebab-case" => Some(RenameRule::KebabCase),
            "SCREAMING-KEBAB-CASE" => Some(RenameRule::ScreamingKebabCase),
            _ => None,
        }
    }

    /// Apply to a snake_case field ident
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::LowerCase | RenameRule::SnakeCase => field.to_string(),
            RenameRule::UpperCase | RenameRule::ScreamingSnakeCase => field.to_ascii_uppercase(),
            RenameRule::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        out.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            RenameRule::CamelCase => {
                let pascal = RenameRule::PascalCase.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::KebabCase => field.replace('_', "-"),
            RenameRule::ScreamingKebabCase => field.replace('_', "-").to_ascii_uppercase(),
        }
    }
}

/// Container-level `#[rpc(...)]` settings
#[derive(Debug, Default)]
pub struct ContainerMeta {
    pub rename_all: Option<RenameRule>,
    pub case_insensitive: bool,
}

pub fn extract_container_meta(attrs: &[Attribute]) -> Result<ContainerMeta> {
    let mut meta = ContainerMeta::default();
    let mut serde_rename_all = None;

    for attr in attrs {
        if attr.path().is_ident("rpc") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("rename_all") {
                    meta.rename_all = Some(parse_rename_rule(&nested)?);
                } else if nested.path.is_ident("case_insensitive") {
                    meta.case_insensitive = true;
                } else {
                    return Err(nested.error("unsupported rpc container attribute"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("rename_all") && nested.input.peek(Token![=]) {
                    serde_rename_all = Some(parse_rename_rule(&nested)?);
                    Ok(())
                } else {
                    skip_meta(&nested)
                }
            })?;
        }
    }

    // An explicit rpc rule wins over the serde one
    if meta.rename_all.is_none() {
        meta.rename_all = serde_rename_all;
    }
    Ok(meta)
}

/// Field-level `#[rpc(...)]` settings
#[derive(Debug, Default)]
pub struct FieldMeta {
    pub rename: Option<String>,
    pub skip: bool,
}

pub fn extract_field_meta(attrs: &[Attribute]) -> Result<FieldMeta> {
    let mut meta = FieldMeta::default();
    let mut serde_rename = None;
    let mut serde_skip = false;

    for attr in attrs {
        if attr.path().is_ident("rpc") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("rename") {
                    let s: LitStr = nested.value()?.parse()?;
                    meta.rename = Some(s.value());
                } else if nested.path.is_ident("skip") {
                    meta.skip = true;
                } else {
                    return Err(nested.error("unsupported rpc field attribute"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("rename") && nested.input.peek(Token![=]) {
                    let s: LitStr = nested.value()?.parse()?;
                    serde_rename = Some(s.value());
                    Ok(())
                } else if nested.path.is_ident("skip") || nested.path.is_ident("skip_deserializing")
                {
                    serde_skip = true;
                    Ok(())
                } else {
                    skip_meta(&nested)
                }
            })?;
        }
    }

    if meta.rename.is_none() {
        meta.rename = serde_rename;
    }
    meta.skip |= serde_skip;
    Ok(meta)
}

fn parse_rename_rule(nested: &ParseNestedMeta) -> Result<RenameRule> {
    let s: LitStr = nested.value()?.parse()?;
    RenameRule::parse(&s.value())
        .ok_or_else(|| syn::Error::new_spanned(&s, format!("unknown rename rule `{}`", s.value())))
}

/// Consume a serde option we do not interpret (`key`, `key = ..`, `key(..)`)
fn skip_meta(nested: &ParseNestedMeta) -> Result<()> {
    if nested.input.peek(Token![=]) {
        let _: syn::Expr = nested.value()?.parse()?;
    } else if nested.input.peek(syn::token::Paren) {
        nested.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}
