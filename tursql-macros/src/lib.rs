//! Derive macro for tursql table registration.
//!
//! `#[derive(Table)]` turns a named struct into a registered table shape:
//! an implementation of `TableSchema` (the spec with per-field accessors)
//! and `FromRow` (by-name row mapping). Field order in the generated spec is
//! declaration order, which decides the implicit key and generated SQL
//! column order.

use darling::FromDeriveInput;
use darling::FromField;
use proc_macro2::Ident;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::DeriveInput;
use syn::Type;

#[derive(Debug, FromField)]
#[darling(attributes(tursql))]
struct FieldReceiver {
    pub ident: Option<Ident>,
    pub ty:    Type,

    #[darling(default)]
    pub key: bool,

    #[darling(default)]
    pub column_name: Option<String>,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(tursql), supports(struct_named))]
struct TableReceiver {
    pub ident: Ident,
    pub data:  darling::ast::Data<(), FieldReceiver>,

    #[darling(default)]
    pub table_name: Option<String>,

    #[darling(default)]
    pub schema_name: Option<String>,
}

#[proc_macro_derive(Table, attributes(tursql))]
pub fn derive_table(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    let receiver = match TableReceiver::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors().into(),
    };

    match impl_table(&receiver) {
        Ok(expanded) => expanded.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn impl_table(receiver: &TableReceiver) -> syn::Result<TokenStream2> {
    let struct_ident = &receiver.ident;
    let type_name = struct_ident.to_string();

    let fields = match &receiver.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        darling::ast::Data::Enum(_) => {
            return Err(syn::Error::new_spanned(struct_ident, "Table can only be derived for structs"));
        }
    };
    if fields.is_empty() {
        return Err(syn::Error::new_spanned(struct_ident, "Table requires at least one field"));
    }

    let mut field_specs = Vec::new();
    let mut from_row_fields = Vec::new();

    for field in fields {
        let field_ident = match &field.ident {
            Some(ident) => ident,
            None => return Err(syn::Error::new_spanned(struct_ident, "Table requires named fields")),
        };
        let field_name = field_ident.to_string();

        let (kind, optional) = sql_kind(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                format!(
                    "field `{}` has a type tursql cannot map; supported types are i8..i64, f32, f64, \
                     bool, char, String, Decimal, NaiveDate, NaiveTime, NaiveDateTime, Vec<u8> and \
                     Option of each",
                    field_name
                ),
            )
        })?;

        let getter = quote! {
            |record: &#struct_ident| tursql::ToSql::to_sql(record.#field_ident.clone())
        };
        let setter = if optional {
            quote! {
                |record: &mut #struct_ident, value: tursql::SqlValue| {
                    record.#field_ident = tursql::FromSql::from_sql(value)?;
                    Ok(())
                }
            }
        } else {
            quote! {
                |record: &mut #struct_ident, value: tursql::SqlValue| {
                    record.#field_ident = tursql::FromSql::from_sql_or_default(value)?;
                    Ok(())
                }
            }
        };

        let mut spec = quote! {
            tursql::FieldSpec::new(#field_name, #kind, #getter, #setter)
        };
        if field.key {
            spec = quote! { #spec.key() };
        }
        if let Some(column) = &field.column_name {
            spec = quote! { #spec.column_name(#column) };
        }
        field_specs.push(spec);

        let column = match &field.column_name {
            Some(column) => column.clone(),
            None => camel_to_snake(&field_name),
        };
        let read = if optional {
            quote! { #field_ident: row.get(#column)? }
        } else {
            quote! { #field_ident: row.get_or_default(#column)? }
        };
        from_row_fields.push(read);
    }

    let table_setter = receiver.table_name.as_ref().map(|t| quote! { .table_name(#t) });
    let schema_setter = receiver.schema_name.as_ref().map(|s| quote! { .schema_name(#s) });

    Ok(quote! {
        impl tursql::TableSchema for #struct_ident {
            fn table_spec() -> tursql::TableSpec<Self> {
                tursql::TableSpec::new(#type_name)
                    #table_setter
                    #schema_setter
                    #(.field(#field_specs))*
            }
        }

        impl tursql::FromRow for #struct_ident {
            fn from_row(row: &tursql::Row) -> tursql::Result<Self> {
                Ok(Self {
                    #(#from_row_fields),*
                })
            }
        }
    })
}

/// Map a field type onto its kind tokens, unwrapping one level of `Option`.
fn sql_kind(ty: &Type) -> Option<(TokenStream2, bool)> {
    if let Some(inner) = option_inner(ty) {
        let kind = base_kind(inner)?;
        return Some((kind, true));
    }
    let kind = base_kind(ty)?;
    Some((kind, false))
}

fn base_kind(ty: &Type) -> Option<TokenStream2> {
    let segment = last_segment(ty)?;
    let ident = segment.ident.to_string();
    let kind = match ident.as_str() {
        "i8" => quote! { tursql::SqlKind::TinyInt },
        "i16" => quote! { tursql::SqlKind::SmallInt },
        "i32" => quote! { tursql::SqlKind::Int },
        "i64" => quote! { tursql::SqlKind::BigInt },
        "f32" => quote! { tursql::SqlKind::Float },
        "f64" => quote! { tursql::SqlKind::Double },
        "bool" => quote! { tursql::SqlKind::Bool },
        "char" => quote! { tursql::SqlKind::Char },
        "String" => quote! { tursql::SqlKind::Text },
        "Decimal" => quote! { tursql::SqlKind::Decimal },
        "NaiveDate" => quote! { tursql::SqlKind::Date },
        "NaiveTime" => quote! { tursql::SqlKind::Time },
        "NaiveDateTime" => quote! { tursql::SqlKind::Timestamp },
        "Vec" => {
            if generic_arg(segment).and_then(last_segment).map(|s| s.ident == "u8") == Some(true) {
                quote! { tursql::SqlKind::Blob }
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(kind)
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    generic_arg(segment)
}

fn generic_arg(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    }
}

/// Keep in step with `tursql::camel_to_snake`: a separator before every
/// non-leading uppercase letter, everything lowercased.
fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
