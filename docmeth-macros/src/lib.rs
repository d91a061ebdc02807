//! Procedural macros for the docmeth project.
//!
//! `#[derive(Persistent)]` implements the record capability for a struct, reading the
//! identifier field directly instead of resolving it at runtime.
//!
//! ```ignore
//! #[derive(Debug, Default, Serialize, Deserialize, Persistent)]
//! #[persistent(collection = "birthdays", store = "crate::db::store")]
//! pub struct Birthday {
//!     pub id: i64,
//!     pub name: String,
//! }
//! ```
//!
//! `store` names a function returning a backend; it is called every time the record needs
//! its collection. `collection` defaults to the snake-cased struct name. The identifier
//! is the field named `id`, or the one marked `#[persistent(id)]`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Path};

#[proc_macro_derive(Persistent, attributes(persistent))]
pub fn derive_persistent(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_persistent(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct RecordAttrs {
    collection: Option<String>,
    store: Option<Path>,
}

fn record_attrs(input: &DeriveInput) -> syn::Result<RecordAttrs> {
    let mut attrs = RecordAttrs { collection: None, store: None };

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("persistent")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                attrs.collection = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("store") {
                attrs.store = Some(meta.value()?.parse::<LitStr>()?.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("expected `collection` or `store`"))
            }
        })?;
    }

    Ok(attrs)
}

fn is_marked_id(field: &syn::Field) -> syn::Result<bool> {
    let mut marked = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("persistent")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                marked = true;
                Ok(())
            } else {
                Err(meta.error("expected `id`"))
            }
        })?;
    }

    Ok(marked)
}

fn identifier_field(input: &DeriveInput) -> syn::Result<Ident> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "Persistent can only be derived for structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(&input.ident, "Persistent requires named fields"));
    };

    let mut marked = Vec::new();
    for field in &fields.named {
        if is_marked_id(field)? {
            marked.push(field);
        }
    }

    let candidates = if marked.is_empty() {
        fields
            .named
            .iter()
            .filter(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
            .collect::<Vec<_>>()
    } else {
        marked
    };

    match candidates.as_slice() {
        [field] => field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "identifier field must be named")),
        [] => Err(syn::Error::new_spanned(
            &input.ident,
            "no identifier field: add an `id` field or mark one with #[persistent(id)]",
        )),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "only one field may be marked #[persistent(id)]",
        )),
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

fn expand_persistent(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = record_attrs(&input)?;
    let id_field = identifier_field(&input)?;

    let Some(store) = attrs.store else {
        return Err(syn::Error::new(
            Span::call_site(),
            "missing #[persistent(store = \"path::to::backend_fn\")]",
        ));
    };
    let collection = attrs
        .collection
        .unwrap_or_else(|| snake_case(&input.ident.to_string()));

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::docmeth::record::Persistent for #name #ty_generics #where_clause {
            fn collection(&self) -> ::docmeth::collection::Collection {
                ::docmeth::collection::Collection::new(#collection, #store())
            }

            fn identifier(&self) -> ::docmeth::error::StoreResult<i64> {
                ::core::convert::TryFrom::try_from(self.#id_field).map_err(|_| {
                    ::docmeth::error::StoreError::InvalidIdentifier(
                        ::core::any::type_name::<Self>(),
                        ::std::string::ToString::to_string(&self.#id_field),
                    )
                })
            }
        }
    })
}
