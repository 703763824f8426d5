//! `#[derive(Reflect)]` for safejson.
//!
//! Supported shapes:
//! - structs with named fields: every `pub` field becomes a record field, in
//!   declaration order. `#[json("key,omitempty")]` renames / marks a field
//!   and `#[mask("policy")]` attaches a masking policy tag. Fields tagged
//!   `#[json("-")]` are left out entirely, so their type does not need to
//!   implement `Reflect`.
//! - newtype structs: transparent over the wrapped value
//! - unit structs: an empty record
//! - enums without payloads: the variant name as a string, or the name given
//!   by `#[json("…")]` on the variant
//!
//! # Example
//! ```rust,ignore
//! use safejson::Reflect;
//!
//! #[derive(Reflect)]
//! struct Login {
//!     #[json("user")]
//!     pub username: String,
//!     #[mask("filled4")]
//!     pub password: String,
//!     #[json("-")]
//!     pub session: Session,
//! }
//! ```
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericParam, LitStr, Visibility, parse_macro_input,
    parse_quote, spanned::Spanned,
};

#[proc_macro_derive(Reflect, attributes(json, mask))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::safejson::Reflect));
        }
    }

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(_) => expand_record(&data.fields)?,
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => quote! {
                ::safejson::Kind::Pointer(::core::option::Option::Some(&self.0))
            },
            Fields::Unit => quote! {
                ::safejson::Kind::Struct(::std::vec::Vec::new())
            },
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.span(),
                    "Reflect cannot be derived for tuple structs with more than one field",
                ));
            }
        },
        Data::Enum(data) => {
            let mut arms = Vec::new();
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(syn::Error::new(
                        variant.span(),
                        "Reflect can only be derived for enums whose variants carry no data",
                    ));
                }
                let ident = &variant.ident;
                let name = match string_attr(&variant.attrs, "json")? {
                    Some(name) => name,
                    None => LitStr::new(&ident.to_string(), ident.span()),
                };
                arms.push(quote! {
                    Self::#ident => ::safejson::Kind::String(::std::borrow::Cow::Borrowed(#name)),
                });
            }
            if arms.is_empty() {
                quote! { match *self {} }
            } else {
                quote! { match self { #(#arms)* } }
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new(input.span(), "Reflect does not support unions"));
        }
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::safejson::Reflect for #name #ty_generics #where_clause {
            fn kind(&self) -> ::safejson::Kind<'_> {
                #body
            }
        }
    })
}

fn expand_record(fields: &Fields) -> syn::Result<proc_macro2::TokenStream> {
    let mut descriptors = Vec::new();
    let mut entries = Vec::new();

    for field in fields {
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let json = string_attr(&field.attrs, "json")?;
        if json
            .as_ref()
            .is_some_and(|tag| tag.value().split(',').next() == Some("-"))
        {
            continue;
        }
        let mask = string_attr(&field.attrs, "mask")?;

        let source_name = LitStr::new(&ident.to_string(), ident.span());
        let json = optional(json);
        let mask = optional(mask);
        let index = descriptors.len();
        descriptors.push(quote! {
            ::safejson::FieldDescriptor::parse(#source_name, #json, #mask)
        });
        entries.push(quote! {
            ::safejson::Field::new(&fields[#index], &self.#ident)
        });
    }

    if entries.is_empty() {
        return Ok(quote! { ::safejson::Kind::Struct(::std::vec::Vec::new()) });
    }
    Ok(quote! {
        static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<::safejson::FieldDescriptor>> =
            ::std::sync::OnceLock::new();
        let fields = FIELDS.get_or_init(|| ::std::vec![#(#descriptors),*]);
        ::safejson::Kind::Struct(::std::vec![#(#entries),*])
    })
}

fn optional(lit: Option<LitStr>) -> proc_macro2::TokenStream {
    match lit {
        Some(lit) => quote!(::core::option::Option::Some(#lit)),
        None => quote!(::core::option::Option::None),
    }
}

/// Reads `#[name("…")]`. Repeating the attribute is an error.
fn string_attr(attrs: &[Attribute], name: &str) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident(name) {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                format!("duplicate #[{name}] attribute"),
            ));
        }
        found = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(found)
}
