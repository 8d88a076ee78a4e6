//! Derive macros for `brrtbind`.
//!
//! - `#[derive(Params)]` lists the fields of a `path` or `query` struct, with their shapes and
//!   setters, so the binder never looks a field up by name at request time.
//! - `#[derive(RequestObject)]` reports which of the `path`, `query`, `body` and `response`
//!   sections a request object declares.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, FieldsNamed, GenericArgument, LitStr,
    PathArguments, Result as SynResult, Type,
};

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> SynResult<&'a FieldsNamed> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                format!("#[derive({derive})] requires a struct with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("#[derive({derive})] only supports structs"),
        )),
    }
}

/// Inner type of `Option<T>`, if `ty` is one.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let seg = p.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn optional_str(value: Option<LitStr>) -> TokenStream2 {
    match value {
        Some(lit) => quote! { ::std::option::Option::Some(#lit) },
        None => quote! { ::std::option::Option::None },
    }
}

/// Implement `brrtbind::registry::Params`.
///
/// ```ignore
/// #[derive(Clone, Default, Params)]
/// struct ItemPath {
///     #[param(rename = "ID", example = "5")]
///     id: i64,
/// }
/// ```
#[proc_macro_derive(Params, attributes(param))]
pub fn derive_params(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand_params(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_params(input: &DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(input, "Params")?;

    let mut metas = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let mut rename: Option<LitStr> = None;
        let mut example: Option<LitStr> = None;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("param")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("example") {
                    example = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `rename` or `example`"))
                }
            })?;
        }
        let wire = rename.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
        let example = optional_str(example);
        metas.push(quote! {
            ::brrtbind::registry::FieldMeta::new::<#ty, _>(
                #wire,
                #example,
                |target: &mut Self, value: #ty| target.#ident = value,
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::brrtbind::registry::Params for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::brrtbind::registry::FieldMeta<Self>> {
                ::std::vec![#(#metas),*]
            }
        }
    })
}

/// Implement `brrtbind::registry::RequestObject`.
///
/// Fields named `path`, `query`, `body` and `response` are the sections; anything else is
/// left alone. `path` takes the route example used for docs:
///
/// ```ignore
/// #[derive(Clone, Default, RequestObject)]
/// struct GetItem {
///     #[request(example = "/items/5")]
///     path: ItemPath,
///     response: Option<Item>,
/// }
/// ```
///
/// An `Option<T>` body is filled with `T::default()` before decoding; an `Option<T>` response
/// counts as present only when `Some`.
#[proc_macro_derive(RequestObject, attributes(request))]
pub fn derive_request_object(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand_request_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_request_object(input: &DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(input, "RequestObject")?;

    let mut sections = Vec::new();
    let mut body_ty = quote! { () };
    let mut body_slot = quote! {};
    let mut response_ty = quote! { () };
    let mut response = quote! {};

    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;

        let mut example: Option<LitStr> = None;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("request")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("example") {
                    example = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `example`"))
                }
            })?;
        }
        if let Some(lit) = &example {
            if ident != "path" {
                return Err(syn::Error::new(
                    lit.span(),
                    "`example` is only supported on the `path` field",
                ));
            }
        }
        let example = optional_str(example);

        match ident.to_string().as_str() {
            "path" | "query" => sections.push(quote! {
                layout.#ident = ::std::option::Option::Some(
                    ::brrtbind::registry::Section::<Self>::of::<#ty>(#example, |r| &mut r.#ident),
                );
            }),
            "body" => {
                sections.push(quote! { layout.has_body = true; });
                if let Some(inner) = option_inner(ty) {
                    body_ty = quote! { #inner };
                    body_slot = quote! {
                        fn body_slot(&mut self) -> ::std::option::Option<&mut Self::Body> {
                            ::std::option::Option::Some(
                                self.body.get_or_insert_with(::std::default::Default::default),
                            )
                        }
                    };
                } else {
                    body_ty = quote! { #ty };
                    body_slot = quote! {
                        fn body_slot(&mut self) -> ::std::option::Option<&mut Self::Body> {
                            ::std::option::Option::Some(&mut self.body)
                        }
                    };
                }
            }
            "response" => {
                sections.push(quote! { layout.has_response = true; });
                if let Some(inner) = option_inner(ty) {
                    response_ty = quote! { #inner };
                    response = quote! {
                        fn response(&self) -> ::std::option::Option<&Self::Response> {
                            self.response.as_ref()
                        }
                    };
                } else {
                    response_ty = quote! { #ty };
                    response = quote! {
                        fn response(&self) -> ::std::option::Option<&Self::Response> {
                            ::std::option::Option::Some(&self.response)
                        }
                    };
                }
            }
            _ => {}
        }
    }

    Ok(quote! {
        impl #impl_generics ::brrtbind::registry::RequestObject for #name #ty_generics #where_clause {
            type Body = #body_ty;
            type Response = #response_ty;

            fn layout() -> ::brrtbind::registry::Layout<Self> {
                let mut layout = ::brrtbind::registry::Layout::empty(::std::stringify!(#name));
                #(#sections)*
                layout
            }

            #body_slot
            #response
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_path_example_is_accepted() {
        let input: DeriveInput = parse_quote! {
            struct GetItem {
                #[request(example = "/items/5")]
                path: ItemPath,
            }
        };
        assert!(expand_request_object(&input).is_ok());
    }

    #[test]
    fn test_example_outside_path_is_rejected() {
        for section in ["query", "body", "response", "other"] {
            let field = syn::Ident::new(section, proc_macro2::Span::call_site());
            let input: DeriveInput = parse_quote! {
                struct GetItem {
                    #[request(example = "/items/5")]
                    #field: Section,
                }
            };
            let err = expand_request_object(&input).unwrap_err();
            assert_eq!(
                err.to_string(),
                "`example` is only supported on the `path` field"
            );
        }
    }
}
