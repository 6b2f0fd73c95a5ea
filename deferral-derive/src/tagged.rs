//! Implementation of the `#[derive(Tagged)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields, Generics, Ident, Variant, parse_macro_input};

/// Main implementation of the Tagged derive macro.
pub fn derive_tagged_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        syn::Data::Enum(data_enum) => generate_enum_tagged(name, generics, data_enum),
        syn::Data::Struct(_) => generate_struct_tagged(name, generics),
        syn::Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Tagged cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

fn generate_enum_tagged(name: &Ident, generics: &Generics, data_enum: &DataEnum) -> TokenStream2 {
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();
    let type_name = name.to_string();

    let tags: Vec<String> = data_enum
        .variants
        .iter()
        .map(|variant| variant.ident.to_string())
        .collect();
    let arms: Vec<TokenStream2> = data_enum.variants.iter().map(generate_tag_arm).collect();

    // An empty enum has no values, so `tag` is unreachable.
    let body = if arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! { match self { #(#arms)* } }
    };

    quote! {
        impl #impl_generics ::deferral::tagged::Tagged for #name #type_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const TAGS: &'static [&'static str] = &[#(#tags),*];

            #[inline]
            fn tag(&self) -> ::core::option::Option<&str> {
                #body
            }
        }
    }
}

fn generate_tag_arm(variant: &Variant) -> TokenStream2 {
    let variant_name = &variant.ident;
    let tag = variant_name.to_string();

    let pattern = match &variant.fields {
        Fields::Named(_) => quote! { Self::#variant_name { .. } },
        Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
        Fields::Unit => quote! { Self::#variant_name },
    };

    quote! {
        #pattern => ::core::option::Option::Some(#tag),
    }
}

fn generate_struct_tagged(name: &Ident, generics: &Generics) -> TokenStream2 {
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();
    let type_name = name.to_string();

    quote! {
        impl #impl_generics ::deferral::tagged::Tagged for #name #type_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            #[inline]
            fn tag(&self) -> ::core::option::Option<&str> {
                ::core::option::Option::None
            }
        }
    }
}
