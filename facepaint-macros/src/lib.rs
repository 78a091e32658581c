use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Error, Result};

//Derives barycentric interpolation for per-vertex shader data. Every field
//type has to implement Interpolate itself.
#[proc_macro_derive(Interpolate)]
pub fn derive_interpolate(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let derive = parse_macro_input!(input as DeriveInput);

    match expand(derive) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    }
    .into()
}

fn expand(derive: DeriveInput) -> Result<TokenStream> {
    let name = derive.ident;
    let fields = match derive.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(named),
            ..
        }) => named.named,
        _ => {
            return Err(Error::new_spanned(
                &name,
                "Interpolate can only be derived for structs with named fields",
            ))
        }
    };

    let field_exprs = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #ident: <#ty as Interpolate>::interpolate(&v0.#ident, &v1.#ident, &v2.#ident, r0, r1, r2)
        }
    });

    Ok(quote! {
        impl Interpolate for #name {
            fn interpolate(v0: &Self, v1: &Self, v2: &Self, r0: f32, r1: f32, r2: f32) -> Self {
                Self {
                    #(#field_exprs),*
                }
            }
        }
    })
}
