use crate::util::crate_path;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields};

// derive_column_value
//
// Forwards the conversion trait through a single-field wrapper, so
// newtypes over text, numbers, or blobs stay convertible from the
// underlying cell kind.
pub fn derive_column_value(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let krate = match crate_path(&input.attrs) {
        Ok(path) => path,
        Err(err) => return err.to_compile_error(),
    };

    let Data::Struct(data) = &input.data else {
        let err = Error::new_spanned(
            &input.ident,
            "ColumnValue can only be derived for single-field structs",
        );
        return err.to_compile_error();
    };

    let (inner_ty, construct, access) = match &data.fields {
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            let inner_ty = &unnamed.unnamed[0].ty;
            (
                quote!(#inner_ty),
                quote!(Self(converted)),
                quote!(&self.0),
            )
        }
        Fields::Named(named) if named.named.len() == 1 => {
            let field = &named.named[0];
            let field_ident = field.ident.as_ref().expect("named field");
            let inner_ty = &field.ty;
            (
                quote!(#inner_ty),
                quote!(Self { #field_ident: converted }),
                quote!(&self.#field_ident),
            )
        }
        other => {
            let err = Error::new_spanned(
                other,
                "ColumnValue can only be derived for single-field structs",
            );
            return err.to_compile_error();
        }
    };

    quote! {
        impl #impl_generics #krate::value::ColumnValue for #ident #ty_generics #where_clause {
            fn to_value(&self) -> #krate::value::Value {
                #krate::value::ColumnValue::to_value(#access)
            }

            fn from_value(value: &#krate::value::Value) -> ::core::option::Option<Self> {
                <#inner_ty as #krate::value::ColumnValue>::from_value(value)
                    .map(|converted| #construct)
            }
        }
    }
}
