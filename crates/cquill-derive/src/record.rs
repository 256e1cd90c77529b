use crate::util::{crate_path, field_opts, is_option};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields};

struct PlainField {
    ident: syn::Ident,
    ty: syn::Type,
    column: String,
}

struct FlattenField {
    ident: syn::Ident,
    optional: bool,
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
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

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "Record can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    let mut plain: Vec<PlainField> = Vec::new();
    let mut flattened: Vec<FlattenField> = Vec::new();
    for field in fields {
        let field_ident = field.ident.clone().expect("named field");
        let opts = match field_opts(&field.attrs) {
            Ok(opts) => opts,
            Err(err) => return err.to_compile_error(),
        };

        if opts.flatten {
            flattened.push(FlattenField {
                ident: field_ident,
                optional: is_option(&field.ty),
            });
        } else {
            let column = opts.rename.unwrap_or_else(|| field_ident.to_string());
            plain.push(PlainField {
                ident: field_ident,
                ty: field.ty.clone(),
                column,
            });
        }
    }

    let column_specs = plain.iter().map(|field| {
        let column = &field.column;
        quote! {
            #krate::record::ColumnSpec { name: #column, embedded: false },
        }
    });

    let flatten_columns = flattened.iter().map(|field| {
        let field_ty = flatten_target_ty(fields, &field.ident);
        quote! {
            for spec in <#field_ty as #krate::record::Record>::columns() {
                if !cols
                    .iter()
                    .any(|existing| existing.name.eq_ignore_ascii_case(spec.name))
                {
                    cols.push(#krate::record::ColumnSpec {
                        name: spec.name,
                        embedded: true,
                    });
                }
            }
        }
    });

    let get_arms = plain.iter().map(|field| {
        let field_ident = &field.ident;
        let column = &field.column;
        quote! {
            if column.eq_ignore_ascii_case(#column) {
                return ::core::option::Option::Some(
                    #krate::value::ColumnValue::to_value(&self.#field_ident),
                );
            }
        }
    });

    let get_flattened = flattened.iter().map(|field| {
        let field_ident = &field.ident;
        if field.optional {
            quote! {
                if let ::core::option::Option::Some(inner) = self.#field_ident.as_ref() {
                    if let ::core::option::Option::Some(value) =
                        #krate::record::Record::get(inner, column)
                    {
                        return ::core::option::Option::Some(value);
                    }
                }
            }
        } else {
            quote! {
                if let ::core::option::Option::Some(value) =
                    #krate::record::Record::get(&self.#field_ident, column)
                {
                    return ::core::option::Option::Some(value);
                }
            }
        }
    });

    let put_arms = plain.iter().map(|field| {
        let field_ident = &field.ident;
        let field_ty = &field.ty;
        let column = &field.column;
        quote! {
            if column.eq_ignore_ascii_case(#column) {
                return match <#field_ty as #krate::value::ColumnValue>::from_value(value) {
                    ::core::option::Option::Some(converted) => {
                        self.#field_ident = converted;
                        ::core::result::Result::Ok(true)
                    }
                    ::core::option::Option::None => {
                        ::core::result::Result::Err(#krate::error::Error::scan(
                            ::std::format!(
                                "cannot convert {:?} into column {}",
                                value,
                                #column,
                            ),
                        ))
                    }
                };
            }
        }
    });

    let put_flattened = flattened.iter().map(|field| {
        let field_ident = &field.ident;
        if field.optional {
            // a missing embed is never allocated; its columns count as
            // unmatched
            quote! {
                if let ::core::option::Option::Some(inner) = self.#field_ident.as_mut() {
                    if #krate::record::Record::put(inner, column, value)? {
                        return ::core::result::Result::Ok(true);
                    }
                }
            }
        } else {
            quote! {
                if #krate::record::Record::put(&mut self.#field_ident, column, value)? {
                    return ::core::result::Result::Ok(true);
                }
            }
        }
    });

    let cell_pushes = plain.iter().map(|field| {
        let field_ident = &field.ident;
        let column = &field.column;
        quote! {
            cells.push((
                ::std::string::String::from(#column),
                #krate::value::ColumnValue::to_value(&self.#field_ident),
            ));
        }
    });

    let cell_flattened = flattened.iter().map(|field| {
        let field_ident = &field.ident;
        let extend = quote! {
            for (name, value) in inner_cells {
                if !cells
                    .iter()
                    .any(|(existing, _)| existing.eq_ignore_ascii_case(&name))
                {
                    cells.push((name, value));
                }
            }
        };
        if field.optional {
            quote! {
                if let ::core::option::Option::Some(inner) = self.#field_ident.as_ref() {
                    let inner_cells = #krate::record::Record::to_cells(inner);
                    #extend
                }
            }
        } else {
            quote! {
                let inner_cells = #krate::record::Record::to_cells(&self.#field_ident);
                #extend
            }
        }
    });

    quote! {
        #[automatically_derived]
        impl #impl_generics #krate::record::Record for #ident #ty_generics #where_clause {
            fn columns() -> ::std::vec::Vec<#krate::record::ColumnSpec> {
                #[allow(unused_mut)]
                let mut cols = ::std::vec![
                    #(#column_specs)*
                ];
                #(#flatten_columns)*
                cols
            }

            fn get(&self, column: &str) -> ::core::option::Option<#krate::value::Value> {
                #(#get_arms)*
                #(#get_flattened)*
                ::core::option::Option::None
            }

            fn put(
                &mut self,
                column: &str,
                value: &#krate::value::Value,
            ) -> ::core::result::Result<bool, #krate::error::Error> {
                #(#put_arms)*
                #(#put_flattened)*
                ::core::result::Result::Ok(false)
            }

            fn to_cells(&self) -> ::std::vec::Vec<(::std::string::String, #krate::value::Value)> {
                #[allow(unused_mut)]
                let mut cells: ::std::vec::Vec<(
                    ::std::string::String,
                    #krate::value::Value,
                )> = ::std::vec::Vec::new();
                #(#cell_pushes)*
                #(#cell_flattened)*
                cells
            }
        }
    }
}

/// Type a flattened field delegates to: the field type itself, or the
/// inner type of an `Option` embed.
fn flatten_target_ty(
    fields: &syn::punctuated::Punctuated<syn::Field, syn::token::Comma>,
    ident: &syn::Ident,
) -> TokenStream {
    let field = fields
        .iter()
        .find(|f| f.ident.as_ref() == Some(ident))
        .expect("flattened field exists");
    let ty = &field.ty;

    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return quote!(#inner);
                    }
                }
            }
        }
    }
    quote!(#ty)
}
