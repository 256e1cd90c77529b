use syn::{Attribute, Path, Type};

/// Options parsed from `#[cql(...)]` attributes on one field.
#[derive(Default)]
pub(crate) struct FieldOpts {
    pub flatten: bool,
    pub rename: Option<String>,
}

pub(crate) fn field_opts(attrs: &[Attribute]) -> syn::Result<FieldOpts> {
    let mut opts = FieldOpts::default();
    for attr in attrs {
        if !attr.path().is_ident("cql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("flatten") {
                opts.flatten = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                opts.rename = Some(lit.value());
                return Ok(());
            }
            if meta.path.is_ident("crate") {
                // struct-level option, tolerated here
                let _lit: syn::LitStr = meta.value()?.parse()?;
                return Ok(());
            }
            Err(meta.error("unsupported cql attribute"))
        })?;
    }
    Ok(opts)
}

/// The crate path the generated code references, `::cquill` unless
/// overridden with `#[cql(crate = "...")]` at the struct level.
pub(crate) fn crate_path(attrs: &[Attribute]) -> syn::Result<Path> {
    let mut path: Path = syn::parse_quote!(::cquill);
    for attr in attrs {
        if !attr.path().is_ident("cql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                path = syn::parse_str(&lit.value())?;
                return Ok(());
            }
            // field-level options are not valid at struct level, but a
            // shared parser keeps error spans reasonable
            if meta.path.is_ident("flatten") || meta.path.is_ident("rename") {
                return Err(meta.error("this cql attribute belongs on a field"));
            }
            Err(meta.error("unsupported cql attribute"))
        })?;
    }
    Ok(path)
}

pub(crate) fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option")
    } else {
        false
    }
}
