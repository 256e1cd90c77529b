//! Derive macros for cquill record binding. `Record` generates the
//! per-record bind/unbind code (column map, cell conversion, embedded
//! flattening); `ColumnValue` forwards the conversion trait through a
//! newtype wrapper.

mod column_value;
mod record;
mod util;

use proc_macro::TokenStream;

#[proc_macro_derive(Record, attributes(cql))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}

#[proc_macro_derive(ColumnValue, attributes(cql))]
pub fn derive_column_value(input: TokenStream) -> TokenStream {
    column_value::derive_column_value(input.into()).into()
}
