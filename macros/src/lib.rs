//! Attribute macros that lower test-author declarations to `#[no_mangle]`
//! functions whose names obey the `__CUnitPP_<ROLE><SUITE>____<NAME>`
//! convention the discovery engine scans for.
//!
//! The wire format is compatibility-critical (see the crate's naming
//! convention table) so these macros only ever rename and re-export; they
//! never touch the body or the user's own parameter list, beyond switching
//! calling convention to `"C-unwind"`, which is required for a panic
//! raised by the assertion surface to unwind cleanly back across the
//! function-pointer call the runner makes.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, ItemFn, LitStr};

const PREFIX: &str = "__CUnitPP_";
const SEP: &str = "____";

fn symbol_ident(role: char, suite: &str, name: &str) -> proc_macro2::Ident {
    format_ident!("{}{}{}{}{}", PREFIX, role, suite, SEP, name)
}

fn suite_name(attr: TokenStream) -> String {
    if let Ok(lit) = syn::parse::<LitStr>(attr.clone()) {
        lit.value()
    } else {
        let ident = parse_macro_input!(attr as syn::Ident);
        ident.to_string()
    }
}

fn lower(attr: TokenStream, item: TokenStream, role: char) -> TokenStream {
    let suite = suite_name(attr);
    let input = parse_macro_input!(item as ItemFn);
    let display_name = input.sig.ident.to_string();
    let symbol = symbol_ident(role, &suite, &display_name);
    relinked(input, symbol)
}

// Setup/teardown symbols carry no meaningful test-name field (the Plan
// Builder ignores it for those two roles), so by convention it is always
// the role character itself, e.g. `__CUnitPP_SFix____S` (§6).
fn lower_with_role_name(attr: TokenStream, item: TokenStream, role: char) -> TokenStream {
    let suite = suite_name(attr);
    let input = parse_macro_input!(item as ItemFn);
    let symbol = symbol_ident(role, &suite, &role.to_string());
    relinked(input, symbol)
}

fn relinked(input: ItemFn, symbol: proc_macro2::Ident) -> TokenStream {
    let ItemFn {
        attrs,
        vis,
        mut sig,
        block,
        ..
    } = input;
    sig.ident = symbol;
    sig.abi = Some(syn::parse_quote!(extern "C-unwind"));
    let unsafety: syn::Token![unsafe] = syn::parse_quote!(unsafe);
    sig.unsafety = Some(unsafety);

    let expanded = quote! {
        #(#attrs)*
        #[no_mangle]
        #vis #sig #block
    };
    expanded.into()
}

/// `#[simple_test(Suite)] fn name() { .. }`
#[proc_macro_attribute]
pub fn simple_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    lower(attr, item, 'T')
}

/// `#[fixture_test(Suite)] fn name(ctx: *mut core::ffi::c_void) { .. }`
#[proc_macro_attribute]
pub fn fixture_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    lower(attr, item, 'F')
}

/// `#[fixture_setup(Suite)] fn name() -> *mut core::ffi::c_void { .. }`
#[proc_macro_attribute]
pub fn fixture_setup(attr: TokenStream, item: TokenStream) -> TokenStream {
    lower_with_role_name(attr, item, 'S')
}

/// `#[fixture_teardown(Suite)] fn name(ctx: *mut core::ffi::c_void) { .. }`
#[proc_macro_attribute]
pub fn fixture_teardown(attr: TokenStream, item: TokenStream) -> TokenStream {
    lower_with_role_name(attr, item, 'D')
}
