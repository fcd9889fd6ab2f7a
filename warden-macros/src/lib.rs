// Copyright warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `#[warden::test]`: registers a function as a test at load time (spec
//! component C). The attribute itself never runs the function -- it expands
//! to the original function plus a `#[ctor::ctor]`-registered wrapper that
//! appends a `TestDescriptor` to the process-wide registry before `main`
//! starts, the same "pre-main constructor" shape `ctor` exists for.
//!
//! Generated code is addressed through `::warden::__private::*` rather than
//! `::warden_core`/`::ctor` directly: any crate using this attribute already
//! depends on `warden` (it's the only place the attribute is re-exported
//! from), so that's the one path guaranteed to resolve. `warden-macros`
//! itself has no dependency on `warden` -- these are just path tokens.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Expr, ExprLit, ItemFn, Lit, Meta, Token};

struct TestArgs {
    suite: String,
    signal: Option<i32>,
    exit_code: Option<i32>,
    assert_msg: Option<String>,
    exact: bool,
    min_similarity: Option<f64>,
}

impl TestArgs {
    fn from_meta_list(list: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut suite = None;
        let mut signal = None;
        let mut exit_code = None;
        let mut assert_msg = None;
        let mut exact = false;
        let mut min_similarity = None;

        for meta in list {
            let name_value = match meta {
                Meta::NameValue(nv) => nv,
                other => return Err(syn::Error::new_spanned(other, "expected `key = value`")),
            };
            let key = name_value
                .path
                .get_ident()
                .map(|i| i.to_string())
                .ok_or_else(|| syn::Error::new_spanned(&name_value.path, "expected a plain identifier"))?;
            let value = name_value.value;
            match key.as_str() {
                "suite" => suite = Some(expect_str(&value)?),
                "signal" => signal = Some(expect_int(&value)? as i32),
                "exit_code" => exit_code = Some(expect_int(&value)? as i32),
                "assert_msg" => assert_msg = Some(expect_str(&value)?),
                "exact" => exact = expect_bool(&value)?,
                "min_similarity" => min_similarity = Some(expect_float(&value)?),
                other => {
                    return Err(syn::Error::new_spanned(
                        &name_value.path,
                        format!("unknown `warden::test` argument `{other}`"),
                    ))
                }
            }
        }

        let suite = suite.ok_or_else(|| {
            syn::Error::new(Span::call_site(), "`warden::test` requires `suite = \"...\"`")
        })?;
        Ok(TestArgs { suite, signal, exit_code, assert_msg, exact, min_similarity })
    }

    fn has_death_expectation(&self) -> bool {
        self.signal.is_some() || self.exit_code.is_some() || self.assert_msg.is_some() || self.exact
            || self.min_similarity.is_some()
    }
}

fn expect_str(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn expect_int(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(i), .. }) => i.base10_parse(),
        other => Err(syn::Error::new_spanned(other, "expected an integer literal")),
    }
}

fn expect_bool(expr: &Expr) -> syn::Result<bool> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Bool(b), .. }) => Ok(b.value),
        other => Err(syn::Error::new_spanned(other, "expected a bool literal")),
    }
}

fn expect_float(expr: &Expr) -> syn::Result<f64> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Float(f), .. }) => f.base10_parse(),
        Expr::Lit(ExprLit { lit: Lit::Int(i), .. }) => i.base10_parse::<i64>().map(|v| v as f64),
        other => Err(syn::Error::new_spanned(other, "expected a numeric literal")),
    }
}

/// ```ignore
/// #[warden::test(suite = "Arithmetic")]
/// fn adds_two_positives() { ... }
///
/// #[warden::test(suite = "Death", signal = 11, assert_msg = "index in bounds")]
/// fn out_of_bounds_access() { ... }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
    let meta_list = match parser.parse(attr) {
        Ok(list) => list,
        Err(err) => return err.to_compile_error().into(),
    };
    let args = match TestArgs::from_meta_list(meta_list) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let item_fn = parse_macro_input!(item as ItemFn);
    let fn_name = &item_fn.sig.ident;
    let register_fn_name = format_ident!("__warden_register_{}", fn_name);
    let suite = &args.suite;
    let test_name = fn_name.to_string();

    let death_expect = if args.has_death_expectation() {
        let signal = args.signal.unwrap_or(0);
        let exit_code = args.exit_code.unwrap_or(-1);
        let assert_msg = match &args.assert_msg {
            Some(msg) => quote! { Some(#msg.to_string()) },
            None => quote! { None },
        };
        let exact = args.exact;
        let min_similarity = args.min_similarity.unwrap_or(0.95);
        quote! {
            ::core::option::Option::Some(::warden::__private::DeathExpect {
                expected_signal: #signal,
                expected_exit_code: #exit_code,
                expected_assert_msg: #assert_msg,
                match_exactly: #exact,
                min_similarity: #min_similarity,
            })
        }
    } else {
        quote! { ::core::option::Option::None }
    };

    quote! {
        #item_fn

        #[::warden::__private::ctor::ctor]
        #[allow(non_snake_case)]
        fn #register_fn_name() {
            ::warden::__private::registry::register(::warden::__private::TestDescriptor {
                suite_name: #suite.to_string(),
                test_name: #test_name.to_string(),
                callable: #fn_name,
                death_expect: #death_expect,
            });
        }
    }
    .into()
}
