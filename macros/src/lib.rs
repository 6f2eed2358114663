//! Test attribute shared by the `rxkit` test suites.
//!
//! `#[rxkit_macro::test]` expands to `#[test]` natively and to
//! `wasm_bindgen_test` on wasm. An `async fn` test runs on a current-thread
//! tokio runtime inside a `LocalSet`, so `!Send` futures and
//! `spawn_local`-based schedulers work in it.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input, spanned::Spanned};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let mut input = parse_macro_input!(item as ItemFn);

  let raw_args = proc_macro2::TokenStream::from(attr);
  if !raw_args.is_empty() {
    return TokenStream::from(
      syn::Error::new(
        raw_args.span(),
        "rxkit_macro::test takes no arguments: every test runs on the current thread",
      )
      .to_compile_error(),
    );
  }

  let expanded = if input.sig.asyncness.is_some() {
    let body = input.block.clone();
    input.sig.asyncness = None;
    input.block = syn::parse_quote!({
      let local = tokio::task::LocalSet::new();
      tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime")
        .block_on(local.run_until(async move #body))
    });
    let wasm_body = body;
    let name = &input.sig.ident;
    let wasm_name = syn::Ident::new(&format!("{name}_wasm"), name.span());
    quote! {
      #[cfg(not(target_arch = "wasm32"))]
      #[test]
      #input

      #[cfg(target_arch = "wasm32")]
      #[wasm_bindgen_test::wasm_bindgen_test(async)]
      async fn #wasm_name() #wasm_body
    }
  } else {
    quote! {
      #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
      #[cfg_attr(not(target_arch = "wasm32"), test)]
      #input
    }
  };

  TokenStream::from(expanded)
}
