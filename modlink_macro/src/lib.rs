// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use quote::*;

use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use syn::{parse::Parser, punctuated::Punctuated, spanned::Spanned, Expr, Token};

mod attr_data;
use attr_data::*;

/// See `modlink::thunk` for documentation.
#[proc_macro_attribute]
pub fn thunk(args: TokenStream1, input: TokenStream1) -> TokenStream1 {
    match expand(TokenStream2::from(args), TokenStream2::from(input)) {
        Ok(tokens) => TokenStream1::from(tokens),
        Err(e) => TokenStream1::from(e.into_compile_error()),
    }
}

fn expand(args: TokenStream2, input: TokenStream2) -> syn::Result<TokenStream2> {
    let foreign_mod = syn::parse2::<syn::ItemForeignMod>(input)?;
    let punct = Parser::parse2(Punctuated::<Expr, Token!(,)>::parse_terminated, args)?;
    let attr_data = AttrData::try_from(punct)?;

    // an `extern` block without an explicit ABI is "C".
    let abi = foreign_mod
        .abi
        .name
        .clone()
        .unwrap_or_else(|| syn::LitStr::new("C", foreign_mod.abi.span()));

    let mut ret = TokenStream2::new();
    for item in foreign_mod.items {
        use syn::ForeignItem;
        match item {
            ForeignItem::Fn(fn_item) => ret.extend(parse_fn(&abi, fn_item, &attr_data)?),
            other => {
                let mod_abi = &foreign_mod.abi;
                ret.extend(quote!(#mod_abi {#other}))
            }
        }
    }
    Ok(ret)
}

// `#[link_name = "..."]` on a single function overrides the symbol name. It is consumed
// here because it means nothing on the generated (non-foreign) function.
fn take_link_name(attrs: &mut Vec<syn::Attribute>) -> syn::Result<Option<String>> {
    let mut link_name = None;
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("link_name") {
            return true;
        }
        match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(val),
                        ..
                    }),
                ..
            }) => link_name = Some(val.value()),
            meta => result = Err(syn::Error::new(meta.span(), "Expected `link_name = \"...\"`.")),
        }
        false
    });
    result.map(|()| link_name)
}

fn parse_fn(
    abi: &syn::LitStr,
    mut fn_item: syn::ForeignItemFn,
    attr_data: &AttrData,
) -> syn::Result<TokenStream2> {
    let sig = &fn_item.sig;
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new(
            variadic.span(),
            "variadic functions cannot be forwarded",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "foreign functions cannot be generic",
        ));
    }

    let fn_name = sig.ident.clone();
    let vis = fn_item.vis.clone();
    let output = sig.output.clone();

    let mut param_list = Vec::new();
    let mut param_ty_list = Vec::new();
    let mut ty_list = Vec::new();
    for (i, arg) in sig.inputs.iter().enumerate() {
        match arg {
            syn::FnArg::Typed(pat_type) => {
                let ty = pat_type.ty.to_token_stream();
                let param_name = match pat_type.pat.as_ref() {
                    syn::Pat::Wild(_) => format_ident!("p{i}"),
                    syn::Pat::Ident(pat_id) => pat_id.ident.clone(),
                    pat => {
                        return Err(syn::Error::new(
                            pat.span(),
                            "Expected identifier or `_`.",
                        ))
                    }
                };
                param_ty_list.push(quote!(#param_name : #ty));
                param_list.push(param_name);
                ty_list.push(ty);
            }
            syn::FnArg::Receiver(rec) => {
                return Err(syn::Error::new(
                    rec.span(),
                    "`self` arguments are unsupported",
                ));
            }
        }
    }

    let link_name = match take_link_name(&mut fn_item.attrs)? {
        Some(name) => name,
        None => attr_data
            .link_name
            .as_ref()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| fn_name.to_string()),
    };
    let fn_attrs = &fn_item.attrs;
    let fn_ptr_ty = quote!(unsafe extern #abi fn (#(#ty_list),*) #output);

    // The init stub has the exact signature of the target, so a first call that lands in
    // it (by call or by jump) can resolve the slot and forward its own arguments.
    let thunk_static = |slot: &syn::Ident, init: &syn::Ident| match &attr_data.source {
        Source::Library(library) => quote! {
            #[allow(non_snake_case)]
            unsafe extern #abi fn #init (#(#param_ty_list),*) #output {
                match #slot.resolve() {
                    Ok(function) => unsafe { function(#(#param_list),*) },
                    Err(err) => panic!("{}", err),
                }
            }
            #[allow(non_upper_case_globals)]
            static #slot: modlink::Thunk<#fn_ptr_ty> = modlink::Thunk::lazy(
                #init as #fn_ptr_ty as *mut (),
                #link_name,
                &#library,
            );
        },
        Source::Target(target) => quote! {
            #[allow(non_upper_case_globals)]
            static #slot: modlink::Thunk<#fn_ptr_ty> =
                modlink::Thunk::fixed(#target as #fn_ptr_ty as *mut ());
        },
    };

    // Foreign functions are unsafe to call, so the generated functions are too.
    if attr_data.naked {
        let slot = format_ident!("__MODLINK_THUNK_{}", fn_name);
        let init = format_ident!("__modlink_init_{}", fn_name);
        let items = thunk_static(&slot, &init);
        Ok(quote! {
            #items
            modlink::__tail_jump! {
                #(#fn_attrs)*
                #[allow(non_snake_case)]
                #vis unsafe extern #abi fn #fn_name (#(#param_ty_list),*) #output => #slot
            }
        })
    } else {
        let items = thunk_static(&format_ident!("THUNK"), &format_ident!("initial_fn"));
        Ok(quote! {
            #(#fn_attrs)*
            #[allow(non_snake_case)]
            #[inline]
            #vis unsafe extern #abi fn #fn_name (#(#param_ty_list),*) #output {
                #items
                unsafe { THUNK.get()(#(#param_list),*) }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(args: TokenStream2, input: TokenStream2) -> String {
        expand(args, input).unwrap().to_string()
    }

    #[test]
    fn test_lazy_forwarder() {
        let out = expand_str(
            quote!(library = LIBC),
            quote!(extern "C" { fn atoi(s: *const c_char) -> c_int; }),
        );
        assert!(out.contains("Thunk :: lazy"));
        assert!(out.contains("\"atoi\""));
        assert!(out.contains("THUNK . get ()"));
    }

    #[test]
    fn test_wild_params_and_link_name() {
        let out = expand_str(
            quote!(library = LIBC, link_name = "abs"),
            quote!(extern "C" { fn absolute(_: c_int) -> c_int; }),
        );
        assert!(out.contains("p0 : c_int"));
        assert!(out.contains("\"abs\""));
        assert!(!out.contains("\"absolute\""));
    }

    #[test]
    fn test_link_name_attribute_wins() {
        let out = expand_str(
            quote!(library = LIBC, link_name = "abs"),
            quote!(extern "C" { #[link_name = "labs"] fn absolute(n: c_long) -> c_long; }),
        );
        assert!(out.contains("\"labs\""));
        assert!(!out.contains("link_name"));
    }

    #[test]
    fn test_fixed_target() {
        let out = expand_str(
            quote!(target = libc::abs),
            quote!(extern "C" { fn abs(n: c_int) -> c_int; }),
        );
        assert!(out.contains("Thunk :: fixed"));
        assert!(!out.contains("initial_fn"));
    }

    #[test]
    fn test_naked_uses_tail_jump() {
        let out = expand_str(
            quote!(library = USER32, naked),
            quote!(extern "system" { fn MessageBoxW(owner: *mut c_void, text: *const u16, title: *const u16, style: u32) -> i32; }),
        );
        assert!(out.contains("__tail_jump !"));
        assert!(out.contains("__MODLINK_THUNK_MessageBoxW"));
        assert!(out.contains("\"system\""));
    }

    #[test]
    fn test_default_abi_is_c() {
        let out = expand_str(quote!(library = LIBC), quote!(extern { fn rand() -> c_int; }));
        assert!(out.contains("extern \"C\" fn rand"));
    }

    #[test]
    fn test_variadic_is_rejected() {
        assert!(expand(
            quote!(library = LIBC),
            quote!(extern "C" { fn printf(fmt: *const c_char, ...) -> c_int; }),
        )
        .is_err());
    }
}
