//! Procedural macros for the `contexts` behaviour-driven test runner.
//!
//! - `#[spec]`: placed on an inherent `impl` block, implements `contexts::spec::Spec` for the type by reading the
//!   block's method names and building the method table the runner classifies at run time.

use contexts_core::roles::{MethodRole, classify};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, Type, parse_macro_input};

/// Implements `contexts::spec::Spec` for the type of an inherent `impl` block.
///
/// Methods are picked up by name, using the same rules the runner uses:
/// - establish/because/assertion/cleanup methods take `&self` or `&mut self`, plus optionally one example parameter
///   (`&T` or a `T: Clone`), and return `()` or `Result<(), E>`;
/// - `examples` is an associated function (no receiver) returning any `IntoIterator` of `Debug` values;
/// - every other item is left alone and not registered.
///
/// The `impl` block itself is emitted unchanged.
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct WhenAddingNumbers {
///     total: i32,
/// }
///
/// #[contexts::spec]
/// impl WhenAddingNumbers {
///     fn because_we_add_two_and_three(&mut self) {
///         self.total = 2 + 3;
///     }
///
///     fn it_should_be_five(&self) {
///         assert_eq!(self.total, 5);
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn spec(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    if !args.is_empty() {
        return syn::Error::new(args.span(), "#[spec] takes no arguments")
            .to_compile_error()
            .into();
    }

    let item = parse_macro_input!(input as ItemImpl);
    match expand_spec(&item) {
        Ok(expanded) => expanded.into(),
        Err(err) => {
            let err = err.to_compile_error();
            TokenStream::from(quote! {
                #item
                #err
            })
        }
    }
}

fn expand_spec(item: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[spec] must be placed on an inherent impl block, not a trait impl",
        ));
    }

    let self_ty = &item.self_ty;
    let spec_name = type_name(self_ty);
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    let mut entries = Vec::new();
    for impl_item in &item.items {
        if let ImplItem::Fn(method) = impl_item {
            let name = method.sig.ident.to_string();
            match classify(&name) {
                MethodRole::Ignored => {}
                MethodRole::Examples => entries.push(examples_entry(method)?),
                _ => entries.push(lifecycle_entry(method)?),
            }
        }
    }

    Ok(quote! {
        #item

        impl #impl_generics ::contexts::spec::Spec for #self_ty #where_clause {
            fn spec_name() -> &'static str {
                #spec_name
            }

            fn spec_methods() -> ::std::vec::Vec<::contexts::spec::SpecMethod<Self>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

/// Last path segment of the implementing type (`crate::specs::WhenX` → `"WhenX"`).
fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_else(|| quote!(#ty).to_string()),
        _ => quote!(#ty).to_string(),
    }
}

fn examples_entry(method: &ImplItemFn) -> syn::Result<TokenStream2> {
    let ident = &method.sig.ident;
    let name = ident.to_string();
    if let Some(arg) = method.sig.inputs.first() {
        return Err(syn::Error::new_spanned(
            arg,
            "`examples` must be an associated function without parameters",
        ));
    }
    reject_unsupported_signature(method)?;

    Ok(quote! {
        ::contexts::spec::SpecMethod::examples(#name, || ::contexts::spec::Example::collect(Self::#ident()))
    })
}

fn lifecycle_entry(method: &ImplItemFn) -> syn::Result<TokenStream2> {
    let ident = &method.sig.ident;
    let name = ident.to_string();
    reject_unsupported_signature(method)?;

    let mut inputs = method.sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {}
        Some(FnArg::Receiver(receiver)) => {
            return Err(syn::Error::new_spanned(
                receiver,
                "spec methods must take `&self` or `&mut self`",
            ));
        }
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                format!("spec method `{name}` must take `&self` or `&mut self`"),
            ));
        }
    }

    let example_ty = match inputs.next() {
        None => None,
        Some(FnArg::Typed(arg)) => Some(&*arg.ty),
        Some(other) => return Err(syn::Error::new_spanned(other, "unexpected receiver")),
    };
    if let Some(extra) = inputs.next() {
        return Err(syn::Error::new_spanned(
            extra,
            "spec methods take at most one parameter besides the receiver (the current example)",
        ));
    }

    let call = match example_ty {
        None => quote! {
            |spec: &mut Self, _example| ::contexts::spec::IntoOutcome::into_outcome(spec.#ident())
        },
        Some(Type::Reference(reference)) => {
            let inner = &reference.elem;
            quote! {
                |spec: &mut Self, example| {
                    let example = ::contexts::spec::example_arg::<#inner>(example)?;
                    ::contexts::spec::IntoOutcome::into_outcome(spec.#ident(example))
                }
            }
        }
        Some(owned) => quote! {
            |spec: &mut Self, example| {
                let example = ::contexts::spec::example_arg::<#owned>(example)?;
                ::contexts::spec::IntoOutcome::into_outcome(spec.#ident(::std::clone::Clone::clone(example)))
            }
        },
    };

    Ok(quote! {
        ::contexts::spec::SpecMethod::call(#name, #call)
    })
}

fn reject_unsupported_signature(method: &ImplItemFn) -> syn::Result<()> {
    if let Some(asyncness) = &method.sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "async spec methods are not supported"));
    }
    if !method.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &method.sig.generics,
            "spec methods cannot be generic",
        ));
    }
    Ok(())
}
