use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr};

pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = match extract_type_name(&input) {
        Ok(type_name) => type_name,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl #impl_generics ::couch_store::Model for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[model(name = "...")]`, falling back to the struct name.
fn extract_type_name(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }

        let mut name = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("model name must not be empty"));
                }
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported model attribute, expected `name = \"...\"`"))
            }
        })?;

        if let Some(name) = name {
            return Ok(name);
        }
    }

    Ok(input.ident.to_string())
}
