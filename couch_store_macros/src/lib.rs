mod model;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Model)]
// ============================================================================

/// Derive macro that implements `couch_store::Model` for a struct.
///
/// # Usage
///
/// ```ignore
/// use couch_store::Model;
///
/// #[derive(Model)]
/// struct User;
///
/// #[derive(Model)]
/// #[model(name = "Person")]
/// struct PersonRecord;
/// ```
///
/// - The model type name defaults to the struct name (`"User"`), so entities
///   land in the `user` database.
/// - `#[model(name = "...")]` overrides the type name. The database name is
///   still derived by lower-casing it (`"person"`).
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input)
}
