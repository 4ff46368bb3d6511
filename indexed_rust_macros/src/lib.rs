mod record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Derive macro implementing `indexed_rust::Record` and its capabilities.
///
/// The payload is encoded with `serde_json`, so the type must also derive
/// `Serialize` and `Deserialize`.
///
/// # Usage
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize, Record)]
/// #[record(namespace = "files")]
/// struct File {
///     #[record(id, generated)]
///     id: String,
///     name: String,
///     #[record(created)]
///     created_at: i64,
///     #[record(updated)]
///     updated_at: i64,
/// }
/// ```
///
/// Struct attributes:
/// - `namespace = "..."`: fixed namespace for every instance
/// - `opaque`: do not implement `Serializable`
///
/// Field attributes:
/// - `namespace`: read the namespace from this `String` field instead
/// - `id`: the identifier field (defaults to a field named `id`)
/// - `id, generated`: also implement `IdentityAssignable`
/// - `created` / `updated`: implement `TimestampTracked` (both required)
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
