use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

/// Where the namespace of an instance comes from.
enum Namespace {
    Fixed(String),
    Field(Ident),
}

#[derive(Default)]
struct RecordFields {
    namespace: Option<Ident>,
    id: Option<Ident>,
    generated: bool,
    created: Option<Ident>,
    updated: Option<Ident>,
}

struct StructOptions {
    namespace: Option<String>,
    opaque: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let options = extract_struct_options(input)?;
    let fields = extract_fields(input)?;

    let namespace = match (options.namespace, fields.namespace) {
        (Some(_), Some(field)) => {
            return Err(syn::Error::new(
                field.span(),
                "Record derive: namespace given both on the struct and on a field",
            ))
        }
        (Some(fixed), None) => Namespace::Fixed(fixed),
        (None, Some(field)) => Namespace::Field(field),
        (None, None) => Namespace::Fixed(to_snake_case(&name.to_string())),
    };

    let id_field = fields.id.ok_or_else(|| {
        syn::Error::new(
            name.span(),
            "Record derive: no field marked with #[record(id)] and no field named `id`",
        )
    })?;

    let timestamps = match (fields.created, fields.updated) {
        (Some(created), Some(updated)) => Some((created, updated)),
        (None, None) => None,
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "Record derive: #[record(created)] and #[record(updated)] must be used together",
            ))
        }
    };

    let namespace_body = match &namespace {
        Namespace::Fixed(ns) => quote! { #ns },
        Namespace::Field(field) => quote! { &self.#field },
    };

    let serializable_accessors = if options.opaque {
        quote! {}
    } else {
        quote! {
            fn as_serializable(&self) -> Option<&dyn ::indexed_rust::record::Serializable> {
                Some(self)
            }

            fn as_serializable_mut(&mut self) -> Option<&mut dyn ::indexed_rust::record::Serializable> {
                Some(self)
            }
        }
    };

    let serializable_impl = if options.opaque {
        quote! {}
    } else {
        quote! {
            impl #impl_generics ::indexed_rust::record::Serializable for #name #ty_generics #where_clause {
                fn marshal(&self) -> ::indexed_rust::Result<Vec<u8>> {
                    ::indexed_rust::record::marshal_json(self)
                }

                fn unmarshal(&mut self, bytes: &[u8]) -> ::indexed_rust::Result<()> {
                    ::indexed_rust::record::unmarshal_json(self, bytes)
                }
            }
        }
    };

    let (identity_accessor, identity_impl) = if fields.generated {
        (
            quote! {
                fn as_identity_assignable(&mut self) -> Option<&mut dyn ::indexed_rust::record::IdentityAssignable> {
                    Some(self)
                }
            },
            quote! {
                impl #impl_generics ::indexed_rust::record::IdentityAssignable for #name #ty_generics #where_clause {
                    fn set_id(&mut self, id: String) {
                        self.#id_field = id;
                    }
                }
            },
        )
    } else {
        (quote! {}, quote! {})
    };

    let (timestamp_accessors, timestamp_impl) = match &timestamps {
        Some((created, updated)) => (
            quote! {
                fn as_timestamped(&self) -> Option<&dyn ::indexed_rust::record::TimestampTracked> {
                    Some(self)
                }

                fn as_timestamped_mut(&mut self) -> Option<&mut dyn ::indexed_rust::record::TimestampTracked> {
                    Some(self)
                }
            },
            quote! {
                impl #impl_generics ::indexed_rust::record::TimestampTracked for #name #ty_generics #where_clause {
                    fn created(&self) -> i64 {
                        self.#created
                    }

                    fn set_created(&mut self, unix_time: i64) {
                        self.#created = unix_time;
                    }

                    fn updated(&self) -> i64 {
                        self.#updated
                    }

                    fn set_updated(&mut self, unix_time: i64) {
                        self.#updated = unix_time;
                    }
                }
            },
        ),
        None => (quote! {}, quote! {}),
    };

    Ok(quote! {
        impl #impl_generics ::indexed_rust::record::Record for #name #ty_generics #where_clause {
            fn namespace(&self) -> &str {
                #namespace_body
            }

            fn id(&self) -> &str {
                &self.#id_field
            }

            #serializable_accessors
            #identity_accessor
            #timestamp_accessors
        }

        #serializable_impl
        #identity_impl
        #timestamp_impl
    })
}

fn extract_struct_options(input: &DeriveInput) -> syn::Result<StructOptions> {
    let mut options = StructOptions {
        namespace: None,
        opaque: false,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("namespace") {
                let value: LitStr = meta.value()?.parse()?;
                options.namespace = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("opaque") {
                options.opaque = true;
                Ok(())
            } else {
                Err(meta.error("unsupported #[record] struct attribute"))
            }
        })?;
    }

    Ok(options)
}

fn extract_fields(input: &DeriveInput) -> syn::Result<RecordFields> {
    let named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Record derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Record derive: only structs are supported",
            ))
        }
    };

    let mut found = RecordFields::default();

    for field in named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("namespace") {
                    found.namespace = Some(ident.clone());
                } else if meta.path.is_ident("id") {
                    found.id = Some(ident.clone());
                } else if meta.path.is_ident("generated") {
                    found.generated = true;
                } else if meta.path.is_ident("created") {
                    found.created = Some(ident.clone());
                } else if meta.path.is_ident("updated") {
                    found.updated = Some(ident.clone());
                } else {
                    return Err(meta.error("unsupported #[record] field attribute"));
                }
                Ok(())
            })?;
        }
    }

    // Default: a field named "id"
    if found.id.is_none() {
        found.id = named
            .iter()
            .filter_map(|field| field.ident.as_ref())
            .find(|ident| *ident == "id")
            .cloned();
    }

    Ok(found)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
