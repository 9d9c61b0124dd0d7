//! Macros for reducing boilerplate when declaring records

/// Implement [`Record`](crate::core::record::Record) for a struct
///
/// The resource name is derived from the type name unless one is given.
///
/// # Example
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct Post {
///     pub id: String,
///     pub title: String,
/// }
///
/// impl_record!(Post);                 // served at /posts
/// impl_record!(Writer, "Author");    // served at /authors
/// ```
#[macro_export]
macro_rules! impl_record {
    ($type:ty) => {
        impl $crate::core::record::Record for $type {}
    };
    ($type:ty, $name:expr) => {
        impl $crate::core::record::Record for $type {
            fn type_name() -> &'static str {
                $name
            }
        }
    };
}

/// Implement [`Identified`](crate::storage::Identified) using a `String` field
///
/// # Example
/// ```rust,ignore
/// impl_identified!(Post, id);
/// ```
#[macro_export]
macro_rules! impl_identified {
    ($type:ty, $field:ident) => {
        impl $crate::storage::Identified for $type {
            fn id(&self) -> String {
                self.$field.clone()
            }

            fn set_id(&mut self, id: String) {
                self.$field = id;
            }
        }
    };
}
