/// Defines a string-backed enumeration with a closed set of known labels and an
/// `Unknown` variant that keeps any other value verbatim.
///
/// # Syntax
/// ```text
/// labelled_enum! {
///     /// documentation
///     Name (default Variant) {
///         Variant => "label",
///         ...
///     }
/// }
/// ```
///
/// The generated type (de)serializes as a plain string, so records written by other
/// clients with values we don't know about still load and are written back unchanged.
///
/// # Example
///
/// ```rust,ignore
/// labelled_enum! {
///     Progress (default Pending) {
///         Done => "Done",
///         Pending => "Pending",
///     }
/// }
///
/// assert_eq!(Progress::from("Done".to_string()), Progress::Done);
/// assert_eq!(Progress::from("Halted".to_string()), Progress::Unknown("Halted".into()));
/// ```
#[macro_export]
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident (default $default:ident) { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A value outside the known set, kept as it was read.
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Unknown(raw) => raw,
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($label => Self::$variant,)+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unknown(raw) => raw,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
