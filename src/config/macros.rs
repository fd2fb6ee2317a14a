/// `config_struct!`: one declaration per config section
///
/// Each field is written as `name: Type = default`. The macro emits the
/// struct (fields public), its `Default` impl built from those defaults, and
/// serde derives. Missing keys take their default; unknown keys are an error,
/// so a misspelled setting in `config.toml` fails loudly instead of being
/// ignored.
///
/// ```
/// tickethub::config_struct! {
///     pub struct RetryConfig {
///         attempts: u32 = 3,
///         backoff_ms: u64 = 250,
///     }
/// }
///
/// let retry: RetryConfig = toml::from_str("attempts = 5").unwrap();
/// assert_eq!((retry.attempts, retry.backoff_ms), (5, 250));
/// assert!(toml::from_str::<RetryConfig>("atempts = 5").is_err());
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $default:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(default, deny_unknown_fields)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }
    };
}
