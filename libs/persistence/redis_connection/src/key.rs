use std::borrow::Cow;

/// A declarative store-key builder. Implementations are generated by
/// [`crate::store_key!`] from a format string plus typed arguments, so the
/// key namespace lives in one place per domain.
pub trait StoreKey {
    type Args<'r>;

    fn key_with_args(&self, args: Self::Args<'_>) -> Cow<'static, str>;
}
