#[macro_export]
macro_rules! store_key {
    ($name:ident => $format_key:literal[$($arg:ident:$ty:ident),*]) => {
        #[doc=concat!("Store key builder \n ## Key \n", $format_key)]
        pub struct $name;

        impl $crate::key::StoreKey for $name {
            type Args<'r> = ($(&'r $ty,)*);

            fn key_with_args(&self, args: Self::Args<'_>) -> std::borrow::Cow<'static, str> {
                let ($($arg,)*) = args;

                (format!($format_key, $($arg),*)).into()
            }
        }

        impl $name {
            pub fn of(args: <Self as $crate::key::StoreKey>::Args<'_>) -> String {
                use $crate::key::StoreKey;
                Self.key_with_args(args).into_owned()
            }
        }
    };
    ($name:ident => $key:literal) => {
        #[doc=concat!("Store key builder \n ## Key \n", $key)]
        pub struct $name;

        impl $crate::key::StoreKey for $name {
            type Args<'r> = ();

            fn key_with_args(&self, _: Self::Args<'_>) -> std::borrow::Cow<'static, str> {
                ($key).into()
            }
        }

        impl $name {
            pub fn of(args: <Self as $crate::key::StoreKey>::Args<'_>) -> String {
                use $crate::key::StoreKey;
                Self.key_with_args(args).into_owned()
            }
        }
    };
}
