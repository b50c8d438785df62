//! Locale options for forgeboot.
//!
//! Holds the `forgeboot.i18n` option group: the default locale, the query
//! parameter naming a requested locale, and where message bundles live.
//! Resolving a request's locale and loading bundles is left to the host;
//! this crate only binds, validates and interprets the options.

pub mod locale;
pub mod properties;

pub use locale::{LocaleError, LocaleTag};
pub use properties::I18nProperties;
