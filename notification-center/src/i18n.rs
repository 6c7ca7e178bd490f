//! Fluent localization for panel labels.
//!
//! Strings live in `i18n/<lang>/notification-center.ftl` and are embedded into
//! the binary. English is always loaded as the fallback, so lookups made
//! before [`init`] runs (or in tests) still resolve.

use i18n_embed::{
    fluent::{fluent_language_loader, FluentLanguageLoader},
    DefaultLocalizer, DesktopLanguageRequester, LanguageLoader, Localizer,
};
use i18n_embed::unic_langid::LanguageIdentifier;
use rust_embed::RustEmbed;
use std::sync::LazyLock;

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Translations;

/// Loader shared by every `fl!` lookup in this crate.
pub static LANGUAGE_LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| {
    let loader: FluentLanguageLoader = fluent_language_loader!();

    loader
        .load_fallback_language(&Translations)
        .expect("embedded fallback translations must load");

    loader
});

/// Select the best available translation for `languages`.
///
/// Unknown languages are not an error; the fallback stays active.
pub fn init(languages: &[LanguageIdentifier]) {
    let localizer = DefaultLocalizer::new(&*LANGUAGE_LOADER, &Translations);
    match localizer.select(languages) {
        Ok(selected) => tracing::debug!("Selected languages: {:?}", selected),
        Err(why) => tracing::error!("Error while loading fluent localizations: {why}"),
    }
}

/// Select translations from the desktop locale settings.
pub fn init_from_desktop() {
    init(&DesktopLanguageRequester::requested_languages());
}

/// Look up a localized string by ID.
#[macro_export]
macro_rules! fl {
    ($message_id:literal) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id)
    }};

    ($message_id:literal, $($args:expr),*) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id, $($args), *)
    }};
}
