//! Internationalization (i18n) module.
//!
//! Holds the supported locales and the static dictionaries bundled into the
//! binary. The static dictionaries are the fallback source of truth: they
//! define every key the site needs and are served when the content database
//! is unreachable.

mod locale;

pub use locale::Locale;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::error;

use crate::content::Dictionary;

static ITALIAN: Lazy<Dictionary> = Lazy::new(|| load("it", include_str!("it.json")));
static ENGLISH: Lazy<Dictionary> = Lazy::new(|| load("en", include_str!("en.json")));

fn load(code: &str, raw: &str) -> Dictionary {
    match serde_json::from_str::<Value>(raw).map(Dictionary::from_value) {
        Ok(Some(dictionary)) => dictionary,
        Ok(None) => {
            error!("Static dictionary '{}' is not a JSON object", code);
            Dictionary::new()
        }
        Err(e) => {
            error!("Static dictionary '{}' failed to parse: {}", code, e);
            Dictionary::new()
        }
    }
}

/// The bundled dictionary for a locale.
pub fn static_dictionary(locale: Locale) -> &'static Dictionary {
    match locale {
        Locale::It => Lazy::force(&ITALIAN),
        Locale::En => Lazy::force(&ENGLISH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_dictionaries_load() {
        for locale in Locale::ALL {
            let dictionary = static_dictionary(locale);
            assert!(!dictionary.is_empty(), "{locale} dictionary is empty");
        }
    }

    #[test]
    fn test_static_dictionaries_have_no_empty_values() {
        for locale in Locale::ALL {
            let dictionary = static_dictionary(locale);
            assert!(dictionary.missing_leaves(dictionary).is_empty());
        }
    }

    #[test]
    fn test_static_dictionaries_share_the_same_keys() {
        let it: Vec<String> = static_dictionary(Locale::It).leaves().into_iter().map(|(p, _)| p).collect();
        let en: Vec<String> = static_dictionary(Locale::En).leaves().into_iter().map(|(p, _)| p).collect();
        assert_eq!(it, en);
    }

    #[test]
    fn test_static_dictionaries_cover_every_page() {
        let keys = [
            "metadata.ogDescription",
            "values.values.highlight",
            "services.service3.description",
            "gallery.sectionTitle",
            "gallery.images",
            "booking.title",
            "booking.form.name",
            "booking.form.projectTypes.newBuild",
            "booking.experience.steps.deliver.description",
            "booking.contact.address",
            "collections.categories.dettagli",
            "consulting.heroDescription",
            "consulting.steps.questionnaire.title",
            "consulting.steps.refinement.number",
            "consulting.services.singleRoom.features",
            "consulting.services.fullHouse.priceNote",
            "consulting.deliverables.coordination",
            "consulting.trustBadges.satisfaction",
            "contactPage.heroTitle",
            "contactPage.subjects.other",
            "aboutPage.heroTitle",
            "aboutPage.nameSection.paragraph2",
            "aboutPage.values.professionalism.title",
            "aboutPage.madeInItaly.badges.materials",
        ];

        for locale in Locale::ALL {
            let dictionary = static_dictionary(locale);
            let missing: Vec<&str> = keys.iter().copied().filter(|key| dictionary.get(key).is_none()).collect();
            assert!(missing.is_empty(), "{locale} dictionary lacks {missing:?}");
        }
    }

    #[test]
    fn test_gallery_images_are_described() {
        for locale in Locale::ALL {
            let images = static_dictionary(locale)
                .get("gallery.images")
                .and_then(Value::as_array)
                .expect("gallery images");
            assert!(!images.is_empty());
            for image in images {
                for field in ["category", "title", "alt"] {
                    assert!(image.get(field).and_then(Value::as_str).is_some_and(|s| !s.is_empty()));
                }
            }
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(static_dictionary(Locale::En).get_str("nav.contact"), Some("Contact"));
        assert_eq!(static_dictionary(Locale::It).get_str("nav.contact"), Some("Contatti"));
    }
}
