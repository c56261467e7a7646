//! English/Hindi UI strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::English => ENGLISH,
            Language::Hindi => HINDI,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language tag: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Looks `key` up for `language`, falling back to the key itself.
pub fn translate<'a>(language: Language, key: &'a str) -> &'a str {
    language
        .table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or(key)
}

/// In-memory language selection. Not persisted across sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Localizer {
    language: Language,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(self.language, key)
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("login.title", "Welcome Back"),
    ("login.subtitle", "Log in to your PDF Junction account"),
    ("login.email", "Email"),
    ("login.password", "Password"),
    ("login.button", "Log In"),
    ("login.noAccount", "Don't have an account?"),
    ("login.signup", "Sign Up"),
    ("signup.title", "Create Account"),
    ("signup.subtitle", "Sign up for a new PDF Junction account"),
    ("signup.email", "Email"),
    ("signup.password", "Password"),
    ("signup.confirmPassword", "Confirm Password"),
    ("signup.button", "Create Account"),
    ("signup.hasAccount", "Already have an account?"),
    ("signup.login", "Log In"),
    ("dashboard.title", "Your Documents"),
    ("dashboard.create", "Create New PDF"),
    ("dashboard.empty", "No documents found. Create your first PDF!"),
    ("dashboard.search", "Search documents..."),
    ("dashboard.logout", "Log Out"),
    ("dashboard.tableDate", "Date"),
    ("dashboard.tableTitle", "Title"),
    ("dashboard.tableActions", "Actions"),
    ("dashboard.edit", "Edit"),
    ("dashboard.view", "View"),
    ("dashboard.delete", "Delete"),
    ("pdf.create.title", "Create New PDF"),
    ("pdf.edit.title", "Edit PDF"),
    ("pdf.formName", "Name"),
    ("pdf.formAddress", "Address"),
    ("pdf.formDate", "Date"),
    ("pdf.formTitle", "Title"),
    ("pdf.formContent", "Content"),
    ("pdf.generate", "Generate PDF"),
    ("pdf.save", "Save"),
    ("pdf.cancel", "Cancel"),
    ("pdf.download", "Download PDF"),
    ("pdf.preview", "Preview"),
    ("common.loading", "Loading..."),
    ("common.error", "An error occurred"),
    ("common.retry", "Try Again"),
    ("common.success", "Success!"),
    ("common.language", "Language"),
];

const HINDI: &[(&str, &str)] = &[
    ("login.title", "वापस स्वागत है"),
    ("login.subtitle", "अपने PDF जंक्शन खाते में लॉग इन करें"),
    ("login.email", "ईमेल"),
    ("login.password", "पासवर्ड"),
    ("login.button", "लॉग इन करें"),
    ("login.noAccount", "खाता नहीं है?"),
    ("login.signup", "साइन अप करें"),
    ("signup.title", "खाता बनाएं"),
    ("signup.subtitle", "एक नए PDF जंक्शन खाते के लिए साइन अप करें"),
    ("signup.email", "ईमेल"),
    ("signup.password", "पासवर्ड"),
    ("signup.confirmPassword", "पासवर्ड की पुष्टि करें"),
    ("signup.button", "खाता बनाएं"),
    ("signup.hasAccount", "पहले से ही एक खाता है?"),
    ("signup.login", "लॉग इन करें"),
    ("dashboard.title", "आपके दस्तावेज़"),
    ("dashboard.create", "नया PDF बनाएं"),
    ("dashboard.empty", "कोई दस्तावेज़ नहीं मिला। अपना पहला PDF बनाएं!"),
    ("dashboard.search", "दस्तावेज खोजें..."),
    ("dashboard.logout", "लॉग आउट"),
    ("dashboard.tableDate", "तारीख"),
    ("dashboard.tableTitle", "शीर्षक"),
    ("dashboard.tableActions", "कार्रवाई"),
    ("dashboard.edit", "संपादित करें"),
    ("dashboard.view", "देखें"),
    ("dashboard.delete", "हटाएं"),
    ("pdf.create.title", "नया PDF बनाएं"),
    ("pdf.edit.title", "PDF संपादित करें"),
    ("pdf.formName", "नाम"),
    ("pdf.formAddress", "पता"),
    ("pdf.formDate", "तारीख"),
    ("pdf.formTitle", "शीर्षक"),
    ("pdf.formContent", "सामग्री"),
    ("pdf.generate", "PDF उत्पन्न करें"),
    ("pdf.save", "सहेजें"),
    ("pdf.cancel", "रद्द करें"),
    ("pdf.download", "PDF डाउनलोड करें"),
    ("pdf.preview", "पूर्वावलोकन"),
    ("common.loading", "लोड हो रहा है..."),
    ("common.error", "एक त्रुटि हुई"),
    ("common.retry", "पुनः प्रयास करें"),
    ("common.success", "सफलता!"),
    ("common.language", "भाषा"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tables_cover_the_same_keys() {
        assert_eq!(ENGLISH.len(), HINDI.len());
        for (key, _) in ENGLISH {
            assert_ne!(translate(Language::Hindi, key), *key, "missing hi entry for {key}");
        }
    }

    #[test]
    fn parses_tags_and_names() {
        assert_eq!("HI".parse::<Language>(), Ok(Language::Hindi));
        assert_eq!("english".parse::<Language>(), Ok(Language::English));
        assert!("fr".parse::<Language>().is_err());
    }
}
