//! Well-known string formats checked during validation.
//!
//! Each format is one regular expression. Validation runs it and the exported
//! JSON Schema carries the same text as `pattern`, so a model is held to
//! exactly the rule the validator applies. The patterns stay inside the
//! syntax shared by the `regex` crate and ECMA-262.

use std::sync::LazyLock;

use regex::Regex;

const PHONE_PATTERN: &str = r"^\+?[ ()\-]*(?:[0-9][ ()\-]*){1,15}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@.][^\s@]*\.[^\s@]*[^\s@.]$";
const DATA_URI_PATTERN: &str = r"^data:[^,]+,[\s\S]+$";
const URL_PATTERN: &str = r"^https?://[^/\s]+\S*$";

static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(PHONE_PATTERN));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(EMAIL_PATTERN));
static DATA_URI: LazyLock<Regex> = LazyLock::new(|| compile(DATA_URI_PATTERN));
static URL: LazyLock<Regex> = LazyLock::new(|| compile(URL_PATTERN));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("format patterns are valid regular expressions")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Optional leading `+` followed by 1 to 15 digits. Spaces, dashes and
    /// parentheses may appear anywhere after the `+`.
    Phone,
    Email,
    /// `data:<mime>[;base64],<payload>`
    DataUri,
    /// Absolute `http` or `https` URL.
    Url,
}

impl StringFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::DataUri => "data-uri",
            Self::Url => "url",
        }
    }

    pub fn matches(self, value: &str) -> bool {
        self.regex().is_match(value)
    }

    /// The pattern `matches` applies, in JSON Schema `pattern` form.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Phone => PHONE_PATTERN,
            Self::Email => EMAIL_PATTERN,
            Self::DataUri => DATA_URI_PATTERN,
            Self::Url => URL_PATTERN,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Phone => &PHONE,
            Self::Email => &EMAIL,
            Self::DataUri => &DATA_URI,
            Self::Url => &URL,
        }
    }

    pub(crate) fn failure_message(self) -> &'static str {
        match self {
            Self::Phone => "must be a valid phone number",
            Self::Email => "must be a valid email address",
            Self::DataUri => "must be a data URI",
            Self::Url => "must be an http(s) URL",
        }
    }

    pub(crate) fn json_schema_format(self) -> Option<&'static str> {
        match self {
            Self::Email => Some("email"),
            Self::Url => Some("uri"),
            Self::Phone | Self::DataUri => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::StringFormat;

    const ALL: [StringFormat; 4] = [
        StringFormat::Phone,
        StringFormat::Email,
        StringFormat::DataUri,
        StringFormat::Url,
    ];

    #[test]
    fn phone_accepts_short_international_numbers() {
        assert!(StringFormat::Phone.matches("+1"));
        assert!(StringFormat::Phone.matches("+1 (555) 010-2000"));
        assert!(StringFormat::Phone.matches("5550102000"));
        assert!(StringFormat::Phone.matches("123456789012345"));
        assert!(!StringFormat::Phone.matches("not-a-phone"));
        assert!(!StringFormat::Phone.matches("+"));
        assert!(!StringFormat::Phone.matches("(-)"));
        assert!(!StringFormat::Phone.matches("+1234567890123456"));
        assert!(!StringFormat::Phone.matches("12345678901234567"));
        assert!(!StringFormat::Phone.matches("+1 555\n"));
    }

    #[test]
    fn email_requires_local_part_and_dotted_domain() {
        assert!(StringFormat::Email.matches("parent@oak.edu"));
        assert!(StringFormat::Email.matches("a@b.c"));
        assert!(!StringFormat::Email.matches("parent@oak"));
        assert!(!StringFormat::Email.matches("@oak.edu"));
        assert!(!StringFormat::Email.matches("pa rent@oak.edu"));
        assert!(!StringFormat::Email.matches("parent@.oak.edu"));
        assert!(!StringFormat::Email.matches("parent@oak.edu."));
        assert!(!StringFormat::Email.matches("parent@oak@edu.org"));
    }

    #[test]
    fn data_uri_requires_header_and_payload() {
        assert!(StringFormat::DataUri.matches("data:image/png;base64,iVBORw0KGgo="));
        assert!(StringFormat::DataUri.matches("data:text/plain,line one\nline two"));
        assert!(!StringFormat::DataUri.matches("data:,"));
        assert!(!StringFormat::DataUri.matches("data:image/png;base64,"));
        assert!(!StringFormat::DataUri.matches("https://example.com/a.png"));
    }

    #[test]
    fn url_requires_http_scheme_and_host() {
        assert!(StringFormat::Url.matches("https://campus.example.com/report"));
        assert!(StringFormat::Url.matches("http://localhost:8080"));
        assert!(!StringFormat::Url.matches("ftp://campus.example.com"));
        assert!(!StringFormat::Url.matches("https://"));
        assert!(!StringFormat::Url.matches("https:///path"));
        assert!(!StringFormat::Url.matches("https://campus.example.com/a b"));
    }

    #[test]
    fn exported_patterns_agree_with_validation_on_boundary_inputs() {
        let inputs = [
            "",
            "+",
            "+1",
            "123456789012345",
            "1234567890123456",
            "12345678901234567",
            "+1 (555) 010-2000",
            "((((((((((((((((((((",
            "a@b.c",
            "a@b",
            "a@.b.c",
            "data:x,y",
            "data:,y",
            "https://h",
            "https://",
            "http://h/p q",
        ];

        for format in ALL {
            let exported = Regex::new(format.pattern()).expect("exported pattern compiles");
            for input in inputs {
                assert_eq!(
                    exported.is_match(input),
                    format.matches(input),
                    "{} disagrees on {input:?}",
                    format.name()
                );
            }
        }
    }
}
