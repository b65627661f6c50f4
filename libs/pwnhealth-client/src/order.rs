//! Customer order records and their wire XML form.

use chrono::{Datelike, NaiveDate};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

const ROOT_ELEMENT: &str = "customer";

/// Text formats accepted for a date of birth, tried in order.
const DOB_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

/// A lab test order for one customer, as submitted to `POST /customers`.
///
/// Built per call and discarded after serialization. Use
/// [`CustomerOrderRequest::builder`] to get validation up front; the record is
/// validated again right before it is serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomerOrderRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    /// Remote catalog identifiers, serialized comma-joined in this order.
    pub test_types: Vec<String>,
    pub test_groups: Vec<String>,
    pub take_tests_same_day: bool,
}

impl CustomerOrderRequest {
    /// Create a new request builder
    #[must_use]
    pub fn builder() -> CustomerOrderRequestBuilder {
        CustomerOrderRequestBuilder::default()
    }

    /// Check that the identity and address subset is present.
    ///
    /// # Errors
    /// Returns `ClientError::Validation` naming every missing field.
    pub fn validate(&self) -> ClientResult<()> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if self.date_of_birth.is_none() {
            missing.push("dob");
        }
        for (name, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }

        if !missing.is_empty() {
            return Err(ClientError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(dob) = self.date_of_birth {
            if !(1000..=9999).contains(&dob.year()) {
                return Err(ClientError::validation(format!(
                    "date of birth {dob} is outside the supported range"
                )));
            }
        }
        Ok(())
    }

    /// Serialize to the `<customer>` document the remote API expects.
    ///
    /// Elements appear in a fixed order. `test_types`, `test_groups` and
    /// `take_tests_same_day` are omitted entirely when empty or false.
    ///
    /// # Errors
    /// Returns `ClientError::Validation` if required fields are missing.
    pub fn to_xml(&self) -> ClientResult<String> {
        self.validate()?;
        let dob = self.date_of_birth.map(format_dob).unwrap_or_default();

        let mut xml = XmlBuilder::new();
        xml.declaration()?;
        xml.start(ROOT_ELEMENT)?;
        xml.element("first_name", &self.first_name)?;
        xml.element("last_name", &self.last_name)?;
        xml.element("dob", &dob)?;
        xml.element("gender", &self.gender)?;
        xml.element("email", &self.email)?;
        xml.element("address", &self.address)?;
        xml.element("city", &self.city)?;
        xml.element("state", &self.state)?;
        xml.element("zip", &self.zip)?;
        xml.element("home_phone", &self.phone)?;
        if !self.test_types.is_empty() {
            xml.element("test_types", &self.test_types.join(","))?;
        }
        if !self.test_groups.is_empty() {
            xml.element("test_groups", &self.test_groups.join(","))?;
        }
        if self.take_tests_same_day {
            xml.element("take_tests_same_day", "1")?;
        }
        xml.end(ROOT_ELEMENT)?;
        xml.finish()
    }
}

/// Format a date of birth as the 8-digit `YYYYMMDD` string the API expects.
#[must_use]
pub fn format_dob(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a date of birth from common textual forms.
///
/// Accepts `YYYYMMDD`, `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY` and `MM-DD-YYYY`.
///
/// # Errors
/// Returns `ClientError::Validation` when no format matches.
pub fn parse_dob(text: &str) -> ClientResult<NaiveDate> {
    let text = text.trim();

    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let parsed = (
            text[0..4].parse::<i32>(),
            text[4..6].parse::<u32>(),
            text[6..8].parse::<u32>(),
        );
        if let (Ok(year), Ok(month), Ok(day)) = parsed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Ok(date);
            }
        }
    }

    DOB_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| ClientError::validation(format!("unrecognized date of birth '{text}'")))
}

/// Builder for [`CustomerOrderRequest`] with a fluent API
#[derive(Debug, Default)]
pub struct CustomerOrderRequestBuilder {
    request: CustomerOrderRequest,
    dob_text: Option<String>,
}

impl CustomerOrderRequestBuilder {
    #[must_use]
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.request.first_name = value.into();
        self
    }

    #[must_use]
    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.request.last_name = value.into();
        self
    }

    #[must_use]
    pub fn date_of_birth(mut self, date: NaiveDate) -> Self {
        self.request.date_of_birth = Some(date);
        self.dob_text = None;
        self
    }

    /// Date of birth as text, parsed by [`parse_dob`] when the request is built
    #[must_use]
    pub fn date_of_birth_text(mut self, text: impl Into<String>) -> Self {
        self.dob_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn gender(mut self, value: impl Into<String>) -> Self {
        self.request.gender = value.into();
        self
    }

    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.request.email = value.into();
        self
    }

    #[must_use]
    pub fn address(mut self, value: impl Into<String>) -> Self {
        self.request.address = value.into();
        self
    }

    #[must_use]
    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.request.city = value.into();
        self
    }

    #[must_use]
    pub fn state(mut self, value: impl Into<String>) -> Self {
        self.request.state = value.into();
        self
    }

    #[must_use]
    pub fn zip(mut self, value: impl Into<String>) -> Self {
        self.request.zip = value.into();
        self
    }

    #[must_use]
    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.request.phone = value.into();
        self
    }

    /// Add one test type identifier
    #[must_use]
    pub fn test_type(mut self, id: impl ToString) -> Self {
        self.request.test_types.push(id.to_string());
        self
    }

    #[must_use]
    pub fn test_types<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.request
            .test_types
            .extend(ids.into_iter().map(|id| id.to_string()));
        self
    }

    /// Add one test group identifier
    #[must_use]
    pub fn test_group(mut self, id: impl ToString) -> Self {
        self.request.test_groups.push(id.to_string());
        self
    }

    #[must_use]
    pub fn test_groups<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.request
            .test_groups
            .extend(ids.into_iter().map(|id| id.to_string()));
        self
    }

    #[must_use]
    pub fn take_tests_same_day(mut self, value: bool) -> Self {
        self.request.take_tests_same_day = value;
        self
    }

    /// Build the request
    ///
    /// # Errors
    /// Returns `ClientError::Validation` if the date of birth text cannot be
    /// parsed or required fields are missing.
    pub fn build(mut self) -> ClientResult<CustomerOrderRequest> {
        if let Some(text) = self.dob_text.take() {
            self.request.date_of_birth = Some(parse_dob(&text)?);
        }
        self.request.validate()?;
        Ok(self.request)
    }
}

/// Flat element writer over an in-memory buffer.
struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> ClientResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }

    fn declaration(&mut self) -> ClientResult<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str) -> ClientResult<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> ClientResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn element(&mut self, name: &str, text: &str) -> ClientResult<()> {
        self.start(name)?;
        if !text.is_empty() {
            // BytesText::new escapes markup characters
            self.write(Event::Text(BytesText::new(text)))?;
        }
        self.end(name)
    }

    fn finish(self) -> ClientResult<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| ClientError::Serialization(format!("Invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> CustomerOrderRequestBuilder {
        CustomerOrderRequest::builder()
            .first_name("Jane")
            .last_name("Doe")
            .date_of_birth(NaiveDate::from_ymd_opt(1985, 3, 7).unwrap())
            .gender("F")
            .email("jane@example.com")
            .address("1 Main St")
            .city("Springfield")
            .state("IL")
            .zip("02134")
            .phone("5551234567")
    }

    fn child_names(xml: &str) -> Vec<String> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "customer");
        root.children()
            .filter(roxmltree::Node::is_element)
            .map(|n| n.tag_name().name().to_owned())
            .collect()
    }

    fn child_text(xml: &str, name: &str) -> Option<String> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        doc.root_element()
            .children()
            .find(|n| n.has_tag_name(name))
            .map(|n| n.text().unwrap_or_default().to_owned())
    }

    #[test]
    fn test_empty_collections_are_omitted() {
        let xml = jane().build().unwrap().to_xml().unwrap();
        assert_eq!(
            child_names(&xml),
            vec![
                "first_name",
                "last_name",
                "dob",
                "gender",
                "email",
                "address",
                "city",
                "state",
                "zip",
                "home_phone",
            ]
        );
        assert!(!xml.contains("test_types"));
        assert!(!xml.contains("test_groups"));
        assert!(!xml.contains("take_tests_same_day"));
    }

    #[test]
    fn test_full_element_order() {
        let xml = jane()
            .test_types([3, 1, 2])
            .test_group("G7")
            .take_tests_same_day(true)
            .build()
            .unwrap()
            .to_xml()
            .unwrap();
        let names = child_names(&xml);
        assert_eq!(
            &names[10..],
            &["test_types", "test_groups", "take_tests_same_day"]
        );
        assert_eq!(child_text(&xml, "test_types").as_deref(), Some("3,1,2"));
        assert_eq!(child_text(&xml, "test_groups").as_deref(), Some("G7"));
        assert_eq!(child_text(&xml, "take_tests_same_day").as_deref(), Some("1"));
    }

    #[test]
    fn test_starts_with_declaration() {
        let xml = jane().build().unwrap().to_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn test_dob_serialized_as_eight_digits() {
        let xml = jane().build().unwrap().to_xml().unwrap();
        assert_eq!(child_text(&xml, "dob").as_deref(), Some("19850307"));
        assert!(xml.contains("<dob>19850307</dob>"));
    }

    #[test]
    fn test_dob_text_formats_normalize() {
        for input in ["1985-03-07", "19850307", "1985/03/07", "03/07/1985", "03-07-1985"] {
            let request = jane().date_of_birth_text(input).build().unwrap();
            assert_eq!(
                request.date_of_birth.map(format_dob).as_deref(),
                Some("19850307"),
                "input {input}"
            );
        }
    }

    #[test]
    fn test_unparseable_dob_is_validation_error() {
        let err = jane().date_of_birth_text("seventh of March").build().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = jane().date_of_birth_text("19851307").build().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_format_dob_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2001, 1, 2).unwrap();
        assert_eq!(format_dob(date), "20010102");
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = CustomerOrderRequest::builder()
            .first_name("Jane")
            .city("Springfield")
            .build()
            .unwrap_err();
        let ClientError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            message,
            "missing required fields: last_name, dob, address, state, zip"
        );
    }

    #[test]
    fn test_to_xml_revalidates() {
        let mut request = jane().build().unwrap();
        request.last_name = "  ".to_owned();
        assert!(matches!(request.to_xml(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_optional_contact_fields_emit_empty_elements() {
        let xml = CustomerOrderRequest::builder()
            .first_name("Jane")
            .last_name("Doe")
            .date_of_birth_text("1985-03-07")
            .address("1 Main St")
            .city("Springfield")
            .state("IL")
            .zip("02134")
            .build()
            .unwrap()
            .to_xml()
            .unwrap();
        assert_eq!(child_names(&xml).len(), 10);
        assert_eq!(child_text(&xml, "email").as_deref(), Some(""));
    }

    #[test]
    fn test_values_are_escaped() {
        let xml = jane()
            .address("12 <Elm> & Oak")
            .build()
            .unwrap()
            .to_xml()
            .unwrap();
        assert!(!xml.contains("<Elm>"));
        assert_eq!(child_text(&xml, "address").as_deref(), Some("12 <Elm> & Oak"));
    }

    #[test]
    fn test_deserialize_request() {
        let request: CustomerOrderRequest = serde_json::from_str(
            r#"{
                "first_name": "Jane", "last_name": "Doe", "date_of_birth": "1985-03-07",
                "address": "1 Main St", "city": "Springfield", "state": "IL", "zip": "02134",
                "test_types": ["4"]
            }"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.test_types, vec!["4"]);
        assert!(!request.take_tests_same_day);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn identifier() -> impl Strategy<Value = String> {
            "[A-Za-z0-9]{1,8}"
        }

        fn text_field() -> impl Strategy<Value = String> {
            "[A-Za-z][A-Za-z0-9 '&<>.-]{0,20}"
        }

        fn birth_date() -> impl Strategy<Value = NaiveDate> {
            (1000i32..=9999, 1u32..=12, 1u32..=28)
                .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }

        proptest! {
            #[test]
            fn test_empty_collections_never_serialized(
                first in text_field(),
                last in text_field(),
                city in text_field(),
                dob in birth_date(),
                same_day in any::<bool>(),
            ) {
                let xml = jane()
                    .first_name(first)
                    .last_name(last)
                    .city(city)
                    .date_of_birth(dob)
                    .take_tests_same_day(same_day)
                    .build()
                    .unwrap()
                    .to_xml()
                    .unwrap();
                let names = child_names(&xml);
                prop_assert!(!names.iter().any(|n| n == "test_types"));
                prop_assert!(!names.iter().any(|n| n == "test_groups"));
                prop_assert_eq!(names.iter().any(|n| n == "take_tests_same_day"), same_day);
            }

            #[test]
            fn test_identifiers_comma_joined_in_order(
                types in prop::collection::vec(identifier(), 1..8),
                groups in prop::collection::vec(identifier(), 1..8),
            ) {
                let xml = jane()
                    .test_types(types.clone())
                    .test_groups(groups.clone())
                    .build()
                    .unwrap()
                    .to_xml()
                    .unwrap();
                prop_assert_eq!(child_text(&xml, "test_types"), Some(types.join(",")));
                prop_assert_eq!(child_text(&xml, "test_groups"), Some(groups.join(",")));
            }

            #[test]
            fn test_dob_always_eight_digits(dob in birth_date(), style in 0usize..5) {
                let text = match style {
                    0 => dob.format("%Y-%m-%d").to_string(),
                    1 => dob.format("%Y%m%d").to_string(),
                    2 => dob.format("%Y/%m/%d").to_string(),
                    3 => dob.format("%m/%d/%Y").to_string(),
                    _ => dob.format("%m-%d-%Y").to_string(),
                };
                let xml = jane()
                    .date_of_birth_text(text)
                    .build()
                    .unwrap()
                    .to_xml()
                    .unwrap();
                let wire = child_text(&xml, "dob").unwrap();
                prop_assert_eq!(wire.len(), 8);
                prop_assert!(wire.bytes().all(|b| b.is_ascii_digit()));
                prop_assert_eq!(
                    wire,
                    format!("{:04}{:02}{:02}", dob.year(), dob.month(), dob.day())
                );
            }
        }
    }
}
