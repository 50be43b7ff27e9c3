use serde::{Deserialize, Serialize};

/// The fields of the waitlist signup form, in declaration order.
///
/// The derived `Ord` follows declaration order, which is also the order in
/// which aggregated validation errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Message,
    Company,
    Phone,
    SubscribedNewsletter,
}

impl FormField {
    /// The free-text fields, in declaration order. The newsletter checkbox
    /// is not part of this set: it carries a boolean and is never validated.
    pub const TEXT_FIELDS: [FormField; 5] = [
        FormField::Name,
        FormField::Email,
        FormField::Message,
        FormField::Company,
        FormField::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Message => "message",
            FormField::Company => "company",
            FormField::Phone => "phone",
            FormField::SubscribedNewsletter => "subscribed_newsletter",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FormField::Name | FormField::Email)
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unvalidated input captured from the signup form.
///
/// Mutated field-by-field as the visitor types; sanitized once on a submit
/// attempt and discarded on success or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub subscribed_newsletter: bool,
    pub message: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl FormData {
    /// The current text of a field. `None` for an optional field that was
    /// never filled in, and for the newsletter checkbox.
    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => Some(self.name.as_str()),
            FormField::Email => Some(self.email.as_str()),
            FormField::Message => self.message.as_deref(),
            FormField::Company => self.company.as_deref(),
            FormField::Phone => self.phone.as_deref(),
            FormField::SubscribedNewsletter => None,
        }
    }

    /// Overwrite the text of a field. The newsletter checkbox is not a text
    /// field and is left untouched.
    pub fn set_text(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Message => self.message = Some(value),
            FormField::Company => self.company = Some(value),
            FormField::Phone => self.phone = Some(value),
            FormField::SubscribedNewsletter => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormData, FormField};

    #[test]
    fn text_fields_are_listed_in_declaration_order() {
        let mut sorted = FormField::TEXT_FIELDS;
        sorted.sort();
        assert_eq!(sorted, FormField::TEXT_FIELDS);
    }

    #[test]
    fn set_text_roundtrips_through_text() {
        let mut data = FormData::default();
        for field in FormField::TEXT_FIELDS {
            data.set_text(field, format!("value for {}", field));
            assert_eq!(data.text(field), Some(format!("value for {}", field).as_str()));
        }
    }

    #[test]
    fn the_newsletter_checkbox_is_not_a_text_field() {
        let mut data = FormData::default();
        data.set_text(FormField::SubscribedNewsletter, "true".into());
        assert_eq!(data.text(FormField::SubscribedNewsletter), None);
        assert!(!data.subscribed_newsletter);
    }
}
