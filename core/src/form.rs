use std::collections::BTreeMap;

pub const FIELD_FIRSTNAME: &str = "firstname";
pub const FIELD_SURNAME: &str = "surname";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_COMMENT: &str = "comment";
pub const FIELD_FILE: &str = "file";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Textarea,
    File,
}

/// One input of a popup form, described as data so the client renders it
/// itself instead of embedding server-produced markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    /// The form bound to server-seeded markers.
    pub fn seed() -> Self {
        Self {
            fields: vec![
                FieldSpec {
                    name: FIELD_FIRSTNAME,
                    label: "First name",
                    kind: FieldKind::Text,
                },
                FieldSpec {
                    name: FIELD_SURNAME,
                    label: "Surname",
                    kind: FieldKind::Text,
                },
                FieldSpec {
                    name: FIELD_EMAIL,
                    label: "Email",
                    kind: FieldKind::Email,
                },
                FieldSpec {
                    name: FIELD_FILE,
                    label: "Photo",
                    kind: FieldKind::File,
                },
            ],
        }
    }

    /// The extended form bound to user-placed markers: the seed fields plus a
    /// free-text comment, inserted before the file input.
    pub fn user_placed() -> Self {
        let mut form = Self::seed();
        let file_at = form
            .fields
            .iter()
            .position(|field| field.name == FIELD_FILE)
            .unwrap_or(form.fields.len());
        form.fields.insert(
            file_at,
            FieldSpec {
                name: FIELD_COMMENT,
                label: "Comment",
                kind: FieldKind::Textarea,
            },
        );
        form
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }
}

/// A structured stand-in for the inline social-media markup the legacy widget
/// embedded in user popups: rendered client-side as a plain link card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbedCard {
    pub title: &'static str,
    pub url: &'static str,
}

impl EmbedCard {
    pub fn community_feed() -> Self {
        Self {
            title: "Hive keepers on Twitter",
            url: "https://twitter.com/twitterapi",
        }
    }
}

/// Popup content owned by exactly one marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupSpec {
    pub form: FormSpec,
    pub embed: Option<EmbedCard>,
}

impl PopupSpec {
    pub fn seed() -> Self {
        Self {
            form: FormSpec::seed(),
            embed: None,
        }
    }

    pub fn user_placed() -> Self {
        Self {
            form: FormSpec::user_placed(),
            embed: Some(EmbedCard::community_feed()),
        }
    }
}

/// Entered field values, unvalidated on the client by design.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
