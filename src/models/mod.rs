use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

// ============================================================================
// Entity kinds
// ============================================================================

/// A shareable entity kind. The string form is the first path segment of a
/// share link (`/circle/{id}`, `/event/{id}`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Circle,
    Event,
}

/// Everything that differs between the circle and event share pages.
#[derive(Debug, Clone, Copy)]
pub struct KindProfile {
    /// Route segment and deep-link host: `circle` / `event`.
    pub segment: &'static str,
    /// Collection path on the preview API, relative to the API base.
    pub api_collection: &'static str,
    /// Plain-text endpoint used when the JSON preview is unavailable.
    pub fallback_endpoint: &'static str,
    pub default_title: &'static str,
    pub default_description: &'static str,
    /// Capitalised noun for visitor-facing copy.
    pub noun: &'static str,
}

const CIRCLE_PROFILE: KindProfile = KindProfile {
    segment: "circle",
    api_collection: "circles/uid",
    fallback_endpoint: "name",
    default_title: "calsocial circle",
    default_description: "Join this circle on calsocial!",
    noun: "Circle",
};

const EVENT_PROFILE: KindProfile = KindProfile {
    segment: "event",
    api_collection: "events",
    fallback_endpoint: "title",
    default_title: "calsocial event",
    default_description: "Join this event on calsocial!",
    noun: "Event",
};

impl EntityKind {
    pub fn profile(self) -> &'static KindProfile {
        match self {
            EntityKind::Circle => &CIRCLE_PROFILE,
            EntityKind::Event => &EVENT_PROFILE,
        }
    }
}

/// A validated share request, derived from the URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub kind: EntityKind,
    pub id: String,
}

impl PreviewRequest {
    /// Build a request from the two path segments. Unknown kinds and empty ids
    /// are rejected; the id is otherwise opaque.
    pub fn from_segments(kind: &str, id: &str) -> Option<Self> {
        let kind = kind.parse::<EntityKind>().ok()?;
        if id.is_empty() {
            return None;
        }
        Some(PreviewRequest {
            kind,
            id: id.to_string(),
        })
    }
}

// ============================================================================
// Preview result
// ============================================================================

/// Which source produced a rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PreviewSource {
    /// JSON preview endpoint answered.
    Api,
    /// Only the plain-text title/name endpoint answered.
    Fallback,
    /// Both endpoints failed; everything is a default.
    Default,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircleDetails {
    pub member_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub emoji: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub city: String,
    pub attendee_count: u64,
    pub open_invite: bool,
}

impl Default for EventDetails {
    fn default() -> Self {
        EventDetails {
            emoji: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            location: String::new(),
            city: String::new(),
            attendee_count: 0,
            open_invite: true,
        }
    }
}

impl EventDetails {
    /// `location` when set, otherwise `city`.
    pub fn place(&self) -> &str {
        if self.location.is_empty() {
            &self.city
        } else {
            &self.location
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindDetails {
    Circle(CircleDetails),
    Event(EventDetails),
}

/// Display fields for a share page. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub details: KindDetails,
}

impl PreviewResult {
    /// The all-defaults preview for `kind`.
    pub fn defaults(kind: EntityKind, default_image_url: &str) -> Self {
        let profile = kind.profile();
        let details = match kind {
            EntityKind::Circle => KindDetails::Circle(CircleDetails::default()),
            EntityKind::Event => KindDetails::Event(EventDetails::default()),
        };
        PreviewResult {
            title: profile.default_title.to_string(),
            description: profile.default_description.to_string(),
            image_url: default_image_url.to_string(),
            details,
        }
    }

    /// Overwrite the title from a plain-text fallback body, if it has content.
    /// The body is trimmed; JSON values are used as sent.
    pub fn apply_fallback_title(&mut self, body: &str) -> bool {
        overwrite(&mut self.title, Some(body.trim().to_string()))
    }
}

/// Replace `slot` with `value` when it is present and non-blank.
fn overwrite(slot: &mut String, value: Option<String>) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() => {
            *slot = v;
            true
        }
        _ => false,
    }
}

// ============================================================================
// Preview API payloads
// ============================================================================

/// Body of `GET /circles/uid/{id}/preview`. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct CirclePreviewDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub member_count: Option<u64>,
}

/// Body of `GET /events/{id}/preview`. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct EventPreviewDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub emoji: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub attendee_count: Option<u64>,
    pub open_invite: Option<bool>,
}

/// Decoded JSON preview of either kind.
#[derive(Debug, Clone)]
pub enum PreviewPayload {
    Circle(CirclePreviewDto),
    Event(EventPreviewDto),
}

impl PreviewPayload {
    /// Decode a preview body for `kind`. Upstream may send fields of the wrong
    /// JSON type, so decoding is lenient per field rather than all-or-nothing.
    pub fn from_value(kind: EntityKind, value: serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(match kind {
            EntityKind::Circle => PreviewPayload::Circle(CirclePreviewDto {
                name: str_field(&value, "name"),
                description: str_field(&value, "description"),
                image_url: str_field(&value, "imageUrl"),
                member_count: value["memberCount"].as_u64(),
            }),
            EntityKind::Event => PreviewPayload::Event(EventPreviewDto {
                title: str_field(&value, "title"),
                description: str_field(&value, "description"),
                image_url: str_field(&value, "imageUrl"),
                emoji: str_field(&value, "emoji"),
                start_date: str_field(&value, "startDate"),
                end_date: str_field(&value, "endDate"),
                location: str_field(&value, "location"),
                city: str_field(&value, "city"),
                attendee_count: value["attendeeCount"].as_u64(),
                open_invite: value["openInvite"].as_bool(),
            }),
        })
    }

    /// Merge the payload into `result`, keeping defaults for absent fields.
    pub fn apply_to(self, result: &mut PreviewResult) {
        match (self, &mut result.details) {
            (PreviewPayload::Circle(dto), KindDetails::Circle(details)) => {
                overwrite(&mut result.title, dto.name);
                overwrite(&mut result.description, dto.description);
                overwrite(&mut result.image_url, dto.image_url);
                if dto.member_count.is_some() {
                    details.member_count = dto.member_count;
                }
            }
            (PreviewPayload::Event(dto), KindDetails::Event(details)) => {
                overwrite(&mut result.title, dto.title);
                overwrite(&mut result.description, dto.description);
                overwrite(&mut result.image_url, dto.image_url);
                overwrite(&mut details.emoji, dto.emoji);
                overwrite(&mut details.start_date, dto.start_date);
                overwrite(&mut details.end_date, dto.end_date);
                overwrite(&mut details.location, dto.location);
                overwrite(&mut details.city, dto.city);
                if let Some(count) = dto.attendee_count {
                    details.attendee_count = count;
                }
                if let Some(open) = dto.open_invite {
                    details.open_invite = open;
                }
            }
            (payload, _) => {
                tracing::warn!(?payload, "Preview payload kind does not match result kind");
            }
        }
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value[key].as_str().map(str::to_string)
}
