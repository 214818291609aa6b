//! Google Calendar embeds
//!
//! Accepts the `<iframe>` snippet from the calendar's "Integrate calendar"
//! settings, or the embed URL on its own.

use std::sync::LazyLock;

use crate::extractors::{ElementShape, ShapeDescriptor};
use crate::schema::AttributeSchema;

pub const URL_PATTERN: &str = r"^\s*https?://calendar\.google\.com/calendar";

static SHAPE: LazyLock<ShapeDescriptor> = LazyLock::new(|| {
    ShapeDescriptor::Element(
        ElementShape::new("iframe", URL_PATTERN, ["width", "height"])
            .expect("Invalid calendar shape")
            .accept_bare_url(),
    )
});

static SCHEMA: LazyLock<AttributeSchema> = LazyLock::new(|| {
    AttributeSchema::from_json(include_str!("../schemas/google_calendar.json"))
        .expect("Invalid google calendar schema")
});

pub fn shape() -> &'static ShapeDescriptor {
    &SHAPE
}

pub fn schema() -> &'static AttributeSchema {
    &SCHEMA
}
