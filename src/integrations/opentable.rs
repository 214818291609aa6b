//! OpenTable reservation widget
//!
//! Restaurants are configured either from the restaurant picker (a bare id or
//! a `"Name (ID:123)"` label) or by pasting the widget loader snippet from the
//! OpenTable account. Also builds the preview URL for the editor canvas.

use std::sync::LazyLock;

use serde_json::{Map, Value};
use url::Url;

use crate::extractors::{
    Extraction, IdentifierShape, LoaderParam, LoaderShape, ParamKind, ShapeDescriptor,
};
use crate::schema::AttributeSchema;
use crate::validator::validate;

pub const WIDGET_CANVAS_URL: &str = "https://www.opentable.com/widget/reservation/canvas";

const LOADER_HOST_PATTERN: &str = r"^(www\.)?opentable(\.[a-z]{2,3}){1,2}$";
const LOADER_PATH: &str = "/widget/reservation/loader";

static SHAPE: LazyLock<ShapeDescriptor> = LazyLock::new(|| {
    let loader = LoaderShape::new(LOADER_HOST_PATTERN, LOADER_PATH)
        .expect("Invalid OpenTable loader shape")
        .param(LoaderParam::new("rid", "rid", ParamKind::List))
        .param(LoaderParam::new("restref", "rid", ParamKind::List).fallback())
        .param(LoaderParam::new("theme", "style", ParamKind::Text))
        .param(LoaderParam::new("type", "type", ParamKind::Text))
        .param(LoaderParam::new("domain", "domain", ParamKind::Text))
        .param(LoaderParam::new("lang", "lang", ParamKind::Text))
        .param(LoaderParam::new("iframe", "iframe", ParamKind::Flag))
        .param(LoaderParam::new("newtab", "newtab", ParamKind::Flag))
        .require("rid");

    ShapeDescriptor::OneOf(vec![
        ShapeDescriptor::Identifier(IdentifierShape::new("rid")),
        ShapeDescriptor::Loader(loader),
    ])
});

static WIDGET_CANVAS: LazyLock<Url> =
    LazyLock::new(|| Url::parse(WIDGET_CANVAS_URL).expect("Invalid widget canvas URL"));

static SCHEMA: LazyLock<AttributeSchema> = LazyLock::new(|| {
    AttributeSchema::from_json(include_str!("../schemas/opentable.json"))
        .expect("Invalid OpenTable schema")
});

pub fn shape() -> &'static ShapeDescriptor {
    &SHAPE
}

pub fn schema() -> &'static AttributeSchema {
    &SCHEMA
}

/// Fold the loader's `type` parameter into `style`: the button widget is a
/// style of its own, every other type takes its style from the theme.
pub(crate) fn apply_widget_type(fields: &mut Extraction) {
    if let Some(Value::String(kind)) = fields.remove("type") {
        if kind == "button" {
            fields.insert("style".to_string(), Value::String(kind));
        }
    }
}

/// Styles offered for the given number of restaurants
pub fn style_options(rid_count: usize) -> Vec<&'static str> {
    let mut options = vec!["standard", "tall", "wide"];
    if rid_count <= 1 {
        options.push("button");
    }
    options
}

/// Replace the selected restaurants, dropping the button style when it no
/// longer applies
pub fn select_restaurants(attributes: &Map<String, Value>, rids: &[String]) -> Map<String, Value> {
    let mut updated = validate(attributes, schema());
    if rids.len() > 1 && updated.get("style").and_then(Value::as_str) == Some("button") {
        updated.insert("style".to_string(), Value::from("standard"));
    }
    updated.insert("rid".to_string(), Value::from(rids.to_vec()));

    validate(&updated, schema())
}

/// Widget `type` and `theme` query values for a style
pub fn widget_type_and_theme(rid_count: usize, style: &str) -> (&'static str, String) {
    if rid_count > 1 {
        let theme = if style == "button" { "standard" } else { style };
        return ("multi", theme.to_string());
    }

    if style == "button" {
        ("button", "standard".to_string())
    } else {
        ("standard", style.to_string())
    }
}

/// Preview URL of the reservation widget for the given attributes
pub fn widget_url(attributes: &Map<String, Value>) -> Url {
    let attributes = validate(attributes, schema());

    let rids: Vec<&str> = attributes
        .get("rid")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let text = |key: &str| attributes.get(key).and_then(Value::as_str).unwrap_or_default();
    let flag = |key: &str| attributes.get(key).and_then(Value::as_bool).unwrap_or_default();

    let (kind, theme) = widget_type_and_theme(rids.len(), text("style"));

    let mut url = WIDGET_CANVAS.clone();
    url.query_pairs_mut()
        .append_pair("rid", &rids.join(","))
        .append_pair("type", kind)
        .append_pair("theme", &theme)
        .append_pair("overlay", "false")
        .append_pair("domain", text("domain"))
        .append_pair("lang", text("lang"))
        .append_pair("newtab", if flag("newtab") { "true" } else { "false" })
        .append_pair("disablega", "true");
    url
}
