//! `#[serde(with = ...)]` helpers that write typed children in the tagged
//! [`Element`] form and check the tag when reading them back.
//!
//! Writing goes through a borrowed view of the child, so serializing a tree
//! never copies its subtrees.

use super::Element;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The `"type"` tag an element struct carries in JSON.
pub trait ElementType {
    /// Variant name written as the tag.
    const TYPE: &'static str;
}

/// Borrowed tagged form of a child: the tag followed by the struct's fields,
/// matching what [`Element`] writes for the same value.
#[derive(Serialize)]
struct View<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    value: &'a T,
}

impl<'a, T: ElementType> View<'a, T> {
    fn new(value: &'a T) -> Self {
        Self {
            kind: T::TYPE,
            value,
        }
    }
}

fn narrow<T, E>(element: Element) -> Result<T, E>
where
    T: TryFrom<Element, Error = Element>,
    E: serde::de::Error,
{
    T::try_from(element)
        .map_err(|other| E::custom(format!("unexpected element type '{}'", other.label())))
}

pub(super) mod one {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ElementType + Serialize,
        S: Serializer,
    {
        View::new(value).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: TryFrom<Element, Error = Element>,
        D: Deserializer<'de>,
    {
        narrow(Element::deserialize(deserializer)?)
    }
}

pub(super) mod optional {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ElementType + Serialize,
        S: Serializer,
    {
        value.as_ref().map(View::new).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: TryFrom<Element, Error = Element>,
        D: Deserializer<'de>,
    {
        Option::<Element>::deserialize(deserializer)?
            .map(narrow)
            .transpose()
    }
}

pub(super) mod many {
    use super::*;

    pub fn serialize<T, S>(values: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ElementType + Serialize,
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(View::new))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: TryFrom<Element, Error = Element>,
        D: Deserializer<'de>,
    {
        Vec::<Element>::deserialize(deserializer)?
            .into_iter()
            .map(narrow)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{PageNumber, Part, PartCount, PartImage};
    use crate::geometry::Rect;

    #[test]
    fn test_view_matches_element_form() {
        let part = Part {
            rect: Rect::new(0.0, 0.0, 20.0, 30.0),
            count: PartCount {
                rect: Rect::new(0.0, 22.0, 10.0, 30.0),
                count: 2,
            },
            image: PartImage {
                rect: Rect::new(0.0, 0.0, 20.0, 20.0),
                image_ref: "brick-2x4".into(),
            },
        };
        let borrowed = serde_json::to_value(View::new(&part)).unwrap();
        let owned = serde_json::to_value(Element::from(part)).unwrap();
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed["type"], "Part");
        assert_eq!(borrowed["count"]["type"], "PartCount");

        let number = PageNumber {
            rect: Rect::new(5.0, 190.0, 15.0, 198.0),
            value: 42,
        };
        assert_eq!(
            serde_json::to_string(&View::new(&number)).unwrap(),
            Element::from(number).to_json().unwrap()
        );
    }
}
