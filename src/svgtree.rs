// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use roxmltree::Node;

use crate::Error;

/// Typed attribute access on top of `roxmltree`.
///
/// The caller hands us nodes from its own parsed document, so unlike a
/// full SVG preprocessor we never rewrite the tree. Everything here is
/// lookups plus `svgtypes` micro-grammars.
pub trait SvgNodeExt<'a> {
    /// Returns an attribute value by local name, ignoring namespaces.
    fn attr(&self, name: &str) -> Option<&'a str>;

    /// Parses an attribute via `FromStr`.
    ///
    /// A missing attribute is `None`; a present but malformed one
    /// is logged and also `None`.
    fn parse_attr<T: FromStr>(&self, name: &str) -> Option<T>;

    /// Like `parse_attr`, but a malformed value is a typed
    /// validation error rather than a silent `None`.
    fn try_parse_attr<T: FromStr>(&self, name: &str) -> Result<Option<T>, Error>;

    /// Parses a whitespace/comma separated number list attribute.
    fn number_list(&self, name: &str) -> Option<Vec<f64>>;

    /// Like `number_list`, but a malformed list is a typed
    /// validation error rather than a silent `None`.
    fn try_number_list(&self, name: &str) -> Result<Option<Vec<f64>>, Error>;

    /// Resolves a `url(#id)` attribute value into an element id.
    fn func_iri(&self, name: &str) -> Option<String>;

    /// Checks the element's local tag name.
    fn is_tag(&self, name: &str) -> bool;
}

impl<'a, 'input: 'a> SvgNodeExt<'a> for Node<'a, 'input> {
    fn attr(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .find(|a| a.name() == name)
            .map(|a| a.value())
    }

    fn parse_attr<T: FromStr>(&self, name: &str) -> Option<T> {
        let value = self.attr(name)?;
        match value.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("Failed to parse '{}' value: '{}'.", name, value);
                None
            }
        }
    }

    fn try_parse_attr<T: FromStr>(&self, name: &str) -> Result<Option<T>, Error> {
        let value = match self.attr(name) {
            Some(v) => v,
            None => return Ok(None),
        };

        value.parse().map(Some).map_err(|_| Error::InvalidAttribute {
            attribute: name.to_string(),
            value: value.to_string(),
        })
    }

    fn number_list(&self, name: &str) -> Option<Vec<f64>> {
        let value = self.attr(name)?;
        let mut list = Vec::new();
        for n in svgtypes::NumberListParser::from(value) {
            match n {
                Ok(n) => list.push(n),
                Err(_) => {
                    log::warn!("Failed to parse '{}' value: '{}'.", name, value);
                    return None;
                }
            }
        }

        Some(list)
    }

    fn try_number_list(&self, name: &str) -> Result<Option<Vec<f64>>, Error> {
        let value = match self.attr(name) {
            Some(v) => v,
            None => return Ok(None),
        };

        let mut list = Vec::new();
        for n in svgtypes::NumberListParser::from(value) {
            match n {
                Ok(n) => list.push(n),
                Err(_) => {
                    return Err(Error::InvalidAttribute {
                        attribute: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(Some(list))
    }

    fn func_iri(&self, name: &str) -> Option<String> {
        let value = self.attr(name)?;
        let iri = svgtypes::FuncIRI::from_str(value).ok()?;
        Some(iri.0.to_string())
    }

    fn is_tag(&self, name: &str) -> bool {
        self.is_element() && self.tag_name().name() == name
    }
}

/// Finds an element by `id` anywhere under `root`.
pub fn element_by_id<'a, 'input>(
    root: Node<'a, 'input>,
    id: &str,
) -> Option<Node<'a, 'input>> {
    root.descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_attrs() {
        let doc = roxmltree::Document::parse(
            "<svg><feGaussianBlur stdDeviation='2.5' clip-path='url(#c1)' values='1 0,3'/></svg>",
        )
        .unwrap();
        let node = doc.root_element().first_element_child().unwrap();

        assert_eq!(node.parse_attr::<f64>("stdDeviation"), Some(2.5));
        assert_eq!(node.func_iri("clip-path").as_deref(), Some("c1"));
        assert_eq!(node.number_list("values"), Some(vec![1.0, 0.0, 3.0]));
        assert!(node.parse_attr::<f64>("missing").is_none());
    }

    #[test]
    fn malformed_attr_is_validation_error() {
        let doc = roxmltree::Document::parse("<svg><feOffset dx='abc'/></svg>").unwrap();
        let node = doc.root_element().first_element_child().unwrap();

        let err = node.try_parse_attr::<f64>("dx").unwrap_err();
        assert!(err.is_validation());
    }
}
