//! Ordered attribute storage for elements.

/// A single name/value attribute on a live element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomAttribute {
    /// Attribute local name.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// [§ 4.9.2 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
///
/// "A NamedNodeMap has an associated element (an element)."
///
/// Attributes keep insertion order, the way a browser's attribute list does:
/// changing an existing attribute keeps its slot, new attributes go last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<DomAttribute>);

impl Attributes {
    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set `name` to `value`, replacing the value in place if present.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.0.iter_mut().find(|attr| attr.name == name) {
            value.clone_into(&mut attr.value);
        } else {
            self.0.push(DomAttribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Remove `name`, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|attr| attr.name == name)?;
        Some(self.0.remove(index).value)
    }

    /// Iterate over attributes in order.
    pub fn iter(&self) -> impl Iterator<Item = &DomAttribute> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a DomAttribute;
    type IntoIter = std::slice::Iter<'a, DomAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attrs = Self::default();
        for (name, value) in iter {
            let (name, value): (String, String) = (name.into(), value.into());
            attrs.set(&name, &value);
        }
        attrs
    }
}
